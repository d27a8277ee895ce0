//! Domain layer - canonical records and persistence interfaces

pub mod property;
pub mod repositories;

pub use property::{
    BuildingType, Direction, PetConditions, Property, PropertySource, StationAccess,
};
pub use repositories::{PropertyRepository, UpsertSummary};
