//! Shared text extraction utilities
//!
//! Every portal scraper composes the same normalizer functions; only the DOM
//! shape around them differs per source.

pub mod normalizers;
pub mod pet_policy;

pub use pet_policy::infer_pet_conditions;
