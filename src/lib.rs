//! pethome-crawler - multi-portal crawler for pet-friendly rental listings
//!
//! This crate fetches list and detail pages from Japanese rental portals,
//! extracts structured property records from their HTML, and normalizes the
//! heterogeneous text formats (rent in man-yen, areas, addresses, pet-policy
//! phrasing) into one canonical `Property` schema for the search front-end.

// Module declarations
pub mod domain;
pub mod infrastructure;

// Re-export the public surface for easier access
pub use domain::property::{
    BuildingType, Direction, PetConditions, Property, PropertySource, StationAccess,
};
pub use domain::repositories::{PropertyRepository, UpsertSummary};
pub use infrastructure::config::CrawlerConfig;
pub use infrastructure::crawler::Crawler;
pub use infrastructure::error::CrawlerError;
pub use infrastructure::http_client::HttpClient;
pub use infrastructure::scrapers::{PortalScraper, ScrapeResult};
