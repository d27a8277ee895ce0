//! Infrastructure layer - fetch, parsing and per-portal scrapers

pub mod config;
pub mod crawler;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod scrapers;
