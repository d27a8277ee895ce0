//! Error types for the fetch and scraper-construction layer
//!
//! Field-level parse misses are deliberately not represented here: a label
//! that is absent or a regex that does not match resolves to the field's
//! sentinel default, because portal HTML drifts constantly and one missing
//! field must not abort extraction of the rest of the record.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlerError {
    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("giving up on {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },
}

impl CrawlerError {
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }
}
