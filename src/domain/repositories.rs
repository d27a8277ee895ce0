//! Repository interfaces for the persistence collaborator
//!
//! The crawler itself never touches the row store. Callers hand the scraped
//! records to an implementation of `PropertyRepository`, which owns the
//! merge-by-external-id semantics, timestamping and deactivation of listings
//! that disappeared from the latest run.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::property::{Property, PropertySource};

/// Outcome of one `upsert` batch.
#[derive(Debug, Clone, Default)]
pub struct UpsertSummary {
    pub inserted: u32,
    pub updated: u32,
    pub errors: Vec<String>,
}

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Insert or update records, matched by `(source, external_id)`.
    async fn upsert(&self, properties: &[Property]) -> Result<UpsertSummary>;

    /// Mark records of `source` absent from `active_ids` as no longer
    /// listed. Returns the number of deactivated rows.
    async fn deactivate_missing(
        &self,
        source: PropertySource,
        active_ids: &HashSet<String>,
    ) -> Result<u64>;
}
