//! Crawler configuration
//!
//! Fetch pacing and retry policy, loadable from a JSON file with camelCase
//! keys so the same file can be shared with the node-side run scripts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for fetch pacing and retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlerConfig {
    /// Fixed delay before every request, in milliseconds. This is the rate
    /// limit: one paced request at a time, no token bucket.
    pub request_delay_ms: u64,
    pub user_agent: String,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Always 1 for this crawler; kept in the file format for the callers.
    pub max_concurrent_requests: u32,
    pub timeout_seconds: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1500,
            user_agent: "pethome-crawler/0.3 (+https://pethome.example.com/about-crawler)"
                .to_string(),
            max_retries: 3,
            retry_delay_ms: 5000,
            max_concurrent_requests: 1,
            timeout_seconds: 30,
        }
    }
}

impl CrawlerConfig {
    /// Load configuration from a JSON file. Missing keys fall back to the
    /// defaults, so a partial override file is valid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: CrawlerConfig =
            serde_json::from_str(r#"{"requestDelayMs": 500, "maxRetries": 1}"#).unwrap();
        assert_eq!(config.request_delay_ms, 500);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.max_concurrent_requests, 1);
        assert_eq!(config.timeout_seconds, CrawlerConfig::default().timeout_seconds);
    }

    #[test]
    fn from_file_reads_partial_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawler.json");
        std::fs::write(&path, r#"{"requestDelayMs": 250, "userAgent": "paced-agent"}"#).unwrap();

        let config = CrawlerConfig::from_file(&path).unwrap();
        assert_eq!(config.request_delay_ms, 250);
        assert_eq!(config.user_agent, "paced-agent");
        assert_eq!(config.max_retries, CrawlerConfig::default().max_retries);
    }

    #[test]
    fn from_file_reports_the_failing_path() {
        let dir = tempfile::tempdir().unwrap();

        let err = CrawlerConfig::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "not json").unwrap();
        let err = CrawlerConfig::from_file(&bad).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn round_trips_camel_case_keys() {
        let json = serde_json::to_value(CrawlerConfig::default()).unwrap();
        assert!(json.get("requestDelayMs").is_some());
        assert!(json.get("retryDelayMs").is_some());
        assert!(json.get("maxConcurrentRequests").is_some());
    }
}
