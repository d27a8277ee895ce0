//! HTTP client for portal crawling with pacing and retry
//!
//! A thin wrapper around `reqwest` that enforces the crawl etiquette every
//! scraper shares: a fixed delay before each request, a bounded retry loop
//! for transient failures, and a hard failure on non-2xx status. Callers
//! issue one URL at a time; there is no concurrent fetching.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::infrastructure::config::CrawlerConfig;
use crate::infrastructure::error::CrawlerError;

pub struct HttpClient {
    client: Client,
    config: CrawlerConfig,
}

impl HttpClient {
    pub fn new(config: CrawlerConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| anyhow::anyhow!("invalid user agent: {e}"))?,
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ja,en;q=0.8"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Fetch a URL and return the response body as text.
    ///
    /// Sleeps `request_delay_ms` before every attempt, retries up to
    /// `max_retries` times with `retry_delay_ms` between attempts.
    pub async fn fetch_html(&self, url: &str) -> Result<String, CrawlerError> {
        let attempts = self.config.max_retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            sleep(Duration::from_millis(self.config.request_delay_ms)).await;
            debug!(url, attempt, "fetching");

            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!(url, attempt, error = %e, "fetch attempt failed");
                    last_error = Some(e);
                    if attempt < attempts {
                        sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(CrawlerError::RetriesExhausted {
            url: url.to_string(),
            attempts,
        }))
    }

    async fn try_fetch(&self, url: &str) -> Result<String, CrawlerError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CrawlerError::RequestFailed {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlerError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| CrawlerError::RequestFailed {
                url: url.to_string(),
                source,
            })
    }
}
