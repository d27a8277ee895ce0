//! Crawl orchestration
//!
//! Builds the source → scraper registry over one shared `HttpClient` and
//! runs URL lists strictly sequentially: one in-flight request at a time,
//! pacing enforced inside the client. Downstream code only ever sees the
//! uniform `ScrapeResult` envelope.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::domain::property::PropertySource;
use crate::infrastructure::config::CrawlerConfig;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::scrapers::{
    AbleScraper, AthomeScraper, ChintaiScraper, HomesScraper, PetHomeWebScraper, PortalScraper,
    ScrapeResult, SuumoScraper,
};

pub struct Crawler {
    scrapers: HashMap<PropertySource, Arc<dyn PortalScraper>>,
}

impl Crawler {
    /// Build one scraper per portal over a shared client.
    pub fn new(config: CrawlerConfig) -> anyhow::Result<Self> {
        let client = Arc::new(HttpClient::new(config)?);
        let mut scrapers: HashMap<PropertySource, Arc<dyn PortalScraper>> = HashMap::new();

        scrapers.insert(
            PropertySource::Suumo,
            Arc::new(SuumoScraper::new(client.clone())?),
        );
        scrapers.insert(
            PropertySource::Homes,
            Arc::new(HomesScraper::new(client.clone())?),
        );
        scrapers.insert(
            PropertySource::Athome,
            Arc::new(AthomeScraper::new(client.clone())?),
        );
        scrapers.insert(
            PropertySource::Chintai,
            Arc::new(ChintaiScraper::new(client.clone())?),
        );
        scrapers.insert(
            PropertySource::Able,
            Arc::new(AbleScraper::new(client.clone())?),
        );
        scrapers.insert(
            PropertySource::PetHomeWeb,
            Arc::new(PetHomeWebScraper::new(client)?),
        );

        Ok(Self { scrapers })
    }

    pub fn scraper_for(&self, source: PropertySource) -> Option<Arc<dyn PortalScraper>> {
        self.scrapers.get(&source).cloned()
    }

    /// Scrape list pages for one source, one URL at a time.
    pub async fn run_list(&self, source: PropertySource, urls: &[String]) -> Vec<ScrapeResult> {
        self.run(source, urls, false).await
    }

    /// Scrape detail pages for one source, one URL at a time.
    pub async fn run_detail(&self, source: PropertySource, urls: &[String]) -> Vec<ScrapeResult> {
        self.run(source, urls, true).await
    }

    async fn run(
        &self,
        source: PropertySource,
        urls: &[String],
        detail: bool,
    ) -> Vec<ScrapeResult> {
        let Some(scraper) = self.scraper_for(source) else {
            return Vec::new();
        };

        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            let result = if detail {
                scraper.scrape_detail(url).await
            } else {
                scraper.scrape_list(url).await
            };
            results.push(result);
        }

        let records: usize = results.iter().map(|r| r.properties.len()).sum();
        let failures = results.iter().filter(|r| !r.success).count();
        info!(%source, urls = urls.len(), records, failures, "crawl run finished");
        results
    }
}
