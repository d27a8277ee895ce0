//! Portal scraper contract and shared DOM helpers
//!
//! One implementation per portal, all behind `PortalScraper`, so the
//! persistence side aggregates results without per-source branching. Each
//! implementation is deliberately coupled to one portal's current HTML
//! structure; a markup change on one portal never risks the others.

pub mod able;
pub mod athome;
pub mod chintai;
pub mod homes;
pub mod pethomeweb;
pub mod suumo;

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

use crate::domain::property::{Property, PropertySource};
use crate::infrastructure::error::CrawlerError;

pub use able::AbleScraper;
pub use athome::AthomeScraper;
pub use chintai::ChintaiScraper;
pub use homes::HomesScraper;
pub use pethomeweb::PetHomeWebScraper;
pub use suumo::SuumoScraper;

/// Uniform result envelope for every scrape operation.
///
/// `success == false` always comes with empty `properties`; fetch failures
/// are converted into this envelope at the scrape boundary and never
/// propagate as errors past it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub success: bool,
    pub properties: Vec<Property>,
    pub error: Option<String>,
    pub source: PropertySource,
    pub duration_ms: u64,
}

impl ScrapeResult {
    pub fn ok(source: PropertySource, properties: Vec<Property>, started: Instant) -> Self {
        Self {
            success: true,
            properties,
            error: None,
            source,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    pub fn failed(source: PropertySource, error: impl ToString, started: Instant) -> Self {
        Self {
            success: false,
            properties: Vec::new(),
            error: Some(error.to_string()),
            source,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// The two-operation capability every portal adapter provides.
///
/// Detail scraping is optional per portal: a source whose detail pages are
/// not worth a second pass reports an empty successful envelope, which is a
/// valid terminal state and not a contract failure.
#[async_trait]
pub trait PortalScraper: Send + Sync {
    fn source(&self) -> PropertySource;

    async fn scrape_list(&self, url: &str) -> ScrapeResult;

    async fn scrape_detail(&self, url: &str) -> ScrapeResult;
}

/// Compile one CSS selector, surfacing the portal module and selector text
/// on failure. Only called at scraper construction.
pub(crate) fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css)
        .map_err(|e| CrawlerError::invalid_selector(css, e).into())
}

/// Trimmed text of the first match under `scope`, empty string on a miss.
pub(crate) fn text_of(scope: ElementRef<'_>, sel: &Selector) -> String {
    scope
        .select(sel)
        .next()
        .map(|e| collapse_whitespace(&e.text().collect::<String>()))
        .unwrap_or_default()
}

/// Attribute value of the first match under `scope`.
pub(crate) fn attr_of(scope: ElementRef<'_>, sel: &Selector, attr: &str) -> Option<String> {
    scope
        .select(sel)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(|s| s.to_string())
}

/// Trimmed text of every match under `scope`, empties dropped.
pub(crate) fn texts_of(scope: ElementRef<'_>, sel: &Selector) -> Vec<String> {
    scope
        .select(sel)
        .map(|e| collapse_whitespace(&e.text().collect::<String>()))
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve a possibly-relative href against the page base. Returns the
/// input unchanged when nothing sensible can be built from it.
pub(crate) fn resolve_url(href: &str, base_url: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    match Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Scan a label/value structure (th/td table rows, dt/dd lists) into a
/// label → value map. Rows missing either half are skipped.
pub(crate) fn label_value_map(
    html: &Html,
    row_sel: &Selector,
    label_sel: &Selector,
    value_sel: &Selector,
) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for row in html.select(row_sel) {
        let label = text_of(row, label_sel);
        let value = text_of(row, value_sel);
        if !label.is_empty() && !value.is_empty() {
            fields.insert(label, value);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_envelope_has_no_properties() {
        let result = ScrapeResult::failed(PropertySource::Suumo, "boom", Instant::now());
        assert!(!result.success);
        assert!(result.properties.is_empty());
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert_eq!(result.source, PropertySource::Suumo);
    }

    #[test]
    fn url_resolution() {
        assert_eq!(
            resolve_url("/chintai/jnc_123/", "https://suumo.jp/search/"),
            "https://suumo.jp/chintai/jnc_123/"
        );
        assert_eq!(
            resolve_url("https://other.example.com/x", "https://suumo.jp/"),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn label_value_scan_skips_half_empty_rows() {
        let html = Html::parse_document(
            r#"<table>
                <tr><th>賃料</th><td>8.5万円</td></tr>
                <tr><th>礼金</th><td></td></tr>
                <tr><th></th><td>orphan</td></tr>
            </table>"#,
        );
        let fields = label_value_map(
            &html,
            &selector("tr").unwrap(),
            &selector("th").unwrap(),
            &selector("td").unwrap(),
        );
        assert_eq!(fields.get("賃料").map(String::as_str), Some("8.5万円"));
        assert_eq!(fields.len(), 1);
    }
}
