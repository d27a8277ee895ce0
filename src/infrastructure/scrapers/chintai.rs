//! CHINTAI portal adapter
//!
//! List-only source: the detail pages render through a client-side app and
//! carry nothing the list cassette does not already show, so the detail
//! operation reports an empty successful envelope. The external id is the
//! `bk` query parameter of the room link.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::domain::property::{Property, PropertySource};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing::normalizers;

use super::{attr_of, resolve_url, selector, text_of, texts_of, PortalScraper, ScrapeResult};

/// Identity contract with CHINTAI: the `bk` query parameter.
static EXTERNAL_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]bk=([A-Za-z0-9_-]+)").unwrap());

const BASE_URL: &str = "https://www.chintai.net/";

pub struct ChintaiScraper {
    client: Arc<HttpClient>,
    cassette: Selector,
    cassette_name: Selector,
    cassette_address: Selector,
    cassette_access: Selector,
    cassette_meta: Selector,
    room_item: Selector,
    rent: Selector,
    management_fee: Selector,
    deposit: Selector,
    key_money: Selector,
    floor_plan: Selector,
    area: Selector,
    room_link: Selector,
}

impl ChintaiScraper {
    pub fn new(client: Arc<HttpClient>) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            cassette: selector("div.js-bukkenList div.cassette")?,
            cassette_name: selector("h3.cassette-name")?,
            cassette_address: selector("p.cassette-address")?,
            cassette_access: selector("ul.cassette-access li")?,
            cassette_meta: selector("p.cassette-meta")?,
            room_item: selector("ul.room-list li.room-item")?,
            rent: selector("span.rent-price")?,
            management_fee: selector("span.admin-fee")?,
            deposit: selector("span.shikikin")?,
            key_money: selector("span.reikin")?,
            floor_plan: selector("span.madori")?,
            area: selector("span.menseki")?,
            room_link: selector("a.room-detail-link")?,
        })
    }

    pub fn parse_list_html(&self, html: &str) -> Vec<Property> {
        let document = Html::parse_document(html);
        let mut properties = Vec::new();

        for cassette in document.select(&self.cassette) {
            let name = text_of(cassette, &self.cassette_name);
            let address = text_of(cassette, &self.cassette_address);
            let (prefecture, city) = normalizers::split_address(&address);
            let stations: Vec<_> = texts_of(cassette, &self.cassette_access)
                .iter()
                .filter_map(|t| normalizers::station_access(t))
                .collect();
            let meta = text_of(cassette, &self.cassette_meta);
            let floors = normalizers::floor_count(&meta);
            let year_built = normalizers::year_built(&meta);
            let building_type = normalizers::building_type(&meta);

            for room in cassette.select(&self.room_item) {
                let Some(href) = attr_of(room, &self.room_link, "href") else {
                    warn!(source = "chintai", building = %name, "room item without link, dropped");
                    continue;
                };
                let Some(external_id) = EXTERNAL_ID
                    .captures(&href)
                    .map(|caps| caps[1].to_string())
                else {
                    warn!(source = "chintai", %href, "link without bk parameter, dropped");
                    continue;
                };

                // rent column header carries 万円; cells are bare numbers
                let rent = normalizers::man_yen_to_yen(&text_of(room, &self.rent));

                let mut property = Property::empty(PropertySource::Chintai);
                property.external_id = external_id;
                property.name = name.clone();
                property.address = address.clone();
                property.prefecture = prefecture.clone();
                property.city = city.clone();
                property.rent = rent;
                property.management_fee =
                    normalizers::yen_amount(&text_of(room, &self.management_fee));
                property.deposit =
                    normalizers::money_with_rent_basis(&text_of(room, &self.deposit), rent);
                property.key_money =
                    normalizers::money_with_rent_basis(&text_of(room, &self.key_money), rent);
                property.floor_plan = text_of(room, &self.floor_plan);
                property.area = normalizers::area_sqm(&text_of(room, &self.area));
                property.floors = floors;
                property.year_built = year_built;
                property.building_type = building_type;
                property.nearest_stations = stations.clone();
                property.source_url = resolve_url(&href, BASE_URL);
                properties.push(property);
            }
        }

        debug!(count = properties.len(), "parsed chintai list page");
        properties
    }
}

#[async_trait]
impl PortalScraper for ChintaiScraper {
    fn source(&self) -> PropertySource {
        PropertySource::Chintai
    }

    async fn scrape_list(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        match self.client.fetch_html(url).await {
            Ok(html) => {
                let properties = self.parse_list_html(&html);
                info!(url, count = properties.len(), "chintai list scraped");
                ScrapeResult::ok(self.source(), properties, started)
            }
            Err(e) => ScrapeResult::failed(self.source(), e, started),
        }
    }

    async fn scrape_detail(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        debug!(url, "detail scraping not implemented for chintai");
        ScrapeResult::ok(self.source(), Vec::new(), started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::property::BuildingType;
    use crate::infrastructure::config::CrawlerConfig;

    fn scraper() -> ChintaiScraper {
        let client = Arc::new(HttpClient::new(CrawlerConfig::default()).unwrap());
        ChintaiScraper::new(client).unwrap()
    }

    const LIST_FIXTURE: &str = r#"
    <div class="js-bukkenList">
      <div class="cassette">
        <h3 class="cassette-name">エクセル千葉</h3>
        <p class="cassette-address">千葉県千葉市中央区新町18</p>
        <ul class="cassette-access"><li>ＪＲ総武線/千葉駅 徒歩5分</li></ul>
        <p class="cassette-meta">マンション / 2005年11月 / 10階建</p>
        <ul class="room-list">
          <li class="room-item">
            <span class="rent-price">18</span>
            <span class="admin-fee">12,000円</span>
            <span class="shikikin">2ヶ月</span>
            <span class="reikin">1ヶ月</span>
            <span class="madori">3LDK</span>
            <span class="menseki">72.80㎡</span>
            <a class="room-detail-link" href="/detail/?bk=CH-0099-8821&ref=list">詳細</a>
          </li>
          <li class="room-item">
            <span class="rent-price">11.5</span>
            <span class="shikikin">1ヶ月</span>
            <span class="reikin">-</span>
            <a class="room-detail-link" href="/detail/?bk=CH-0099-8822">詳細</a>
          </li>
        </ul>
      </div>
    </div>
    "#;

    #[test]
    fn list_parses_rent_and_month_based_costs() {
        let properties = scraper().parse_list_html(LIST_FIXTURE);
        assert_eq!(properties.len(), 2);

        let first = &properties[0];
        assert_eq!(first.external_id, "CH-0099-8821");
        assert_eq!(first.rent, 180_000);
        assert_eq!(first.management_fee, 12_000);
        assert_eq!(first.deposit, 360_000);
        assert_eq!(first.key_money, 180_000);
        assert_eq!(first.building_type, Some(BuildingType::Mansion));
        assert_eq!(first.floors, Some(10));
        assert_eq!(first.year_built, Some(2005));

        let second = &properties[1];
        assert_eq!(second.external_id, "CH-0099-8822");
        assert_eq!(second.rent, 115_000);
        assert_eq!(second.deposit, 115_000);
        assert_eq!(second.key_money, 0);
    }

    #[tokio::test]
    async fn detail_is_a_supported_empty_terminal_state() {
        let result = scraper().scrape_detail("https://www.chintai.net/detail/?bk=x").await;
        assert!(result.success);
        assert!(result.properties.is_empty());
        assert!(result.error.is_none());
        assert_eq!(result.source, PropertySource::Chintai);
    }
}
