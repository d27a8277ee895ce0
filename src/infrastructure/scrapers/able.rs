//! ABLE portal adapter
//!
//! The odd one out: room rows carry their id in a `data-room-id` DOM
//! attribute instead of the link URL, and the portal has no scrapeable
//! detail page (it is an inquiry form), so detail reports an empty
//! successful envelope.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::domain::property::{Property, PropertySource};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing::normalizers;

use super::{attr_of, resolve_url, selector, text_of, texts_of, PortalScraper, ScrapeResult};

const BASE_URL: &str = "https://www.able.co.jp/";

pub struct AbleScraper {
    client: Arc<HttpClient>,
    building: Selector,
    building_name: Selector,
    building_address: Selector,
    access_item: Selector,
    building_meta: Selector,
    room_row: Selector,
    rent: Selector,
    management_fee: Selector,
    floor_plan: Selector,
    area: Selector,
    room_link: Selector,
}

impl AbleScraper {
    pub fn new(client: Arc<HttpClient>) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            building: selector("div.p-bukken")?,
            building_name: selector(".p-bukken__name")?,
            building_address: selector(".p-bukken__address")?,
            access_item: selector("ul.p-bukken__access li")?,
            building_meta: selector(".p-bukken__meta")?,
            room_row: selector("ul.p-bukken__rooms li[data-room-id]")?,
            rent: selector(".p-room__rent")?,
            management_fee: selector(".p-room__fee")?,
            floor_plan: selector(".p-room__layout")?,
            area: selector(".p-room__area")?,
            room_link: selector("a.p-room__link")?,
        })
    }

    pub fn parse_list_html(&self, html: &str) -> Vec<Property> {
        let document = Html::parse_document(html);
        let mut properties = Vec::new();

        for building in document.select(&self.building) {
            let name = text_of(building, &self.building_name);
            let address = text_of(building, &self.building_address);
            let (prefecture, city) = normalizers::split_address(&address);
            let stations: Vec<_> = texts_of(building, &self.access_item)
                .iter()
                .filter_map(|t| normalizers::station_access(t))
                .collect();
            let meta = text_of(building, &self.building_meta);
            let floors = normalizers::floor_count(&meta);
            let year_built = normalizers::year_built(&meta);

            for room in building.select(&self.room_row) {
                // the id lives on the row itself, not in the link
                let Some(external_id) = room
                    .value()
                    .attr("data-room-id")
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                else {
                    warn!(source = "able", building = %name, "room row with empty data-room-id, dropped");
                    continue;
                };

                let mut property = Property::empty(PropertySource::Able);
                property.external_id = external_id;
                property.name = name.clone();
                property.address = address.clone();
                property.prefecture = prefecture.clone();
                property.city = city.clone();
                property.rent = normalizers::man_yen_to_yen(&text_of(room, &self.rent));
                property.management_fee =
                    normalizers::yen_amount(&text_of(room, &self.management_fee));
                property.floor_plan = text_of(room, &self.floor_plan);
                property.area = normalizers::area_sqm(&text_of(room, &self.area));
                property.floors = floors;
                property.year_built = year_built;
                property.nearest_stations = stations.clone();
                property.source_url = attr_of(room, &self.room_link, "href")
                    .map(|href| resolve_url(&href, BASE_URL))
                    .unwrap_or_default();
                properties.push(property);
            }
        }

        debug!(count = properties.len(), "parsed able list page");
        properties
    }
}

#[async_trait]
impl PortalScraper for AbleScraper {
    fn source(&self) -> PropertySource {
        PropertySource::Able
    }

    async fn scrape_list(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        match self.client.fetch_html(url).await {
            Ok(html) => {
                let properties = self.parse_list_html(&html);
                info!(url, count = properties.len(), "able list scraped");
                ScrapeResult::ok(self.source(), properties, started)
            }
            Err(e) => ScrapeResult::failed(self.source(), e, started),
        }
    }

    async fn scrape_detail(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        debug!(url, "detail scraping not implemented for able");
        ScrapeResult::ok(self.source(), Vec::new(), started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::CrawlerConfig;

    fn scraper() -> AbleScraper {
        let client = Arc::new(HttpClient::new(CrawlerConfig::default()).unwrap());
        AbleScraper::new(client).unwrap()
    }

    const LIST_FIXTURE: &str = r#"
    <div class="p-bukken">
      <h2 class="p-bukken__name">エイブルコート豊中</h2>
      <p class="p-bukken__address">大阪府豊中市本町1-2-3</p>
      <ul class="p-bukken__access"><li>阪急宝塚線/豊中駅 徒歩8分</li></ul>
      <p class="p-bukken__meta">2012年4月 / 5階建</p>
      <ul class="p-bukken__rooms">
        <li data-room-id="AB-2024-5511">
          <span class="p-room__rent">5.9万円</span>
          <span class="p-room__fee">4,000円</span>
          <span class="p-room__layout">1K</span>
          <span class="p-room__area">22.10㎡</span>
          <a class="p-room__link" href="/rent/osaka/AB-2024-5511/">お問い合わせ</a>
        </li>
        <li data-room-id="AB-2024-5512">
          <span class="p-room__rent">6.3万円</span>
          <span class="p-room__fee">4,000円</span>
          <span class="p-room__layout">1DK</span>
          <span class="p-room__area">25.40㎡</span>
        </li>
        <li data-room-id="">
          <span class="p-room__rent">6.6万円</span>
        </li>
      </ul>
    </div>
    "#;

    #[test]
    fn id_comes_from_data_attribute_not_href() {
        let properties = scraper().parse_list_html(LIST_FIXTURE);
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].external_id, "AB-2024-5511");
        assert_eq!(properties[0].rent, 59_000);
        assert_eq!(properties[0].prefecture, "大阪府");
        assert_eq!(properties[0].city, "豊中市");
        assert_eq!(
            properties[0].source_url,
            "https://www.able.co.jp/rent/osaka/AB-2024-5511/"
        );
        // second room has no link at all but still a valid id
        assert_eq!(properties[1].external_id, "AB-2024-5512");
        assert_eq!(properties[1].source_url, "");
    }

    #[test]
    fn empty_data_room_id_drops_the_row() {
        let properties = scraper().parse_list_html(LIST_FIXTURE);
        assert!(properties.iter().all(|p| !p.external_id.is_empty()));
        assert_eq!(properties.len(), 2); // third row dropped
    }

    #[tokio::test]
    async fn detail_is_a_supported_empty_terminal_state() {
        let result = scraper().scrape_detail("https://www.able.co.jp/rent/x").await;
        assert!(result.success);
        assert!(result.properties.is_empty());
    }
}
