//! at home portal adapter
//!
//! List pages are flat `section.property-unit` blocks with a nested room
//! list; the external id is the numeric segment of `/properties/<id>/`.
//! Detail pages use one large dt/dd table.

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
use crate::infrastructure::parsing::pet_policy::infer_pet_conditions;

use super::{
    attr_of, label_value_map, resolve_url, selector, text_of, texts_of, PortalScraper,
    ScrapeResult,
};

/// Identity contract with at home: the digits after `/properties/`.
static EXTERNAL_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/properties/(\d+)").unwrap());

const BASE_URL: &str = "https://www.athome.co.jp/";

pub struct AthomeScraper {
    client: Arc<HttpClient>,
    unit: Selector,
    unit_name: Selector,
    unit_address: Selector,
    station_item: Selector,
    room_row: Selector,
    rent: Selector,
    management_fee: Selector,
    floor_plan: Selector,
    area: Selector,
    room_link: Selector,
    detail_name: Selector,
    detail_row: Selector,
    detail_label: Selector,
    detail_value: Selector,
    photo: Selector,
}

impl AthomeScraper {
    pub fn new(client: Arc<HttpClient>) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            unit: selector("section.property-unit")?,
            unit_name: selector(".property-unit-title")?,
            unit_address: selector(".property-unit-address")?,
            station_item: selector("ul.property-unit-traffic li")?,
            room_row: selector("ul.room-list li.room-row")?,
            rent: selector(".room-rent")?,
            management_fee: selector(".room-kanrihi")?,
            floor_plan: selector(".room-madori")?,
            area: selector(".room-menseki")?,
            room_link: selector("a[href*='/properties/']")?,
            detail_name: selector("h1.detail-title")?,
            detail_row: selector("dl.detail-table div.detail-table-row")?,
            detail_label: selector("dt")?,
            detail_value: selector("dd")?,
            photo: selector("ul.photo-gallery img")?,
        })
    }

    pub fn parse_list_html(&self, html: &str) -> Vec<Property> {
        let document = Html::parse_document(html);
        let mut properties = Vec::new();

        for unit in document.select(&self.unit) {
            let name = text_of(unit, &self.unit_name);
            let address = text_of(unit, &self.unit_address);
            let (prefecture, city) = normalizers::split_address(&address);
            let stations: Vec<_> = texts_of(unit, &self.station_item)
                .iter()
                .filter_map(|t| normalizers::station_access(t))
                .collect();

            for room in unit.select(&self.room_row) {
                let Some(href) = attr_of(room, &self.room_link, "href") else {
                    warn!(source = "athome", building = %name, "room row without link, dropped");
                    continue;
                };
                let Some(external_id) = EXTERNAL_ID
                    .captures(&href)
                    .map(|caps| caps[1].to_string())
                else {
                    warn!(source = "athome", %href, "link without property id, dropped");
                    continue;
                };

                let mut property = Property::empty(PropertySource::Athome);
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
                property.nearest_stations = stations.clone();
                property.source_url = resolve_url(&href, BASE_URL);
                properties.push(property);
            }
        }

        debug!(count = properties.len(), "parsed athome list page");
        properties
    }

    pub fn parse_detail_html(&self, html: &str, url: &str) -> Option<Property> {
        let external_id = EXTERNAL_ID.captures(url).map(|caps| caps[1].to_string())?;
        let document = Html::parse_document(html);
        let fields = label_value_map(
            &document,
            &self.detail_row,
            &self.detail_label,
            &self.detail_value,
        );
        let field = |label: &str| fields.get(label).cloned().unwrap_or_default();

        let address = field("所在地");
        let (prefecture, city) = normalizers::split_address(&address);
        let rent = normalizers::man_yen_to_yen(&field("賃料"));

        let mut property = Property::empty(PropertySource::Athome);
        property.external_id = external_id;
        property.name = text_of(document.root_element(), &self.detail_name);
        property.address = address;
        property.prefecture = prefecture;
        property.city = city;
        property.rent = rent;
        property.management_fee = normalizers::yen_amount(&field("管理費"));
        property.deposit = normalizers::money_with_rent_basis(&field("敷金"), rent);
        property.key_money = normalizers::money_with_rent_basis(&field("礼金"), rent);
        property.floor_plan = field("間取り");
        property.area = normalizers::area_sqm(&field("専有面積"));
        property.building_type = normalizers::building_type(&field("物件種目"));
        property.floors = normalizers::floor_count(&field("建物構造"));
        property.year_built = normalizers::year_built(&field("築年月"));
        property.direction = normalizers::direction(&field("向き"));
        property.features = field("設備")
            .split(['、', '／'])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        property.images = document
            .select(&self.photo)
            .filter_map(|img| img.value().attr("src"))
            .map(|src| resolve_url(src, BASE_URL))
            .collect();
        property.source_url = url.to_string();

        // pet clauses live in the ペット row of the same table
        let pet_value = field("ペット");
        if !pet_value.is_empty() {
            let fragments: Vec<String> = pet_value
                .split(['、', '／'])
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            property.pet_conditions =
                Some(infer_pet_conditions(&fragments, Some(rent), None));
        }

        Some(property)
    }
}

#[async_trait]
impl PortalScraper for AthomeScraper {
    fn source(&self) -> PropertySource {
        PropertySource::Athome
    }

    async fn scrape_list(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        match self.client.fetch_html(url).await {
            Ok(html) => {
                let properties = self.parse_list_html(&html);
                info!(url, count = properties.len(), "athome list scraped");
                ScrapeResult::ok(self.source(), properties, started)
            }
            Err(e) => ScrapeResult::failed(self.source(), e, started),
        }
    }

    async fn scrape_detail(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        match self.client.fetch_html(url).await {
            Ok(html) => {
                let properties: Vec<_> = self.parse_detail_html(&html, url).into_iter().collect();
                ScrapeResult::ok(self.source(), properties, started)
            }
            Err(e) => ScrapeResult::failed(self.source(), e, started),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::property::BuildingType;
    use crate::infrastructure::config::CrawlerConfig;

    fn scraper() -> AthomeScraper {
        let client = Arc::new(HttpClient::new(CrawlerConfig::default()).unwrap());
        AthomeScraper::new(client).unwrap()
    }

    const LIST_FIXTURE: &str = r#"
    <section class="property-unit">
      <h2 class="property-unit-title">サンコーポ浦和</h2>
      <p class="property-unit-address">埼玉県さいたま市浦和区高砂2-2</p>
      <ul class="property-unit-traffic"><li>ＪＲ京浜東北線/浦和駅 徒歩9分</li></ul>
      <ul class="room-list">
        <li class="room-row">
          <span class="room-rent">6.8</span>
          <span class="room-kanrihi">3,000円</span>
          <span class="room-madori">2DK</span>
          <span class="room-menseki">40.5㎡</span>
          <a href="/properties/7001234567/">詳細</a>
        </li>
        <li class="room-row">
          <span class="room-rent">7.1</span>
          <span class="room-kanrihi">3,000円</span>
          <span class="room-madori">2DK</span>
          <span class="room-menseki">40.5㎡</span>
          <a href="/properties/7001234568/">詳細</a>
        </li>
      </ul>
    </section>
    "#;

    #[test]
    fn list_parses_bare_man_yen_rent() {
        let properties = scraper().parse_list_html(LIST_FIXTURE);
        assert_eq!(properties.len(), 2);
        // header carries the 万円 unit, cells are bare numbers
        assert_eq!(properties[0].rent, 68_000);
        assert_eq!(properties[1].rent, 71_000);
        assert_eq!(properties[0].prefecture, "埼玉県");
        assert_eq!(properties[0].city, "さいたま市");
        assert_eq!(properties[0].external_id, "7001234567");
        assert_eq!(properties[1].external_id, "7001234568");
    }

    #[test]
    fn detail_reads_dt_dd_table_and_pet_row() {
        let html = r#"
        <h1 class="detail-title">サンコーポ浦和 101</h1>
        <dl class="detail-table">
          <div class="detail-table-row"><dt>所在地</dt><dd>埼玉県さいたま市浦和区高砂2-2</dd></div>
          <div class="detail-table-row"><dt>賃料</dt><dd>6.8万円</dd></div>
          <div class="detail-table-row"><dt>管理費</dt><dd>3,000円</dd></div>
          <div class="detail-table-row"><dt>敷金</dt><dd>1ヶ月</dd></div>
          <div class="detail-table-row"><dt>礼金</dt><dd>-</dd></div>
          <div class="detail-table-row"><dt>物件種目</dt><dd>アパート</dd></div>
          <div class="detail-table-row"><dt>築年月</dt><dd>1995年7月</dd></div>
          <div class="detail-table-row"><dt>ペット</dt><dd>猫飼育可（2匹まで）、小型犬飼育可</dd></div>
        </dl>
        "#;
        let property = scraper()
            .parse_detail_html(html, "https://www.athome.co.jp/properties/7001234567/")
            .unwrap();
        assert_eq!(property.rent, 68_000);
        assert_eq!(property.deposit, 68_000);
        assert_eq!(property.key_money, 0);
        assert_eq!(property.building_type, Some(BuildingType::Apartment));
        assert_eq!(property.year_built, Some(1995));
        let pets = property.pet_conditions.unwrap();
        assert!(pets.cat_allowed);
        assert!(pets.dog_allowed);
        assert!(pets.small_dog_only);
        assert_eq!(pets.cat_limit, Some(2));
        assert_eq!(pets.additional_deposit, None);
    }

    #[test]
    fn no_units_yields_empty_list() {
        assert!(scraper().parse_list_html("<html><body><p>該当なし</p></body></html>").is_empty());
    }
}
