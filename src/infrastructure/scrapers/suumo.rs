//! SUUMO portal adapter
//!
//! List pages group rooms under `div.cassetteitem` building cassettes; the
//! external id is the numeric part of the `/chintai/jnc_NNN/` detail path.
//! Detail pages are th/td tables keyed by Japanese field labels.

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
use crate::infrastructure::parsing::pet_policy::{
    infer_pet_conditions, mentions_deposit_surcharge,
};

use super::{
    attr_of, label_value_map, resolve_url, selector, text_of, texts_of, PortalScraper,
    ScrapeResult,
};

/// Identity contract with SUUMO: the digits after `jnc_` in the detail
/// path. Must stay bit-exact; it is the upsert key for this source.
static EXTERNAL_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"jnc_(\d+)").unwrap());

const BASE_URL: &str = "https://suumo.jp/";

pub struct SuumoScraper {
    client: Arc<HttpClient>,
    building: Selector,
    building_name: Selector,
    building_address: Selector,
    station_text: Selector,
    age_and_floors: Selector,
    room_row: Selector,
    rent: Selector,
    management_fee: Selector,
    deposit: Selector,
    key_money: Selector,
    floor_plan: Selector,
    area: Selector,
    room_link: Selector,
    detail_title: Selector,
    detail_row: Selector,
    detail_label: Selector,
    detail_value: Selector,
    gallery_image: Selector,
}

impl SuumoScraper {
    pub fn new(client: Arc<HttpClient>) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            building: selector("div.cassetteitem")?,
            building_name: selector(".cassetteitem_content-title")?,
            building_address: selector("li.cassetteitem_detail-col1")?,
            station_text: selector("li.cassetteitem_detail-col2 .cassetteitem_detail-text")?,
            age_and_floors: selector("li.cassetteitem_detail-col3 div")?,
            room_row: selector("table.cassetteitem_other tr.js-cassette_link")?,
            rent: selector(".cassetteitem_price--rent")?,
            management_fee: selector(".cassetteitem_price--administration")?,
            deposit: selector(".cassetteitem_price--deposit")?,
            key_money: selector(".cassetteitem_price--gratuity")?,
            floor_plan: selector(".cassetteitem_madori")?,
            area: selector(".cassetteitem_menseki")?,
            room_link: selector("a[href*='/chintai/jnc_']")?,
            detail_title: selector("h1.section_h1-header-title")?,
            detail_row: selector("table.data_table tr")?,
            detail_label: selector("th")?,
            detail_value: selector("td")?,
            gallery_image: selector(".property_view_photo img")?,
        })
    }

    /// Extract zero or more room records from a SUUMO search-result page.
    pub fn parse_list_html(&self, html: &str) -> Vec<Property> {
        let document = Html::parse_document(html);
        let mut properties = Vec::new();

        for building in document.select(&self.building) {
            let name = text_of(building, &self.building_name);
            let address = text_of(building, &self.building_address);
            let (prefecture, city) = normalizers::split_address(&address);
            let stations: Vec<_> = texts_of(building, &self.station_text)
                .iter()
                .filter_map(|t| normalizers::station_access(t))
                .collect();
            let building_meta = texts_of(building, &self.age_and_floors).join(" ");
            let floors = normalizers::floor_count(&building_meta);

            for room in building.select(&self.room_row) {
                let Some(href) = attr_of(room, &self.room_link, "href") else {
                    warn!(source = "suumo", building = %name, "room row without detail link, dropped");
                    continue;
                };
                let Some(external_id) = EXTERNAL_ID
                    .captures(&href)
                    .map(|caps| caps[1].to_string())
                else {
                    warn!(source = "suumo", %href, "detail link without jnc id, dropped");
                    continue;
                };

                let rent = normalizers::man_yen_to_yen(&text_of(room, &self.rent));

                let mut property = Property::empty(PropertySource::Suumo);
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
                property.nearest_stations = stations.clone();
                property.source_url = resolve_url(&href, BASE_URL);
                properties.push(property);
            }
        }

        debug!(count = properties.len(), "parsed suumo list page");
        properties
    }

    /// Extract one enriched record from a SUUMO detail page. `None` when
    /// the URL carries no external id.
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

        let mut property = Property::empty(PropertySource::Suumo);
        property.external_id = external_id;
        property.name = text_of(document.root_element(), &self.detail_title);
        property.address = address.clone();
        property.prefecture = prefecture;
        property.city = city;
        property.rent = rent;
        property.management_fee = normalizers::yen_amount(&field("管理費・共益費"));
        property.deposit = normalizers::money_with_rent_basis(&field("敷金"), rent);
        property.key_money = normalizers::money_with_rent_basis(&field("礼金"), rent);
        property.floor_plan = field("間取り");
        property.area = normalizers::area_sqm(&field("専有面積"));
        property.building_type = normalizers::building_type(&field("建物種別"));
        property.floors = normalizers::floor_count(&field("階建"));
        property.year_built = normalizers::year_built(&field("築年月"));
        property.direction = normalizers::direction(&field("向き"));
        property.features = split_tags(&field("設備"));
        property.images = document
            .select(&self.gallery_image)
            .filter_map(|img| img.value().attr("src"))
            .map(|src| resolve_url(src, BASE_URL))
            .collect();
        property.source_url = url.to_string();

        // surcharge tags ("敷金プラス1ヶ月") often omit the species markers
        let pet_fragments: Vec<String> = split_tags(&field("条件"))
            .into_iter()
            .filter(|tag| {
                tag.contains("ペット")
                    || tag.contains('猫')
                    || tag.contains('犬')
                    || mentions_deposit_surcharge(tag)
            })
            .collect();
        if !pet_fragments.is_empty() {
            property.pet_conditions =
                Some(infer_pet_conditions(&pet_fragments, Some(rent), None));
        }

        Some(property)
    }
}

fn split_tags(value: &str) -> Vec<String> {
    value
        .split(['、', '，', '/', '／'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[async_trait]
impl PortalScraper for SuumoScraper {
    fn source(&self) -> PropertySource {
        PropertySource::Suumo
    }

    async fn scrape_list(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        match self.client.fetch_html(url).await {
            Ok(html) => {
                let properties = self.parse_list_html(&html);
                info!(url, count = properties.len(), "suumo list scraped");
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
