//! LIFULL HOME'S portal adapter
//!
//! Buildings are `.mod-mergeBuilding` blocks with a room table inside; the
//! external id is the alphanumeric segment of `/chintai/room/<id>/`. Rent
//! figures carry a bare 万 suffix ("8.5万"); the detail page is a dt/dd
//! definition list.

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

/// Identity contract with HOME'S: the path segment after `/chintai/room/`.
static EXTERNAL_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/chintai/room/([A-Za-z0-9]+)").unwrap());

const BASE_URL: &str = "https://www.homes.co.jp/";

pub struct HomesScraper {
    client: Arc<HttpClient>,
    building: Selector,
    building_name: Selector,
    building_address: Selector,
    station_item: Selector,
    building_info: Selector,
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
    pet_tag: Selector,
    photo: Selector,
}

impl HomesScraper {
    pub fn new(client: Arc<HttpClient>) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            building: selector("div.mod-mergeBuilding")?,
            building_name: selector(".bukkenName")?,
            building_address: selector(".bukkenSpec td.address")?,
            station_item: selector(".bukkenSpec td.traffic li")?,
            building_info: selector(".bukkenSpec td.built")?,
            room_row: selector("tbody tr.prg-room")?,
            rent: selector("td.price span.num")?,
            management_fee: selector("td.price span.fee")?,
            floor_plan: selector("td.layout")?,
            area: selector("td.space")?,
            room_link: selector("a[href*='/chintai/room/']")?,
            detail_name: selector("h1.bukkenTitle")?,
            detail_row: selector("div.mod-bukkenDetail dl")?,
            detail_label: selector("dt")?,
            detail_value: selector("dd")?,
            pet_tag: selector("ul.bukkenTag li.pet")?,
            photo: selector("div.photoList img")?,
        })
    }

    pub fn parse_list_html(&self, html: &str) -> Vec<Property> {
        let document = Html::parse_document(html);
        let mut properties = Vec::new();

        for building in document.select(&self.building) {
            let name = text_of(building, &self.building_name);
            let address = text_of(building, &self.building_address);
            let (prefecture, city) = normalizers::split_address(&address);
            let stations: Vec<_> = texts_of(building, &self.station_item)
                .iter()
                .filter_map(|t| normalizers::station_access(t))
                .collect();
            let built = text_of(building, &self.building_info);
            let year_built = normalizers::year_built(&built);
            let floors = normalizers::floor_count(&built);

            for room in building.select(&self.room_row) {
                let Some(href) = attr_of(room, &self.room_link, "href") else {
                    warn!(source = "homes", building = %name, "room row without link, dropped");
                    continue;
                };
                let Some(external_id) = EXTERNAL_ID
                    .captures(&href)
                    .map(|caps| caps[1].to_string())
                else {
                    warn!(source = "homes", %href, "link without room id, dropped");
                    continue;
                };

                let mut property = Property::empty(PropertySource::Homes);
                property.external_id = external_id;
                property.name = name.clone();
                property.address = address.clone();
                property.prefecture = prefecture.clone();
                property.city = city.clone();
                // "8.5万" rent cells: the 万 suffix is handled by the yen parser
                property.rent = normalizers::yen_amount(&text_of(room, &self.rent));
                property.management_fee =
                    normalizers::yen_amount(&text_of(room, &self.management_fee));
                property.floor_plan = text_of(room, &self.floor_plan);
                property.area = normalizers::area_sqm(&text_of(room, &self.area));
                property.year_built = year_built;
                property.floors = floors;
                property.nearest_stations = stations.clone();
                property.source_url = resolve_url(&href, BASE_URL);
                properties.push(property);
            }
        }

        debug!(count = properties.len(), "parsed homes list page");
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
        let rent = normalizers::yen_amount(&field("賃料"));

        let mut property = Property::empty(PropertySource::Homes);
        property.external_id = external_id;
        property.name = text_of(document.root_element(), &self.detail_name);
        property.address = address;
        property.prefecture = prefecture;
        property.city = city;
        property.rent = rent;
        property.management_fee = normalizers::yen_amount(&field("管理費等"));
        property.deposit = normalizers::money_with_rent_basis(&field("敷金"), rent);
        property.key_money = normalizers::money_with_rent_basis(&field("礼金"), rent);
        property.floor_plan = field("間取り");
        property.area = normalizers::area_sqm(&field("専有面積"));
        property.building_type = normalizers::building_type(&field("建物種別"));
        property.floors = normalizers::floor_count(&field("階数"));
        property.year_built = normalizers::year_built(&field("築年月"));
        property.direction = normalizers::direction(&field("主要採光面"));
        property.features = field("設備・条件")
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

        // HOME'S surfaces pet policy as tag chips, not table rows
        let pet_fragments = texts_of(document.root_element(), &self.pet_tag);
        if !pet_fragments.is_empty() {
            property.pet_conditions =
                Some(infer_pet_conditions(&pet_fragments, Some(rent), None));
        }

        Some(property)
    }
}

#[async_trait]
impl PortalScraper for HomesScraper {
    fn source(&self) -> PropertySource {
        PropertySource::Homes
    }

    async fn scrape_list(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        match self.client.fetch_html(url).await {
            Ok(html) => {
                let properties = self.parse_list_html(&html);
                info!(url, count = properties.len(), "homes list scraped");
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
