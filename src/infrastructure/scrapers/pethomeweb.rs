//! ペットホームウェブ portal adapter
//!
//! A pet-specialist portal: every listing carries explicit pet-policy
//! fragments already on the list page, one record per `.property-box`.
//! The external id is the numeric file name of `/rent/<id>.html`. Detail
//! pages use fixed CSS hooks instead of a label/value table.

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

use super::{attr_of, resolve_url, selector, text_of, texts_of, PortalScraper, ScrapeResult};

/// Identity contract with ペットホームウェブ: the digits of `/rent/<id>.html`.
static EXTERNAL_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/rent/(\d+)\.html").unwrap());

const BASE_URL: &str = "https://www.pethomeweb.com/";

pub struct PetHomeWebScraper {
    client: Arc<HttpClient>,
    listing: Selector,
    listing_name: Selector,
    listing_address: Selector,
    listing_rent: Selector,
    listing_fee: Selector,
    listing_layout: Selector,
    listing_area: Selector,
    listing_link: Selector,
    pet_term: Selector,
    access_item: Selector,
    detail_name: Selector,
    detail_address: Selector,
    detail_rent: Selector,
    detail_fee: Selector,
    detail_deposit: Selector,
    detail_key_money: Selector,
    detail_layout: Selector,
    detail_area: Selector,
    detail_built: Selector,
    detail_pet_term: Selector,
    detail_pet_note: Selector,
    detail_feature: Selector,
    photo: Selector,
}

impl PetHomeWebScraper {
    pub fn new(client: Arc<HttpClient>) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            listing: selector("div.property-box")?,
            listing_name: selector("h3.name")?,
            listing_address: selector("p.address")?,
            listing_rent: selector(".price .rent")?,
            listing_fee: selector(".price .kanrihi")?,
            listing_layout: selector(".spec .madori")?,
            listing_area: selector(".spec .menseki")?,
            listing_link: selector("a.detail-link")?,
            pet_term: selector("ul.pet-terms li")?,
            access_item: selector("ul.access li")?,
            detail_name: selector("h1.property-name")?,
            detail_address: selector(".detail-address")?,
            detail_rent: selector(".detail-rent")?,
            detail_fee: selector(".detail-kanrihi")?,
            detail_deposit: selector(".detail-shikikin")?,
            detail_key_money: selector(".detail-reikin")?,
            detail_layout: selector(".detail-madori")?,
            detail_area: selector(".detail-menseki")?,
            detail_built: selector(".detail-chikunen")?,
            detail_pet_term: selector("div.pet-conditions ul li")?,
            detail_pet_note: selector("div.pet-conditions p.note")?,
            detail_feature: selector("ul.equipment li")?,
            photo: selector("div.photos img")?,
        })
    }

    pub fn parse_list_html(&self, html: &str) -> Vec<Property> {
        let document = Html::parse_document(html);
        let mut properties = Vec::new();

        for listing in document.select(&self.listing) {
            let Some(href) = attr_of(listing, &self.listing_link, "href") else {
                warn!(source = "pethomeweb", "listing box without detail link, dropped");
                continue;
            };
            let Some(external_id) = EXTERNAL_ID
                .captures(&href)
                .map(|caps| caps[1].to_string())
            else {
                warn!(source = "pethomeweb", %href, "detail link without id, dropped");
                continue;
            };

            let address = text_of(listing, &self.listing_address);
            let (prefecture, city) = normalizers::split_address(&address);
            let rent = normalizers::man_yen_to_yen(&text_of(listing, &self.listing_rent));

            let mut property = Property::empty(PropertySource::PetHomeWeb);
            property.external_id = external_id;
            property.name = text_of(listing, &self.listing_name);
            property.address = address;
            property.prefecture = prefecture;
            property.city = city;
            property.rent = rent;
            property.management_fee =
                normalizers::yen_amount(&text_of(listing, &self.listing_fee));
            property.floor_plan = text_of(listing, &self.listing_layout);
            property.area = normalizers::area_sqm(&text_of(listing, &self.listing_area));
            property.nearest_stations = texts_of(listing, &self.access_item)
                .iter()
                .filter_map(|t| normalizers::station_access(t))
                .collect();
            property.source_url = resolve_url(&href, BASE_URL);

            let pet_fragments = texts_of(listing, &self.pet_term);
            if !pet_fragments.is_empty() {
                property.pet_conditions =
                    Some(infer_pet_conditions(&pet_fragments, Some(rent), None));
            }

            properties.push(property);
        }

        debug!(count = properties.len(), "parsed pethomeweb list page");
        properties
    }

    pub fn parse_detail_html(&self, html: &str, url: &str) -> Option<Property> {
        let external_id = EXTERNAL_ID.captures(url).map(|caps| caps[1].to_string())?;
        let document = Html::parse_document(html);
        let root = document.root_element();

        let address = text_of(root, &self.detail_address);
        let (prefecture, city) = normalizers::split_address(&address);
        let rent = normalizers::man_yen_to_yen(&text_of(root, &self.detail_rent));

        let mut property = Property::empty(PropertySource::PetHomeWeb);
        property.external_id = external_id;
        property.name = text_of(root, &self.detail_name);
        property.address = address;
        property.prefecture = prefecture;
        property.city = city;
        property.rent = rent;
        property.management_fee = normalizers::yen_amount(&text_of(root, &self.detail_fee));
        property.deposit =
            normalizers::money_with_rent_basis(&text_of(root, &self.detail_deposit), rent);
        property.key_money =
            normalizers::money_with_rent_basis(&text_of(root, &self.detail_key_money), rent);
        property.floor_plan = text_of(root, &self.detail_layout);
        property.area = normalizers::area_sqm(&text_of(root, &self.detail_area));
        property.year_built = normalizers::year_built(&text_of(root, &self.detail_built));
        property.features = texts_of(root, &self.detail_feature);
        property.images = document
            .select(&self.photo)
            .filter_map(|img| img.value().attr("src"))
            .map(|src| resolve_url(src, BASE_URL))
            .collect();
        property.source_url = url.to_string();

        let pet_fragments = texts_of(root, &self.detail_pet_term);
        if !pet_fragments.is_empty() {
            let note = text_of(root, &self.detail_pet_note);
            let note = (!note.is_empty()).then_some(note);
            property.pet_conditions = Some(infer_pet_conditions(
                &pet_fragments,
                Some(rent),
                note.as_deref(),
            ));
        }

        Some(property)
    }
}

#[async_trait]
impl PortalScraper for PetHomeWebScraper {
    fn source(&self) -> PropertySource {
        PropertySource::PetHomeWeb
    }

    async fn scrape_list(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        match self.client.fetch_html(url).await {
            Ok(html) => {
                let properties = self.parse_list_html(&html);
                info!(url, count = properties.len(), "pethomeweb list scraped");
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
    use crate::infrastructure::config::CrawlerConfig;

    fn scraper() -> PetHomeWebScraper {
        let client = Arc::new(HttpClient::new(CrawlerConfig::default()).unwrap());
        PetHomeWebScraper::new(client).unwrap()
    }

    const LIST_FIXTURE: &str = r#"
    <div class="property-box">
      <h3 class="name">ペットと暮らすマンション青葉台</h3>
      <p class="address">神奈川県横浜市青葉区青葉台2-2</p>
      <ul class="access"><li>東急田園都市線/青葉台駅 徒歩7分</li></ul>
      <div class="price"><span class="rent">8.5万円</span><span class="kanrihi">8,000円</span></div>
      <div class="spec"><span class="madori">1LDK</span><span class="menseki">40.12㎡</span></div>
      <ul class="pet-terms">
        <li>猫飼育可（2匹まで）</li>
        <li>小型犬飼育可（1匹まで）</li>
        <li>敷金1ヶ月追加</li>
      </ul>
      <a class="detail-link" href="/rent/8800451.html">詳しく見る</a>
    </div>
    <div class="property-box">
      <h3 class="name">コーポ桜木</h3>
      <p class="address">神奈川県横浜市西区桜木町1-1</p>
      <div class="price"><span class="rent">6.2万円</span></div>
      <a class="detail-link" href="/rent/8800452.html">詳しく見る</a>
    </div>
    "#;

    #[test]
    fn list_attaches_pet_conditions_only_when_fragments_exist() {
        let properties = scraper().parse_list_html(LIST_FIXTURE);
        assert_eq!(properties.len(), 2);

        let first = &properties[0];
        assert_eq!(first.external_id, "8800451");
        assert_eq!(first.rent, 85_000);
        let pets = first.pet_conditions.as_ref().expect("fragments present");
        assert!(pets.cat_allowed);
        assert_eq!(pets.cat_limit, Some(2));
        assert!(pets.dog_allowed);
        assert!(pets.small_dog_only);
        assert_eq!(pets.additional_deposit, Some(85_000));

        // no pet fragments on the second box: field stays absent
        assert!(properties[1].pet_conditions.is_none());
    }

    #[test]
    fn detail_uses_fixed_css_hooks() {
        let html = r#"
        <h1 class="property-name">ペットと暮らすマンション青葉台 502</h1>
        <p class="detail-address">神奈川県横浜市青葉区青葉台2-2</p>
        <span class="detail-rent">8.5万円</span>
        <span class="detail-kanrihi">8,000円</span>
        <span class="detail-shikikin">1ヶ月</span>
        <span class="detail-reikin">1ヶ月</span>
        <span class="detail-madori">1LDK</span>
        <span class="detail-menseki">40.12㎡</span>
        <span class="detail-chikunen">2016年10月</span>
        <div class="pet-conditions">
          <ul><li>猫飼育可（2匹まで）</li><li>敷金1ヶ月追加</li></ul>
          <p class="note">退去時クリーニング費用別途</p>
        </div>
        <ul class="equipment"><li>ペット足洗い場</li><li>エアコン</li></ul>
        <div class="photos"><img src="/img/8800451/main.jpg"></div>
        "#;
        let property = scraper()
            .parse_detail_html(html, "https://www.pethomeweb.com/rent/8800451.html")
            .unwrap();
        assert_eq!(property.external_id, "8800451");
        assert_eq!(property.deposit, 85_000);
        assert_eq!(property.year_built, Some(2016));
        assert_eq!(property.features, vec!["ペット足洗い場", "エアコン"]);
        let pets = property.pet_conditions.unwrap();
        assert_eq!(pets.additional_deposit, Some(85_000));
        assert_eq!(pets.notes.as_deref(), Some("退去時クリーニング費用別途"));
    }

    #[test]
    fn box_without_link_is_dropped() {
        let html = r#"<div class="property-box"><h3 class="name">看板のみ</h3></div>"#;
        assert!(scraper().parse_list_html(html).is_empty());
    }
}
