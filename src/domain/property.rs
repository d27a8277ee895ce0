//! Canonical property records shared by every portal scraper
//!
//! A `Property` is partial by design: list pages only carry a subset of the
//! fields, and the detail-page pass produces a second, more complete record
//! for the same `(source, external_id)` key that the persistence collaborator
//! merges field by field. Unknown fields use the documented sentinel for
//! that field (0 for costs and area, `None` for not-applicable fields).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The rental portals this crawler knows how to extract from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertySource {
    Suumo,
    Homes,
    Athome,
    Chintai,
    Able,
    #[serde(rename = "pethomeweb")]
    PetHomeWeb,
}

impl PropertySource {
    pub const ALL: [PropertySource; 6] = [
        PropertySource::Suumo,
        PropertySource::Homes,
        PropertySource::Athome,
        PropertySource::Chintai,
        PropertySource::Able,
        PropertySource::PetHomeWeb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertySource::Suumo => "suumo",
            PropertySource::Homes => "homes",
            PropertySource::Athome => "athome",
            PropertySource::Chintai => "chintai",
            PropertySource::Able => "able",
            PropertySource::PetHomeWeb => "pethomeweb",
        }
    }
}

impl fmt::Display for PropertySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertySource {
    type Err = anyhow::Error;

    /// Parse the lowercase source identifier used in config files and CLI
    /// arguments. Unknown names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown property source: {s}"))
    }
}

/// Building category, mapped from the portals' free-text 建物種別 field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingType {
    Mansion,
    Apartment,
    House,
    Terraced,
    Other,
}

/// Eight compass points for the unit's main facing (向き).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

/// Structured pet policy, inferred from free-text condition fragments.
///
/// Only attached to a `Property` when at least one raw fragment was found on
/// the page; a listing that never mentions pets carries `None` instead of an
/// all-false record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetConditions {
    pub cat_allowed: bool,
    pub dog_allowed: bool,
    pub small_dog_only: bool,
    /// Maximum number of cats, when the listing states one ("2匹まで").
    pub cat_limit: Option<u32>,
    /// Extra deposit in yen computed from "敷金Nヶ月" phrasing.
    pub additional_deposit: Option<i64>,
    pub notes: Option<String>,
}

/// One nearby station entry: line, station and either a walk or a bus time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationAccess {
    pub line: String,
    pub station: String,
    pub walk_minutes: Option<u32>,
    pub bus_minutes: Option<u32>,
}

/// Canonical listing record.
///
/// `external_id` is the portal's own identifier, extracted deterministically
/// from the detail URL or a DOM attribute. It is unique within one `source`
/// and is the natural key the persistence collaborator upserts by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub external_id: String,
    pub source: PropertySource,
    pub name: String,
    pub address: String,
    pub prefecture: String,
    pub city: String,
    /// Monthly rent in yen, 0 when undetermined.
    pub rent: i64,
    /// Monthly management/common-service fee in yen, 0 when undetermined.
    pub management_fee: i64,
    /// Deposit (敷金) in yen, 0 when none or undetermined.
    pub deposit: i64,
    /// Key money (礼金) in yen, 0 when none or undetermined.
    pub key_money: i64,
    /// Free-form layout code, e.g. "1LDK". Empty when unknown.
    pub floor_plan: String,
    /// Unit area in square meters, 0.0 when unknown.
    pub area: f64,
    pub building_type: Option<BuildingType>,
    /// Floor count of the building, not the unit's floor.
    pub floors: Option<i32>,
    pub year_built: Option<i32>,
    pub direction: Option<Direction>,
    pub pet_conditions: Option<PetConditions>,
    /// Unordered equipment tags (エアコン, オートロック, ...).
    pub features: Vec<String>,
    pub nearest_stations: Vec<StationAccess>,
    /// Absolute image URLs in page order.
    pub images: Vec<String>,
    pub source_url: String,
}

impl Property {
    /// Empty record for one source, with every field at its sentinel.
    ///
    /// Scrapers start from this and fill in whatever the page yields; a
    /// record is only emitted once `external_id` is non-empty.
    pub fn empty(source: PropertySource) -> Self {
        Self {
            external_id: String::new(),
            source,
            name: String::new(),
            address: String::new(),
            prefecture: String::new(),
            city: String::new(),
            rent: 0,
            management_fee: 0,
            deposit: 0,
            key_money: 0,
            floor_plan: String::new(),
            area: 0.0,
            building_type: None,
            floors: None,
            year_built: None,
            direction: None,
            pet_conditions: None,
            features: Vec::new(),
            nearest_stations: Vec::new(),
            images: Vec::new(),
            source_url: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_lowercase() {
        let json = serde_json::to_string(&PropertySource::PetHomeWeb).unwrap();
        assert_eq!(json, "\"pethomeweb\"");
        let json = serde_json::to_string(&PropertySource::Suumo).unwrap();
        assert_eq!(json, "\"suumo\"");
    }

    #[test]
    fn source_round_trips_through_from_str() {
        for source in PropertySource::ALL {
            assert_eq!(source.as_str().parse::<PropertySource>().unwrap(), source);
        }
        assert!("reins".parse::<PropertySource>().is_err());
    }

    #[test]
    fn property_uses_camel_case_wire_names() {
        let mut p = Property::empty(PropertySource::Suumo);
        p.external_id = "jnc_000012345678".to_string();
        p.management_fee = 5000;
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["externalId"], "jnc_000012345678");
        assert_eq!(json["managementFee"], 5000);
        assert!(json["petConditions"].is_null());
    }
}
