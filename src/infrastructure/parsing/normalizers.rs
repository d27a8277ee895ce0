//! Text normalizers for Japanese listing fields
//!
//! Pure, total functions: whatever the input, they return a typed value and
//! never panic. Unparseable input resolves to the field's sentinel (0 for
//! costs and area, `None` for optional fields, empty strings for address
//! halves), because portal markup drifts and a miss on one field must not
//! take down the rest of the record.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::property::{BuildingType, Direction, StationAccess};

/// First numeric run, decimal allowed.
static NUMERIC_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

static AREA_SQM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(?:m²|㎡)").unwrap());

static YEAR_BUILT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})年").unwrap());

static FLOOR_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)階建").unwrap());

/// "Nヶ月" rent-multiple phrasing, all four common glyphs for ヶ.
static MONTHS_OF_RENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*[ヶヵカか]月").unwrap());

/// Leading prefecture: the three special names plus the N県 catch-all.
static PREFECTURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(東京都|北海道|大阪府|京都府|[一-龯]{2,3}県)").unwrap());

/// Municipality span up to the first 市/区/町/村 marker.
static CITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?[市区町村])").unwrap());

static STATION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^/／]+?)\s*[/／]\s*([^\s／]+?)駅?(?:\s|$)").unwrap());
static WALK_MINUTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:徒歩|歩)\s*(\d+)分").unwrap());
static BUS_MINUTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"バス\s*(\d+)分").unwrap());

/// "-", "なし" and empty all mean the cost does not apply.
fn is_absent(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || t == "-" || t == "ー" || t.contains("なし")
}

/// Parse a figure written in units of 10,000 yen ("8.5万円", or a bare
/// "8.5" from table cells whose header carries the unit) into yen.
pub fn man_yen_to_yen(text: &str) -> i64 {
    if is_absent(text) {
        return 0;
    }
    let cleaned = text.replace(',', "");
    match NUMERIC_RUN.find(&cleaned) {
        Some(m) => {
            let value: f64 = m.as_str().parse().unwrap_or(0.0);
            (value * 10_000.0).round() as i64
        }
        None => 0,
    }
}

/// Parse a figure already denominated in yen ("12,000円"). A 万 suffix on
/// the number switches the unit to man-yen ("1.2万円" → 12000).
pub fn yen_amount(text: &str) -> i64 {
    if is_absent(text) {
        return 0;
    }
    let cleaned = text.replace(',', "");
    let Some(m) = NUMERIC_RUN.find(&cleaned) else {
        return 0;
    };
    let value: f64 = m.as_str().parse().unwrap_or(0.0);
    if cleaned[m.end()..].trim_start().starts_with('万') {
        (value * 10_000.0).round() as i64
    } else {
        value.round() as i64
    }
}

/// Deposit/key-money cells come in two notations: a rent multiple
/// ("2ヶ月") or a direct amount. Rent multiples win; everything else falls
/// through to the plain currency parse.
pub fn money_with_rent_basis(text: &str, rent_yen: i64) -> i64 {
    if is_absent(text) {
        return 0;
    }
    if let Some(caps) = MONTHS_OF_RENT.captures(text) {
        if let Ok(months) = caps[1].parse::<f64>() {
            return (rent_yen as f64 * months).round() as i64;
        }
    }
    yen_amount(text)
}

/// Area in square meters; both Unicode spellings of the unit are accepted.
/// 0.0 when no area is present.
pub fn area_sqm(text: &str) -> f64 {
    AREA_SQM
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0.0)
}

/// Four-digit year preceding a 年 marker ("1998年3月" → 1998).
pub fn year_built(text: &str) -> Option<i32> {
    YEAR_BUILT.captures(text).and_then(|caps| caps[1].parse().ok())
}

/// Building floor count from "N階建" phrasing.
pub fn floor_count(text: &str) -> Option<i32> {
    FLOOR_COUNT.captures(text).and_then(|caps| caps[1].parse().ok())
}

/// Building-type keywords in match order. 一戸建て must come before the
/// bare 戸建 so the longer keyword wins where both occur.
const BUILDING_TYPE_KEYWORDS: [(&str, BuildingType); 6] = [
    ("マンション", BuildingType::Mansion),
    ("アパート", BuildingType::Apartment),
    ("一戸建て", BuildingType::House),
    ("戸建", BuildingType::House),
    ("テラスハウス", BuildingType::Terraced),
    ("タウンハウス", BuildingType::Terraced),
];

/// Map the portals' free-text 建物種別 to the closed enum. Non-empty text
/// with no keyword is `Other`; empty text is unknown.
pub fn building_type(text: &str) -> Option<BuildingType> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    for (keyword, kind) in BUILDING_TYPE_KEYWORDS {
        if t.contains(keyword) {
            return Some(kind);
        }
    }
    Some(BuildingType::Other)
}

const COMPOUND_DIRECTIONS: [(&str, Direction); 4] = [
    ("北東", Direction::NorthEast),
    ("北西", Direction::NorthWest),
    ("南東", Direction::SouthEast),
    ("南西", Direction::SouthWest),
];

const SINGLE_DIRECTIONS: [(&str, Direction); 4] = [
    ("北", Direction::North),
    ("南", Direction::South),
    ("東", Direction::East),
    ("西", Direction::West),
];

/// Compass facing from 向き text. Two-character compounds are checked
/// before single characters so 北 never matches inside 北東.
pub fn direction(text: &str) -> Option<Direction> {
    for (keyword, dir) in COMPOUND_DIRECTIONS {
        if text.contains(keyword) {
            return Some(dir);
        }
    }
    for (keyword, dir) in SINGLE_DIRECTIONS {
        if text.contains(keyword) {
            return Some(dir);
        }
    }
    None
}

/// Split a Japanese address into (prefecture, city). Either half is the
/// empty string when unmatched, never absent.
pub fn split_address(address: &str) -> (String, String) {
    let address = address.trim();
    let prefecture = PREFECTURE
        .captures(address)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    let rest = &address[prefecture.len()..];
    let city = CITY
        .captures(rest)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    (prefecture, city)
}

/// Parse one station entry like "ＪＲ山手線/渋谷駅 歩5分" or
/// "東急バス沿線/深沢不動前 バス10分". A バス time wins over a walk time
/// when both appear (the walk is then from the bus stop, not the station).
pub fn station_access(text: &str) -> Option<StationAccess> {
    let text = text.trim();
    let caps = STATION_LINE.captures(text)?;
    let line = caps[1].trim().to_string();
    let station = caps[2].trim().to_string();
    if line.is_empty() || station.is_empty() {
        return None;
    }

    let bus_minutes = BUS_MINUTES
        .captures(text)
        .and_then(|c| c[1].parse().ok());
    let walk_minutes = if bus_minutes.is_some() {
        None
    } else {
        WALK_MINUTES.captures(text).and_then(|c| c[1].parse().ok())
    };

    Some(StationAccess {
        line,
        station,
        walk_minutes,
        bus_minutes,
    })
}
