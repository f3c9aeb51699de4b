// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::dataset::{AirportSource, RawRow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

const FEET_TO_METERS: f64 = 0.3048;

// Candidate column names per attribute, highest priority first.
// New dataset revisions are handled by extending these tables.
const CODE_FIELDS: &[&str] = &["ident", "icao_code", "gps_code", "icao"];
const NAME_FIELDS: &[&str] = &["name", "airport_name", "display_name"];
const LAT_FIELDS: &[&str] = &["latitude_deg", "lat", "latitude", "latitude_decimal"];
const LON_FIELDS: &[&str] = &[
    "longitude_deg",
    "lon",
    "lng",
    "longitude",
    "longitude_decimal",
];
const RUNWAY_M_FIELDS: &[&str] = &[
    "runway_length_m",
    "longest_runway_m",
    "max_runway_length_m",
    "runway_m",
];
const RUNWAY_FT_FIELDS: &[&str] = &[
    "runway_length_ft",
    "longest_runway_ft",
    "max_runway_length_ft",
    "length_ft",
];
const CLASS_FIELDS: &[&str] = &["type", "airport_type", "classification", "category"];
const COUNTRY_FIELDS: &[&str] = &["iso_country", "country"];
const MUNICIPALITY_FIELDS: &[&str] = &["municipality", "city"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    pub code: String,
    pub name: Option<String>,
    /// (latitude, longitude) in decimal degrees.
    pub coordinates: Option<(f64, f64)>,
    pub classification: Option<String>,
    pub runway_length_m: Option<u32>,
    pub country: Option<String>,
    pub municipality: Option<String>,
}

impl AirportRecord {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.trim().to_uppercase(),
            name: None,
            coordinates: None,
            classification: None,
            runway_length_m: None,
            country: None,
            municipality: None,
        }
    }

    pub fn class(&self) -> AirportClass {
        AirportClass::from_classification(self.classification.as_deref())
    }
}

/// Facility class used for suitability and safety ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AirportClass {
    Large,
    Medium,
    Small,
    Other,
}

impl AirportClass {
    /// Accepts both `large` and the OurAirports spelling `large_airport`.
    pub fn from_classification(classification: Option<&str>) -> Self {
        let Some(raw) = classification else {
            return AirportClass::Other;
        };
        let lower = raw.trim().to_lowercase();
        let base = lower.strip_suffix("_airport").unwrap_or(&lower);
        match base {
            "large" => AirportClass::Large,
            "medium" => AirportClass::Medium,
            "small" => AirportClass::Small,
            _ => AirportClass::Other,
        }
    }

    /// Lower is better.
    pub fn rank(self) -> u8 {
        match self {
            AirportClass::Large => 0,
            AirportClass::Medium => 1,
            AirportClass::Small => 2,
            AirportClass::Other => 3,
        }
    }
}

fn first_value<'a>(row: &'a RawRow, fields: &[&str]) -> Option<&'a str> {
    fields.iter().find_map(|f| row.get(f))
}

fn first_number(row: &RawRow, fields: &[&str], limit: f64) -> Option<f64> {
    fields.iter().find_map(|f| {
        row.get(f)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && v.abs() <= limit)
    })
}

fn resolve_code(row: &RawRow) -> Option<String> {
    let codes: Vec<String> = CODE_FIELDS
        .iter()
        .filter_map(|f| row.get(f))
        .map(|v| v.trim().to_uppercase())
        .collect();

    codes
        .iter()
        .find(|c| c.chars().count() == 4)
        .or_else(|| codes.iter().find(|c| c.chars().count() == 3))
        .cloned()
}

fn resolve_coordinates(row: &RawRow) -> Option<(f64, f64)> {
    let lat = first_number(row, LAT_FIELDS, 90.0)?;
    let lon = first_number(row, LON_FIELDS, 180.0)?;
    Some((lat, lon))
}

fn positive_rounded(fields: &[&str], row: &RawRow, factor: f64) -> Option<u32> {
    fields.iter().find_map(|f| {
        let value = row.get(f)?.parse::<f64>().ok()?;
        let meters = (value * factor).round();
        if meters.is_finite() && meters >= 1.0 && meters <= u32::MAX as f64 {
            Some(meters as u32)
        } else {
            None
        }
    })
}

fn resolve_runway_m(row: &RawRow) -> Option<u32> {
    positive_rounded(RUNWAY_M_FIELDS, row, 1.0)
        .or_else(|| positive_rounded(RUNWAY_FT_FIELDS, row, FEET_TO_METERS))
}

/// Maps a raw row onto the canonical record shape.
/// Rows without a 3 or 4 character identifier are dropped.
pub fn normalize(row: &RawRow) -> Option<AirportRecord> {
    let code = resolve_code(row)?;
    Some(AirportRecord {
        code,
        name: first_value(row, NAME_FIELDS).map(str::to_string),
        coordinates: resolve_coordinates(row),
        classification: first_value(row, CLASS_FIELDS).map(str::to_string),
        runway_length_m: resolve_runway_m(row),
        country: first_value(row, COUNTRY_FIELDS).map(str::to_string),
        municipality: first_value(row, MUNICIPALITY_FIELDS).map(str::to_string),
    })
}

/// Normalized records in dataset order with a code index.
#[derive(Debug, Clone, Default)]
pub struct AirportTable {
    records: Vec<AirportRecord>,
    by_code: HashMap<String, usize>,
}

impl AirportTable {
    pub fn from_rows(rows: &[RawRow]) -> Self {
        Self::from_records(rows.iter().filter_map(normalize).collect())
    }

    pub fn from_records(records: Vec<AirportRecord>) -> Self {
        let mut by_code = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            // First occurrence wins for duplicate codes.
            by_code.entry(record.code.clone()).or_insert(i);
        }
        Self { records, by_code }
    }

    pub fn get(&self, code: &str) -> Option<&AirportRecord> {
        let code = code.trim().to_uppercase();
        self.by_code.get(&code).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[AirportRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lazily normalized view over an injected [`AirportSource`].
pub struct AirportDatabase {
    source: Arc<dyn AirportSource>,
    table: OnceLock<AirportTable>,
}

impl AirportDatabase {
    pub fn new(source: Arc<dyn AirportSource>) -> Self {
        Self {
            source,
            table: OnceLock::new(),
        }
    }

    pub fn table(&self) -> &AirportTable {
        self.table.get_or_init(|| {
            let rows = self.source.load();
            let table = AirportTable::from_rows(rows);
            log::debug!(
                "Normalized airport table — rows={} records={}",
                rows.len(),
                table.len()
            );
            table
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_code_prefers_four_letter_value() {
        let r = row(&[("ident", "BOS"), ("gps_code", "kbos")]);
        assert_eq!(normalize(&r).unwrap().code, "KBOS");
    }

    #[test]
    fn test_code_falls_back_to_first_three_letter_value() {
        let r = row(&[("ident", "00AAX1"), ("icao_code", "ABC"), ("icao", "XYZ")]);
        assert_eq!(normalize(&r).unwrap().code, "ABC");
    }

    #[test]
    fn test_row_without_usable_code_is_dropped() {
        let r = row(&[("ident", "US-0001"), ("name", "Somewhere")]);
        assert!(normalize(&r).is_none());
        assert!(normalize(&RawRow::new()).is_none());
    }

    #[test]
    fn test_name_fallback_order() {
        let r = row(&[("ident", "EGLL"), ("display_name", "LHR"), ("airport_name", "Heathrow")]);
        assert_eq!(normalize(&r).unwrap().name.as_deref(), Some("Heathrow"));
    }

    #[test]
    fn test_coordinates_resolved_per_axis() {
        let r = row(&[("ident", "EGLL"), ("lat", "51.47"), ("longitude", "-0.46")]);
        assert_eq!(normalize(&r).unwrap().coordinates, Some((51.47, -0.46)));
    }

    #[test]
    fn test_unparsable_coordinate_skips_to_next_field() {
        let r = row(&[
            ("ident", "EGLL"),
            ("latitude_deg", "N51"),
            ("lat", "51.47"),
            ("lon", "-0.46"),
        ]);
        assert_eq!(normalize(&r).unwrap().coordinates, Some((51.47, -0.46)));
    }

    #[test]
    fn test_single_axis_means_no_coordinates() {
        let r = row(&[("ident", "EGLL"), ("lat", "51.47"), ("lon", "west")]);
        let rec = normalize(&r).unwrap();
        assert_eq!(rec.coordinates, None);
        assert_eq!(rec.code, "EGLL");
    }

    #[test]
    fn test_out_of_range_latitude_is_absent() {
        let r = row(&[("ident", "EGLL"), ("lat", "151.0"), ("lon", "0.0")]);
        assert_eq!(normalize(&r).unwrap().coordinates, None);
    }

    #[test]
    fn test_runway_meters_beat_feet() {
        let r = row(&[
            ("ident", "EGLL"),
            ("runway_length_ft", "12799"),
            ("longest_runway_m", "3901.6"),
        ]);
        assert_eq!(normalize(&r).unwrap().runway_length_m, Some(3902));
    }

    #[test]
    fn test_runway_non_positive_meters_fall_through_to_feet() {
        let r = row(&[
            ("ident", "EGLL"),
            ("runway_length_m", "0"),
            ("length_ft", "10000"),
        ]);
        assert_eq!(normalize(&r).unwrap().runway_length_m, Some(3048));
    }

    #[test]
    fn test_runway_garbage_is_absent() {
        let r = row(&[("ident", "EGLL"), ("runway_length_m", "long")]);
        assert_eq!(normalize(&r).unwrap().runway_length_m, None);
    }

    #[test]
    fn test_classification_passthrough() {
        let r = row(&[("ident", "EGLL"), ("type", " large_airport "), ("iso_country", "GB")]);
        let rec = normalize(&r).unwrap();
        assert_eq!(rec.classification.as_deref(), Some("large_airport"));
        assert_eq!(rec.class(), AirportClass::Large);
        assert_eq!(rec.country.as_deref(), Some("GB"));
    }

    #[test]
    fn test_class_parsing() {
        assert_eq!(AirportClass::from_classification(Some("MEDIUM")), AirportClass::Medium);
        assert_eq!(AirportClass::from_classification(Some("small_airport")), AirportClass::Small);
        assert_eq!(AirportClass::from_classification(Some("heliport")), AirportClass::Other);
        assert_eq!(AirportClass::from_classification(None), AirportClass::Other);
    }

    #[test]
    fn test_table_lookup_is_case_insensitive_and_first_wins() {
        let mut first = AirportRecord::new("KBOS");
        first.name = Some("Logan".into());
        let mut dup = AirportRecord::new("KBOS");
        dup.name = Some("Duplicate".into());
        let table = AirportTable::from_records(vec![first, dup]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(" kbos ").unwrap().name.as_deref(), Some("Logan"));
        assert!(table.get("KJFK").is_none());
    }
}
