// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::dataset::AirportSource;
use crate::geo::distance_between;
use crate::normalize::{AirportClass, AirportDatabase, AirportRecord, AirportTable};
use crate::ranker::{self, AlternateAirport, AlternatesReport, CategoryPicks, CategoryRanking};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_RADIUS_NM: f64 = 200.0;
pub const DEFAULT_MIN_RUNWAY_M: u32 = 2200;
pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_PICK_POOL: usize = 10;

/// An airport under consideration as an alternate, with its distance from
/// the destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub airport: AirportRecord,
    pub distance_nm: f64,
}

impl Candidate {
    /// Unknown runway lengths compare as 0.
    pub fn runway_or_zero(&self) -> u32 {
        self.airport.runway_length_m.unwrap_or(0)
    }

    pub fn class(&self) -> AirportClass {
        self.airport.class()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub radius_nm: f64,
    /// `None` skips the runway check entirely.
    pub min_runway_m: Option<u32>,
    pub max_results: usize,
    /// Depth of each category list used by the single-pick selector.
    pub pick_pool: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            radius_nm: DEFAULT_RADIUS_NM,
            min_runway_m: Some(DEFAULT_MIN_RUNWAY_M),
            max_results: DEFAULT_MAX_RESULTS,
            pick_pool: DEFAULT_PICK_POOL,
        }
    }
}

/// Facility class and runway check for a diversion field.
///
/// Unclassified records pass. Records with an unknown runway pass too; the
/// ranker pushes them down instead.
pub fn is_suitable(record: &AirportRecord, min_runway_m: Option<u32>) -> bool {
    if record.classification.is_some() && record.class() == AirportClass::Other {
        return false;
    }
    match (min_runway_m, record.runway_length_m) {
        (None, _) | (_, None) => true,
        (Some(min), Some(len)) => len >= min,
    }
}

/// Every suitable airport within `params.radius_nm` of `dest_code`, in
/// dataset order. Unknown or unplaceable destinations yield nothing.
pub fn find_candidates(table: &AirportTable, dest_code: &str, params: &SearchParams) -> Vec<Candidate> {
    let Some(dest) = table.get(dest_code) else {
        debug!("Destination {} not in dataset", dest_code.trim());
        return Vec::new();
    };
    let Some(dest_pos) = dest.coordinates else {
        debug!("Destination {} has no coordinates", dest.code);
        return Vec::new();
    };

    table
        .records()
        .iter()
        .filter(|r| r.code != dest.code)
        .filter_map(|r| {
            let pos = r.coordinates?;
            let distance_nm = distance_between(dest_pos, pos);
            // A NaN radius admits nothing.
            let within = distance_nm <= params.radius_nm;
            if !within || !is_suitable(r, params.min_runway_m) {
                return None;
            }
            Some(Candidate {
                airport: r.clone(),
                distance_nm,
            })
        })
        .collect()
}

/// Entry point for hosts: owns the database and the default search params.
pub struct AlternatesService {
    db: AirportDatabase,
    defaults: SearchParams,
}

impl AlternatesService {
    pub fn new(source: Arc<dyn AirportSource>) -> Self {
        Self::with_defaults(source, SearchParams::default())
    }

    pub fn with_defaults(source: Arc<dyn AirportSource>, defaults: SearchParams) -> Self {
        Self {
            db: AirportDatabase::new(source),
            defaults,
        }
    }

    pub fn table(&self) -> &AirportTable {
        self.db.table()
    }

    pub fn lookup(&self, code: &str) -> Option<&AirportRecord> {
        self.db.table().get(code)
    }

    fn params(&self, params: Option<&SearchParams>) -> SearchParams {
        params.copied().unwrap_or(self.defaults)
    }

    pub fn find_candidates(&self, dest: &str, params: Option<&SearchParams>) -> Vec<Candidate> {
        let params = self.params(params);
        let pool = find_candidates(self.db.table(), dest, &params);
        debug!(
            "Candidate pool for {} — radius_nm={} min_runway_m={:?} size={}",
            dest.trim().to_uppercase(),
            params.radius_nm,
            params.min_runway_m,
            pool.len()
        );
        pool
    }

    pub fn rank_by_category(&self, dest: &str, params: Option<&SearchParams>) -> CategoryRanking {
        let params = self.params(params);
        let pool = self.find_candidates(dest, Some(&params));
        ranker::rank_by_category(&pool, params.max_results)
    }

    pub fn top_pick_per_category(&self, dest: &str, params: Option<&SearchParams>) -> CategoryPicks {
        let params = self.params(params);
        let pool = self.find_candidates(dest, Some(&params));
        let ranking = ranker::rank_by_category(&pool, params.pick_pool);
        ranker::assign_top_picks(&ranking)
    }

    pub fn rank_flat(&self, dest: &str, params: Option<&SearchParams>) -> Vec<Candidate> {
        let params = self.params(params);
        let pool = self.find_candidates(dest, Some(&params));
        ranker::rank_flat(&pool, params.max_results)
    }

    /// Flat alternates plus per-category picks, shaped for the briefing
    /// response.
    pub fn report(&self, dest: &str, params: Option<&SearchParams>) -> AlternatesReport {
        let params = self.params(params);
        let pool = self.find_candidates(dest, Some(&params));
        let flat = ranker::rank_flat(&pool, params.max_results);
        let picks = ranker::assign_top_picks(&ranker::rank_by_category(&pool, params.pick_pool));

        AlternatesReport {
            destination: dest.trim().to_uppercase(),
            alternates: flat.iter().map(AlternateAirport::from).collect(),
            alternate_categories: picks.to_output(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(code: &str, class: Option<&str>, runway: Option<u32>) -> AirportRecord {
        let mut r = AirportRecord::new(code);
        r.classification = class.map(str::to_string);
        r.runway_length_m = runway;
        r
    }

    #[test]
    fn test_suitability_rejects_non_airfield_classes() {
        for class in ["heliport", "seaplane_base", "closed", "balloonport"] {
            assert!(!is_suitable(&airport("ABCD", Some(class), Some(4000)), None));
        }
    }

    #[test]
    fn test_suitability_accepts_unclassified() {
        assert!(is_suitable(&airport("ABCD", None, None), Some(2200)));
    }

    #[test]
    fn test_suitability_runway_threshold() {
        assert!(is_suitable(&airport("ABCD", Some("large"), Some(2200)), Some(2200)));
        assert!(!is_suitable(&airport("ABCD", Some("large"), Some(2199)), Some(2200)));
        assert!(is_suitable(&airport("ABCD", Some("small"), Some(500)), None));
        assert!(is_suitable(&airport("ABCD", Some("Medium_Airport"), None), Some(2200)));
    }

    #[test]
    fn test_params_default() {
        let p = SearchParams::default();
        assert_eq!(p.radius_nm, 200.0);
        assert_eq!(p.min_runway_m, Some(2200));
        assert_eq!(p.max_results, 5);
        assert_eq!(p.pick_pool, 10);
    }

    #[test]
    fn test_find_candidates_excludes_destination_and_placeless() {
        let mut dest = airport("DEST", Some("large"), Some(3000));
        dest.coordinates = Some((0.0, 0.0));
        let mut twin = airport("DEST", Some("large"), Some(3000));
        twin.coordinates = Some((0.1, 0.0));
        let nowhere = airport("NOPE", Some("large"), Some(3000));
        let mut near = airport("NEAR", Some("medium"), None);
        near.coordinates = Some((0.2, 0.0));

        let table = AirportTable::from_records(vec![dest, twin, nowhere, near]);
        let pool = find_candidates(&table, "dest", &SearchParams::default());

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].airport.code, "NEAR");
        assert!((pool[0].distance_nm - 12.0).abs() < 0.1);
    }
}
