// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Ordering of alternate candidates.
//!
//! Each category is a plain stable sort over the candidate pool; the
//! cross-category deduplication lives in [`assign_top_picks`] and never
//! touches the scores.

use crate::alternates::Candidate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    LeastDeviation,
    BestFuelEfficiency,
    Safest,
}

impl Category {
    /// Order in which categories claim airports in [`assign_top_picks`].
    pub const PICK_ORDER: [Category; 3] = [
        Category::Safest,
        Category::LeastDeviation,
        Category::BestFuelEfficiency,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::LeastDeviation => "least_deviation",
            Category::BestFuelEfficiency => "best_fuel_efficiency",
            Category::Safest => "safest",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryRanking {
    pub least_deviation: Vec<Candidate>,
    pub best_fuel_efficiency: Vec<Candidate>,
    pub safest: Vec<Candidate>,
}

impl CategoryRanking {
    pub fn get(&self, category: Category) -> &[Candidate] {
        match category {
            Category::LeastDeviation => &self.least_deviation,
            Category::BestFuelEfficiency => &self.best_fuel_efficiency,
            Category::Safest => &self.safest,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryPicks {
    pub least_deviation: Option<Candidate>,
    pub best_fuel_efficiency: Option<Candidate>,
    pub safest: Option<Candidate>,
}

impl CategoryPicks {
    pub fn get(&self, category: Category) -> Option<&Candidate> {
        match category {
            Category::LeastDeviation => self.least_deviation.as_ref(),
            Category::BestFuelEfficiency => self.best_fuel_efficiency.as_ref(),
            Category::Safest => self.safest.as_ref(),
        }
    }

    fn slot(&mut self, category: Category) -> &mut Option<Candidate> {
        match category {
            Category::LeastDeviation => &mut self.least_deviation,
            Category::BestFuelEfficiency => &mut self.best_fuel_efficiency,
            Category::Safest => &mut self.safest,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.least_deviation.is_none() && self.best_fuel_efficiency.is_none() && self.safest.is_none()
    }

    pub fn to_output(&self) -> OutputPicks {
        OutputPicks {
            least_deviation: self.least_deviation.as_ref().map(AlternateAirport::from),
            best_fuel_efficiency: self.best_fuel_efficiency.as_ref().map(AlternateAirport::from),
            safest: self.safest.as_ref().map(AlternateAirport::from),
        }
    }
}

/// Alternate as reported to briefing consumers.
///
/// `has_fuel` and `has_customs` are filled by other services, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternateAirport {
    pub icao: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub runway_length: Option<u32>,
    pub has_fuel: Option<bool>,
    pub has_customs: Option<bool>,
}

impl From<&Candidate> for AlternateAirport {
    fn from(c: &Candidate) -> Self {
        // Candidates always carry coordinates; the pool filter requires them.
        let (lat, lon) = c.airport.coordinates.unwrap_or_default();
        Self {
            icao: c.airport.code.clone(),
            name: c.airport.name.clone(),
            lat,
            lon,
            runway_length: c.airport.runway_length_m,
            has_fuel: None,
            has_customs: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputPicks {
    pub least_deviation: Option<AlternateAirport>,
    pub best_fuel_efficiency: Option<AlternateAirport>,
    pub safest: Option<AlternateAirport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternatesReport {
    pub destination: String,
    pub alternates: Vec<AlternateAirport>,
    pub alternate_categories: OutputPicks,
}

fn by_distance(a: &Candidate, b: &Candidate) -> Ordering {
    a.distance_nm.total_cmp(&b.distance_nm)
}

fn by_runway_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.runway_or_zero().cmp(&a.runway_or_zero())
}

fn by_class(a: &Candidate, b: &Candidate) -> Ordering {
    a.class().rank().cmp(&b.class().rank())
}

fn sorted_top(
    candidates: &[Candidate],
    max: usize,
    cmp: impl Fn(&Candidate, &Candidate) -> Ordering,
) -> Vec<Candidate> {
    let mut list = candidates.to_vec();
    // `sort_by` is stable: full ties keep dataset order.
    list.sort_by(cmp);
    list.truncate(max);
    list
}

pub fn rank_least_deviation(candidates: &[Candidate], max: usize) -> Vec<Candidate> {
    sorted_top(candidates, max, by_distance)
}

pub fn rank_fuel_efficiency(candidates: &[Candidate], max: usize) -> Vec<Candidate> {
    sorted_top(candidates, max, |a, b| {
        by_distance(a, b).then_with(|| by_runway_desc(a, b))
    })
}

pub fn rank_safest(candidates: &[Candidate], max: usize) -> Vec<Candidate> {
    sorted_top(candidates, max, |a, b| {
        by_runway_desc(a, b)
            .then_with(|| by_class(a, b))
            .then_with(|| by_distance(a, b))
    })
}

pub fn rank_by_category(candidates: &[Candidate], max: usize) -> CategoryRanking {
    CategoryRanking {
        least_deviation: rank_least_deviation(candidates, max),
        best_fuel_efficiency: rank_fuel_efficiency(candidates, max),
        safest: rank_safest(candidates, max),
    }
}

/// One airport per category, never reusing a code.
///
/// Categories claim in [`Category::PICK_ORDER`], so safety gets its true
/// best and later categories take the next unclaimed entry.
pub fn assign_top_picks(ranking: &CategoryRanking) -> CategoryPicks {
    let mut used: HashSet<&str> = HashSet::new();
    let mut picks = CategoryPicks::default();

    for category in Category::PICK_ORDER {
        let pick = ranking
            .get(category)
            .iter()
            .find(|c| !used.contains(c.airport.code.as_str()));
        if let Some(c) = pick {
            used.insert(c.airport.code.as_str());
            *picks.slot(category) = Some(c.clone());
        }
    }
    picks
}

/// Single ordering for callers that want one list: class, then known
/// runways before unknown, then longest runway, then nearest.
pub fn rank_flat(candidates: &[Candidate], max: usize) -> Vec<Candidate> {
    sorted_top(candidates, max, |a, b| {
        by_class(a, b)
            .then_with(|| {
                let known_a = a.airport.runway_length_m.is_some();
                let known_b = b.airport.runway_length_m.is_some();
                known_b.cmp(&known_a)
            })
            .then_with(|| by_runway_desc(a, b))
            .then_with(|| by_distance(a, b))
    })
}
