// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Alternate airport selection for pre-flight briefings.
//!
//! The crate turns a loosely structured airport dataset (OurAirports CSV or
//! any revision with renamed columns) into a normalized table, then finds and
//! ranks diversion candidates around a destination.

pub mod alternates;
pub mod config;
pub mod dataset;
pub mod fetch;
pub mod geo;
pub mod normalize;
pub mod ranker;

use std::path::PathBuf;

pub use alternates::{find_candidates, is_suitable, AlternatesService, Candidate, SearchParams};
pub use config::{AlternatesConfig, ConfigManager};
pub use dataset::{AirportSource, CsvFileSource, DatasetError, InMemorySource, RawRow};
pub use geo::distance_nm;
pub use normalize::{normalize, AirportClass, AirportDatabase, AirportRecord, AirportTable};
pub use ranker::{
    AlternateAirport, AlternatesReport, Category, CategoryPicks, CategoryRanking, OutputPicks,
};

/// Directory holding `alternates.json` and the downloaded dataset.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "preflight", "Preflight")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".preflight"))
}
