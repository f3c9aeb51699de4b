// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::alternates::{
    SearchParams, DEFAULT_MAX_RESULTS, DEFAULT_MIN_RUNWAY_M, DEFAULT_PICK_POOL, DEFAULT_RADIUS_NM,
};
use crate::fetch::{DEFAULT_AIRPORTS_URL, DEFAULT_RUNWAYS_URL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const AIRPORTS_FILE: &str = "airports.csv";
pub const RUNWAYS_FILE: &str = "runways.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlternatesConfig {
    pub radius_nm: f64,
    /// `null` disables the runway check.
    pub min_runway_m: Option<u32>,
    pub max_results: usize,
    pub pick_pool: usize,
    /// Where `airports.csv` and `runways.csv` live. Defaults to
    /// `<config root>/data`.
    pub dataset_dir: Option<PathBuf>,
    pub airports_url: String,
    pub runways_url: String,
    /// Age after which `fetch` re-downloads the dataset.
    pub refresh_days: u64,
}

impl Default for AlternatesConfig {
    fn default() -> Self {
        Self {
            radius_nm: DEFAULT_RADIUS_NM,
            min_runway_m: Some(DEFAULT_MIN_RUNWAY_M),
            max_results: DEFAULT_MAX_RESULTS,
            pick_pool: DEFAULT_PICK_POOL,
            dataset_dir: None,
            airports_url: DEFAULT_AIRPORTS_URL.to_string(),
            runways_url: DEFAULT_RUNWAYS_URL.to_string(),
            refresh_days: 7,
        }
    }
}

impl AlternatesConfig {
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            radius_nm: self.radius_nm,
            min_runway_m: self.min_runway_m,
            max_results: self.max_results,
            pick_pool: self.pick_pool,
        }
    }

    pub fn dataset_dir(&self) -> PathBuf {
        self.dataset_dir
            .clone()
            .unwrap_or_else(|| crate::get_config_root().join("data"))
    }

    pub fn airports_path(&self) -> PathBuf {
        self.dataset_dir().join(AIRPORTS_FILE)
    }

    pub fn runways_path(&self) -> PathBuf {
        self.dataset_dir().join(RUNWAYS_FILE)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config_path: crate::get_config_root().join("alternates.json"),
        }
    }

    pub fn at<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<AlternatesConfig> {
        if !self.config_path.exists() {
            return Ok(AlternatesConfig::default());
        }

        let content =
            fs::read_to_string(&self.config_path).context("Failed to read alternates.json")?;

        serde_json::from_str(&content).context("Failed to parse alternates.json")
    }

    pub fn save(&self, config: &AlternatesConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize alternates config")?;

        fs::write(&self.config_path, content).context("Failed to write alternates.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let mgr = ConfigManager::at(dir.path().join("alternates.json"));
        let config = mgr.load().unwrap();
        assert_eq!(config, AlternatesConfig::default());
        assert_eq!(config.search_params(), SearchParams::default());
    }

    #[test]
    fn test_round_trip_creates_parents() {
        let dir = tempdir().unwrap();
        let mgr = ConfigManager::at(dir.path().join("nested").join("alternates.json"));
        let config = AlternatesConfig {
            radius_nm: 120.0,
            min_runway_m: None,
            dataset_dir: Some(dir.path().join("data")),
            ..Default::default()
        };

        mgr.save(&config).unwrap();
        let loaded = mgr.load().unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.airports_path(), dir.path().join("data").join("airports.csv"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alternates.json");
        fs::write(&path, r#"{ "max_results": 3 }"#).unwrap();

        let config = ConfigManager::at(&path).load().unwrap();
        assert_eq!(config.max_results, 3);
        assert_eq!(config.radius_nm, 200.0);
        assert_eq!(config.min_runway_m, Some(2200));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alternates.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ConfigManager::at(&path).load().is_err());
    }
}
