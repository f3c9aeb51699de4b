// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_AIRPORTS_URL: &str =
    "https://davidmegginson.github.io/ourairports-data/airports.csv";
pub const DEFAULT_RUNWAYS_URL: &str =
    "https://davidmegginson.github.io/ourairports-data/runways.csv";
const DEFAULT_TTL_SECS: u64 = 7 * 24 * 3600;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub refreshed: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
}

/// Keeps a local copy of the public airport dataset.
///
/// The ranking code never calls this; it only reads what is on disk.
pub struct DatasetFetcher {
    airports_url: String,
    runways_url: String,
    dir: PathBuf,
    ttl: Duration,
}

impl DatasetFetcher {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            airports_url: DEFAULT_AIRPORTS_URL.to_string(),
            runways_url: DEFAULT_RUNWAYS_URL.to_string(),
            dir: dir.as_ref().to_path_buf(),
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }

    pub fn from_config(config: &crate::config::AlternatesConfig) -> Self {
        Self {
            airports_url: config.airports_url.clone(),
            runways_url: config.runways_url.clone(),
            dir: config.dataset_dir(),
            ttl: Duration::from_secs(config.refresh_days.saturating_mul(24 * 3600)),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn airports_path(&self) -> PathBuf {
        self.dir.join(crate::config::AIRPORTS_FILE)
    }

    pub fn runways_path(&self) -> PathBuf {
        self.dir.join(crate::config::RUNWAYS_FILE)
    }

    /// True when `path` is missing or older than the TTL.
    pub fn is_stale(&self, path: &Path) -> bool {
        let Ok(metadata) = fs::metadata(path) else {
            return true;
        };
        match metadata.modified().ok().and_then(|m| m.elapsed().ok()) {
            Some(elapsed) => elapsed >= self.ttl,
            None => true,
        }
    }

    /// Downloads the dataset only when `airports.csv` is absent. Returns
    /// `None` without touching the network when a local copy exists.
    pub fn ensure_present(&self) -> Result<Option<FetchOutcome>> {
        if self.airports_path().exists() {
            return Ok(None);
        }
        info!(
            "Airport dataset missing; fetching — path={}",
            self.airports_path().display()
        );
        self.ensure_dataset(false).map(Some)
    }

    /// Downloads whichever files are missing or stale. `force` ignores age.
    pub fn ensure_dataset(&self, force: bool) -> Result<FetchOutcome> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let mut outcome = FetchOutcome::default();
        for (url, path) in [
            (&self.airports_url, self.airports_path()),
            (&self.runways_url, self.runways_path()),
        ] {
            if !force && !self.is_stale(&path) {
                debug!("Using cached dataset file — path={}", path.display());
                outcome.kept.push(path);
                continue;
            }

            info!(
                "Dataset file expired or missing; downloading — path={} url={}",
                path.display(),
                url
            );
            let response = client
                .get(url.as_str())
                .send()
                .with_context(|| format!("Request to {} failed", url))?
                .error_for_status()?;
            let body = response.text()?;

            // Write beside the target first so readers never see a partial file.
            let tmp = path.with_extension("csv.part");
            fs::write(&tmp, &body)
                .with_context(|| format!("Failed to write {}", tmp.display()))?;
            fs::rename(&tmp, &path)
                .with_context(|| format!("Failed to move {} into place", tmp.display()))?;

            info!(
                "Dataset file updated — path={} bytes={}",
                path.display(),
                body.len()
            );
            outcome.refreshed.push(path);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_stale() {
        let dir = tempdir().unwrap();
        let fetcher = DatasetFetcher::new(dir.path());
        assert!(fetcher.is_stale(&fetcher.airports_path()));
    }

    #[test]
    fn test_fresh_file_is_not_stale() {
        let dir = tempdir().unwrap();
        let fetcher = DatasetFetcher::new(dir.path());
        fs::write(fetcher.airports_path(), "ident\n").unwrap();
        assert!(!fetcher.is_stale(&fetcher.airports_path()));

        let zero_ttl = DatasetFetcher::new(dir.path()).with_ttl(Duration::ZERO);
        assert!(zero_ttl.is_stale(&zero_ttl.airports_path()));
    }

    #[test]
    fn test_fresh_files_skip_network() {
        let dir = tempdir().unwrap();
        let fetcher = DatasetFetcher::new(dir.path());
        fs::write(fetcher.airports_path(), "ident\n").unwrap();
        fs::write(fetcher.runways_path(), "airport_ident\n").unwrap();

        let outcome = fetcher.ensure_dataset(false).unwrap();
        assert!(outcome.refreshed.is_empty());
        assert_eq!(outcome.kept.len(), 2);
    }

    #[test]
    fn test_ensure_present_skips_existing_dataset() {
        let dir = tempdir().unwrap();
        // Unroutable URLs: any download attempt would fail the test.
        let config = crate::config::AlternatesConfig {
            dataset_dir: Some(dir.path().to_path_buf()),
            airports_url: "http://127.0.0.1:9/airports.csv".into(),
            runways_url: "http://127.0.0.1:9/runways.csv".into(),
            ..Default::default()
        };
        let fetcher = DatasetFetcher::from_config(&config);
        fs::write(fetcher.airports_path(), "ident\nKBOS\n").unwrap();

        assert_eq!(fetcher.ensure_present().unwrap(), None);
    }

    #[test]
    fn test_ensure_present_reports_failed_download() {
        let dir = tempdir().unwrap();
        let config = crate::config::AlternatesConfig {
            dataset_dir: Some(dir.path().to_path_buf()),
            airports_url: "http://127.0.0.1:9/airports.csv".into(),
            runways_url: "http://127.0.0.1:9/runways.csv".into(),
            ..Default::default()
        };
        let fetcher = DatasetFetcher::from_config(&config);

        assert!(fetcher.ensure_present().is_err());
        assert!(!fetcher.airports_path().exists());
    }

    #[test]
    fn test_huge_refresh_days_saturates() {
        let config = crate::config::AlternatesConfig {
            refresh_days: u64::MAX,
            ..Default::default()
        };
        let fetcher = DatasetFetcher::from_config(&config);
        assert_eq!(fetcher.ttl, Duration::from_secs(u64::MAX));
    }
}
