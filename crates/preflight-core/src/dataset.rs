// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Column injected into airport rows by the runway join.
pub const LONGEST_RUNWAY_FT: &str = "longest_runway_ft";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One raw dataset row keyed by lowercased header name.
///
/// Blank cells are not stored, so `get` only ever returns non-empty text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.fields
            .insert(key.trim().to_lowercase(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k.as_ref(), v.as_ref());
        }
        row
    }
}

/// Read-only provider of raw airport rows.
///
/// Implementations memoize: `load` may do work on the first call only.
pub trait AirportSource: Send + Sync {
    fn load(&self) -> &[RawRow];
}

/// Parses a headed, comma-delimited table into raw rows.
///
/// Records that fail to decode are skipped; a header that cannot be read
/// fails the whole parse.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping malformed dataset record {}: {}", line + 1, e);
                continue;
            }
        };
        let row: RawRow = headers.iter().zip(record.iter()).collect();
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// In-memory rows, handed over by a host that already has the data.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Vec<RawRow>,
}

impl InMemorySource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }
}

impl AirportSource for InMemorySource {
    fn load(&self) -> &[RawRow] {
        &self.rows
    }
}

/// Airport CSV on disk, read once on first use.
#[derive(Debug)]
pub struct CsvFileSource {
    path: PathBuf,
    runways_path: Option<PathBuf>,
    rows: OnceLock<Vec<RawRow>>,
}

impl CsvFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            runways_path: None,
            rows: OnceLock::new(),
        }
    }

    /// Attaches an OurAirports-style `runways.csv` whose longest open runway
    /// per airport is merged into the airport rows on load.
    pub fn with_runways<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.runways_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Vec<RawRow> {
        if !self.path.exists() {
            warn!(
                "Airport dataset not found; alternates will be empty — path={}",
                self.path.display()
            );
            return Vec::new();
        }

        let mut rows = match File::open(&self.path)
            .map_err(DatasetError::from)
            .and_then(parse_rows)
        {
            Ok(rows) => rows,
            Err(e) => {
                error!(
                    "Failed to read airport dataset — path={} error={}",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        if let Some(runways_path) = &self.runways_path {
            match read_runway_lengths(runways_path) {
                Ok(Some(lengths)) => merge_runway_lengths(&mut rows, &lengths),
                Ok(None) => warn!(
                    "Runway dataset not found; runway lengths unknown — path={}",
                    runways_path.display()
                ),
                Err(e) => error!(
                    "Failed to read runway dataset — path={} error={}",
                    runways_path.display(),
                    e
                ),
            }
        }

        info!(
            "Loaded airport dataset — path={} rows={}",
            self.path.display(),
            rows.len()
        );
        rows
    }
}

impl AirportSource for CsvFileSource {
    fn load(&self) -> &[RawRow] {
        self.rows.get_or_init(|| self.read_all())
    }
}

fn read_runway_lengths(path: &Path) -> Result<Option<HashMap<String, f64>>, DatasetError> {
    if !path.exists() {
        return Ok(None);
    }
    let rows = parse_rows(File::open(path)?)?;
    Ok(Some(longest_runways(&rows)))
}

/// Longest open runway in feet per `airport_ident`.
pub fn longest_runways(runway_rows: &[RawRow]) -> HashMap<String, f64> {
    let mut longest: HashMap<String, f64> = HashMap::new();
    for row in runway_rows {
        let Some(ident) = row.get("airport_ident") else {
            continue;
        };
        if matches!(row.get("closed"), Some("1") | Some("true") | Some("TRUE")) {
            continue;
        }
        let length = match row.get("length_ft").and_then(|v| v.parse::<f64>().ok()) {
            Some(l) if l.is_finite() && l > 0.0 => l,
            _ => continue,
        };
        let entry = longest.entry(ident.to_uppercase()).or_insert(0.0);
        if length > *entry {
            *entry = length;
        }
    }
    longest
}

/// Writes `longest_runway_ft` into airport rows keyed by `ident`, leaving
/// rows that already carry that column untouched.
pub fn merge_runway_lengths(rows: &mut [RawRow], lengths: &HashMap<String, f64>) {
    let mut merged = 0usize;
    for row in rows.iter_mut() {
        if row.contains(LONGEST_RUNWAY_FT) {
            continue;
        }
        let Some(ident) = row.get("ident").map(str::to_uppercase) else {
            continue;
        };
        if let Some(ft) = lengths.get(&ident) {
            row.insert(LONGEST_RUNWAY_FT, &ft.to_string());
            merged += 1;
        }
    }
    debug!("Merged runway lengths into {} airport rows", merged);
}
