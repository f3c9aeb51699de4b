// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::{warn, LevelFilter};
use preflight_core::config::{AlternatesConfig, ConfigManager};
use preflight_core::fetch::DatasetFetcher;
use preflight_core::{AlternatesService, Candidate, CsvFileSource, SearchParams};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding airports.csv and runways.csv
    #[arg(short, long, env = "PREFLIGHT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct SearchArgs {
    /// Destination airport code
    dest: String,
    /// Search radius in nautical miles
    #[arg(long, value_parser = parse_radius)]
    radius: Option<f64>,
    /// Minimum runway length in meters
    #[arg(long, conflicts_with = "no_runway_check")]
    min_runway: Option<u32>,
    /// Accept any runway length
    #[arg(long)]
    no_runway_check: bool,
    /// Maximum entries per list
    #[arg(long)]
    max: Option<usize>,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl SearchArgs {
    fn params(&self, config: &AlternatesConfig) -> SearchParams {
        let mut params = config.search_params();
        if let Some(radius) = self.radius {
            params.radius_nm = radius;
        }
        if self.no_runway_check {
            params.min_runway_m = None;
        } else if let Some(min) = self.min_runway {
            params.min_runway_m = Some(min);
        }
        if let Some(max) = self.max {
            params.max_results = max;
        }
        params
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Single ranked list of alternates
    Alternates(SearchArgs),
    /// Ranked lists and top pick for each category
    Categories(SearchArgs),
    /// Alternates and category picks as briefing JSON
    Report(SearchArgs),
    /// Show the normalized record for an airport
    Info { code: String },
    /// Download or refresh the airport dataset
    Fetch {
        /// Download even if the local copy is fresh
        #[arg(long)]
        force: bool,
    },
    /// Show config location and effective values
    Config,
}

fn parse_radius(s: &str) -> Result<f64, String> {
    let radius: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if radius.is_finite() && radius >= 0.0 {
        Ok(radius)
    } else {
        Err(format!("radius must be a non-negative number of nautical miles, got '{}'", s))
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)?;
    Ok(())
}

fn print_candidates(title: &str, list: &[Candidate]) {
    println!("{}", title);
    if list.is_empty() {
        println!("  (none)");
        return;
    }
    for (i, c) in list.iter().enumerate() {
        println!("  {}. {}", i + 1, describe(c));
    }
}

fn describe(c: &Candidate) -> String {
    let runway = c
        .airport
        .runway_length_m
        .map(|m| format!("{} m", m))
        .unwrap_or_else(|| "runway ?".to_string());
    format!(
        "{:<5} {:<40} {:>6.1} nm  {:>9}  {}",
        c.airport.code,
        c.airport.name.as_deref().unwrap_or("-"),
        c.distance_nm,
        runway,
        c.airport.classification.as_deref().unwrap_or("unclassified"),
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let manager = ConfigManager::new();
    let mut config = manager.load()?;
    if let Some(dir) = cli.data_dir {
        config.dataset_dir = Some(dir);
    }

    if let Commands::Fetch { force } = cli.command {
        let outcome = DatasetFetcher::from_config(&config).ensure_dataset(force)?;
        for path in &outcome.refreshed {
            println!("Downloaded {}", path.display());
        }
        for path in &outcome.kept {
            println!("Up to date {}", path.display());
        }
        return Ok(());
    }

    if let Commands::Config = cli.command {
        println!("Config file: {}", manager.path().display());
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if let Err(e) = DatasetFetcher::from_config(&config).ensure_present() {
        warn!("Could not download airport dataset; continuing without it — {:#}", e);
    }
    let source = CsvFileSource::new(config.airports_path()).with_runways(config.runways_path());
    if !source.path().exists() {
        eprintln!(
            "No airport dataset at {}. Run `preflight fetch` to download it.",
            source.path().display()
        );
    }
    let service = AlternatesService::with_defaults(Arc::new(source), config.search_params());

    match &cli.command {
        Commands::Alternates(args) => {
            let params = args.params(&config);
            let list = service.rank_flat(&args.dest, Some(&params));
            if args.json {
                let out: Vec<_> = list
                    .iter()
                    .map(preflight_core::AlternateAirport::from)
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_candidates(
                    &format!("Alternates for {}", args.dest.to_uppercase()),
                    &list,
                );
            }
        }
        Commands::Categories(args) => {
            let params = args.params(&config);
            let ranking = service.rank_by_category(&args.dest, Some(&params));
            let picks = service.top_pick_per_category(&args.dest, Some(&params));
            if args.json {
                let out = serde_json::json!({
                    "ranking": ranking,
                    "picks": picks.to_output(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_candidates("Least deviation", &ranking.least_deviation);
                print_candidates("Best fuel efficiency", &ranking.best_fuel_efficiency);
                print_candidates("Safest", &ranking.safest);
                println!("Top picks");
                for category in preflight_core::Category::PICK_ORDER {
                    let pick = picks
                        .get(category)
                        .map(describe)
                        .unwrap_or_else(|| "(none)".to_string());
                    println!("  {:<21} {}", category.key(), pick);
                }
            }
        }
        Commands::Report(args) => {
            let params = args.params(&config);
            let report = service.report(&args.dest, Some(&params));
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Info { code } => match service.lookup(code) {
            Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
            None => println!("No airport found for '{}'", code),
        },
        Commands::Fetch { .. } | Commands::Config => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_rejects_nan_and_negative() {
        assert_eq!(parse_radius("150"), Ok(150.0));
        assert_eq!(parse_radius("0"), Ok(0.0));
        assert!(parse_radius("NaN").is_err());
        assert!(parse_radius("inf").is_err());
        assert!(parse_radius("-5").is_err());
        assert!(parse_radius("far").is_err());
    }

    #[test]
    fn test_cli_rejects_nan_radius() {
        let parsed = Cli::try_parse_from(["preflight", "alternates", "KBOS", "--radius", "NaN"]);
        assert!(parsed.is_err());

        let parsed =
            Cli::try_parse_from(["preflight", "alternates", "KBOS", "--radius", "80"]).unwrap();
        match parsed.command {
            Commands::Alternates(args) => assert_eq!(args.radius, Some(80.0)),
            _ => panic!("expected alternates"),
        }
    }
}
