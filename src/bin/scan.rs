//! Volatility scan CLI
//!
//! Usage: theta-scan <snapshots.json> [config.json]
//!
//! Reads a JSON array of ticker snapshots, scores every ticker and prints the
//! scan report as JSON on stdout. Logs go to stderr; set `RUST_LOG` to adjust.

use std::process::ExitCode;

use theta_harvest::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn run(snapshots_path: &str, config_path: Option<&str>) -> EngineResult<ScanReport> {
    let config = match config_path {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::scanner(),
    };

    let json = std::fs::read_to_string(snapshots_path)?;
    let snapshots: Vec<TickerSnapshot> = serde_json::from_str(&json)?;

    Ok(Scanner::new(config).scan_all(&snapshots))
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(snapshots_path) = args.first() else {
        eprintln!("Usage: theta-scan <snapshots.json> [config.json]");
        return ExitCode::from(2);
    };

    let report = match run(snapshots_path, args.get(1).map(String::as_str)) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scan failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Could not serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}
