//! Command-line driver for the growsim simulation core.
//!
//! Replays the seeded demo facility for a number of simulated days and
//! writes the deterministic report as JSON to stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! growsim-engine [DAYS] [SEED]
//! ```
//!
//! `DAYS` defaults to 7 and `SEED` to the configured `world.seed`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `GROWSIM_CONFIG` or `growsim-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Parse the command-line arguments
//! 4. Replay the demo facility
//! 5. Print the report

mod error;

use std::io::Write as _;
use std::path::{Path, PathBuf};

use growsim_core::config::SimulationConfig;
use growsim_core::{run_deterministic_with, RunOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Config file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "growsim-config.yaml";

/// Days replayed when none are given.
const DEFAULT_DAYS: u32 = 7;

fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so the source is
    //    reported once the subscriber exists.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("growsim-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("No config file found, using defaults"),
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_duration_hours = config.world.tick_duration_hours,
        "Simulation configured"
    );

    // 3. Parse arguments.
    let options = parse_args(std::env::args().skip(1), &config)?;

    // 4. Replay.
    let report = run_deterministic_with(&options, &config)?;
    info!(
        days = report.days,
        final_hash = %report.final_hash,
        total_cost = %report.totals.total,
        energy_kwh = report.totals.energy_kwh,
        water_m3 = report.totals.water_m3,
        "Replay finished"
    );

    // 5. Print the report.
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout).map_err(serde_json::Error::io)?;
    Ok(())
}

/// Load configuration, returning the path it came from.
///
/// `GROWSIM_CONFIG` names the file explicitly and must exist. Otherwise
/// `growsim-config.yaml` in the working directory is used when present,
/// and the built-in defaults when not.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if let Some(explicit) = std::env::var_os("GROWSIM_CONFIG") {
        let path = PathBuf::from(explicit);
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        Ok((config, Some(path.to_path_buf())))
    } else {
        Ok((SimulationConfig::default(), None))
    }
}

/// Positional arguments: days, then seed.
fn parse_args(
    mut args: impl Iterator<Item = String>,
    config: &SimulationConfig,
) -> Result<RunOptions, EngineError> {
    let days = match args.next() {
        Some(value) => value.parse::<u32>().map_err(|e| EngineError::Argument {
            reason: format!("days must be a non-negative integer ({e})"),
            value,
        })?,
        None => DEFAULT_DAYS,
    };
    let seed = args.next().unwrap_or_else(|| config.world.seed.clone());
    if let Some(extra) = args.next() {
        return Err(EngineError::Argument {
            value: extra,
            reason: "expected at most two arguments: DAYS [SEED]".to_owned(),
        });
    }
    Ok(RunOptions {
        seed,
        days,
        world_fixture: None,
    })
}
