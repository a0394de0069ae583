//! Deterministic replay harness.
//!
//! [`run_deterministic`] builds (or takes) a world, ticks it for a number of
//! simulated days with a fixed daily irrigation schedule, and records the
//! canonical world hash and cost rollup at the end of every day. Two runs
//! with the same options and configuration produce identical reports; the
//! golden-master tests hold the harness to that.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use growsim_ledger::{CostTotals, LedgerError};
use growsim_types::{CostBreakdown, IrrigationEvent, IrrigationTarget, World};

use crate::config::SimulationConfig;
use crate::context::{RunContext, Sinks, TickInputs};
use crate::fixture::demo_world;
use crate::hashing::world_hash;
use crate::sinks::NoopSinks;
use crate::tick::{Simulation, TickError};
use crate::validation::{validate_world, ValidationIssue};

/// Tolerance when checking that a tick length divides a day.
const DAY_DIVISOR_EPSILON: f64 = 1e-9;

/// Errors that abort a replay.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The starting world failed validation.
    #[error("world failed validation with {} issue(s)", issues.len())]
    InvalidWorld {
        /// Every issue found.
        issues: Vec<ValidationIssue>,
    },

    /// A tick failed.
    #[error("tick failed: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// The configured tick length does not divide a day.
    #[error("tick duration {hours} h does not divide 24 h evenly")]
    InvalidTickDuration {
        /// The rejected duration.
        hours: f64,
    },

    /// The world could not be hashed.
    #[error("world hashing failed: {source}")]
    Hash {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// Daily totals could not be summed.
    #[error("cost totals failed: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}

/// What to replay.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Seed for every RNG stream. Replaces the fixture's seed if one is given.
    pub seed: String,
    /// Simulated days to run.
    pub days: u32,
    /// Starting world; the seeded demo facility when `None`.
    pub world_fixture: Option<Arc<World>>,
}

/// End-of-day record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    /// Zero-based day index.
    pub day: u32,
    /// Canonical world hash at the end of the day.
    pub world_hash: String,
    /// Costs accrued during the day.
    pub rollup: CostBreakdown,
}

/// Result of a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeterministicReport {
    /// Seed the run used.
    pub seed: String,
    /// Days simulated.
    pub days: u32,
    /// One record per day.
    pub daily: Vec<DayRecord>,
    /// Costs over the whole run.
    pub totals: CostBreakdown,
    /// Canonical hash of the final world.
    pub final_hash: String,
}

/// Replay with the default configuration.
///
/// # Errors
///
/// See [`run_deterministic_with`].
pub fn run_deterministic(options: &RunOptions) -> Result<DeterministicReport, ReplayError> {
    run_deterministic_with(options, &SimulationConfig::default())
}

/// Replay with an explicit configuration.
///
/// # Errors
///
/// Returns [`ReplayError::InvalidWorld`] if the starting world is invalid,
/// [`ReplayError::InvalidTickDuration`] if the tick length does not divide a
/// day, and [`ReplayError::Tick`] if any tick fails.
pub fn run_deterministic_with(
    options: &RunOptions,
    config: &SimulationConfig,
) -> Result<DeterministicReport, ReplayError> {
    let hours = config.world.tick_duration_hours;
    let ticks_per_day = ticks_per_day(hours)?;
    let mut world = starting_world(options);

    let issues = validate_world(&world);
    if !issues.is_empty() {
        return Err(ReplayError::InvalidWorld { issues });
    }

    info!(
        seed = %options.seed,
        days = options.days,
        ticks_per_day,
        "Replay started"
    );

    let mut simulation = Simulation::new(config.clone())?;
    let mut totals = CostTotals::new();
    let mut daily = Vec::new();

    for day in 0..options.days {
        let mut day_totals = CostTotals::new();
        for tick_of_day in 0..ticks_per_day {
            let irrigation_events = if tick_of_day == 0 {
                daily_irrigation(&world, config)
            } else {
                Vec::new()
            };
            let inputs = TickInputs {
                irrigation_events,
                tick_duration_hours: hours,
                ..TickInputs::default()
            };
            let mut telemetry = NoopSinks::new();
            let mut diagnostics = NoopSinks::new();
            let mut hook = NoopSinks::new();
            let mut ctx = RunContext::new(
                inputs,
                Sinks {
                    telemetry: &mut telemetry,
                    diagnostics: &mut diagnostics,
                    hook: &mut hook,
                },
            );
            let outcome = simulation.run_tick(&world, &mut ctx)?;
            day_totals.add(&outcome.summary.costs, hours);
            totals.add(&outcome.summary.costs, hours);
            world = outcome.world;
        }

        let record = DayRecord {
            day,
            world_hash: world_hash(&world)?,
            rollup: day_totals.breakdown()?,
        };
        info!(
            day,
            hash = %record.world_hash,
            total = %record.rollup.total,
            plants = world.plant_count(),
            lots = world.company.harvest_lots.len(),
            "Day completed"
        );
        daily.push(record);
    }

    let report = DeterministicReport {
        seed: options.seed.clone(),
        days: options.days,
        daily,
        totals: totals.breakdown()?,
        final_hash: world_hash(&world)?,
    };
    info!(final_hash = %report.final_hash, total = %report.totals.total, "Replay completed");
    Ok(report)
}

fn ticks_per_day(hours: f64) -> Result<u32, ReplayError> {
    if !hours.is_finite() || hours <= 0.0 || hours > 24.0 {
        return Err(ReplayError::InvalidTickDuration { hours });
    }
    let ticks = 24.0 / hours;
    if (ticks - ticks.round()).abs() > DAY_DIVISOR_EPSILON {
        return Err(ReplayError::InvalidTickDuration { hours });
    }
    // Bounded by the checks above; at most a few thousand for sane inputs.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let ticks = ticks.round().min(f64::from(u32::MAX)) as u32;
    Ok(ticks)
}

fn starting_world(options: &RunOptions) -> Arc<World> {
    match &options.world_fixture {
        Some(fixture) if fixture.seed == options.seed => Arc::clone(fixture),
        Some(fixture) => {
            let mut world = World::clone(fixture);
            world.seed.clone_from(&options.seed);
            Arc::new(world)
        }
        None => Arc::new(demo_world(&options.seed)),
    }
}

/// The feed every zone gets at the first tick of each day.
fn daily_irrigation(world: &World, config: &SimulationConfig) -> Vec<IrrigationEvent> {
    let irrigation = &config.irrigation;
    world
        .zones()
        .into_iter()
        .filter_map(|(_, zone)| {
            let water_l = irrigation.daily_water_l_per_m2 * zone.floor_area_m2;
            (water_l > 0.0).then(|| IrrigationEvent {
                target: IrrigationTarget::Zone(zone.id),
                water_l,
                concentrations_mg_per_l: irrigation.feed_concentrations_mg_per_l.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tick_length_must_divide_a_day() {
        assert_eq!(ticks_per_day(1.0).unwrap(), 24);
        assert_eq!(ticks_per_day(0.5).unwrap(), 48);
        assert_eq!(ticks_per_day(6.0).unwrap(), 4);
        assert!(matches!(ticks_per_day(5.0), Err(ReplayError::InvalidTickDuration { .. })));
        assert!(matches!(ticks_per_day(0.0), Err(ReplayError::InvalidTickDuration { .. })));
        assert!(matches!(ticks_per_day(f64::NAN), Err(ReplayError::InvalidTickDuration { .. })));
    }

    #[test]
    fn one_day_replay_reports_one_record() {
        let report = run_deterministic(&RunOptions {
            seed: "replay-1d".to_owned(),
            days: 1,
            world_fixture: None,
        })
        .unwrap();
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.daily.first().map(|d| d.world_hash.as_str()), Some(report.final_hash.as_str()));
        assert!(report.totals.total > rust_decimal::Decimal::ZERO);
        assert!(report.totals.energy_kwh > 0.0);
        assert!(report.totals.water_m3 > 0.0);
    }

    #[test]
    fn fixture_seed_is_replaced_by_options() {
        let fixture = Arc::new(demo_world("original"));
        let world = starting_world(&RunOptions {
            seed: "override".to_owned(),
            days: 0,
            world_fixture: Some(Arc::clone(&fixture)),
        });
        assert_eq!(world.seed, "override");
        assert_eq!(world.company, fixture.company);
    }

    #[test]
    fn invalid_fixture_is_rejected() {
        let mut world = demo_world("bad");
        world.sim_time_hours = -1.0;
        let result = run_deterministic(&RunOptions {
            seed: "bad".to_owned(),
            days: 1,
            world_fixture: Some(Arc::new(world)),
        });
        assert!(matches!(result, Err(ReplayError::InvalidWorld { issues }) if !issues.is_empty()));
    }

    #[test]
    fn daily_feed_targets_every_zone() {
        let world = demo_world("feed");
        let events = daily_irrigation(&world, &SimulationConfig::default());
        assert_eq!(events.len(), world.zones().len());
        assert!(events.iter().all(|e| e.water_l > 0.0));
    }
}
