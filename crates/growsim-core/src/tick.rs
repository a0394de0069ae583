//! Tick cycle: the ten-step pipeline that advances a growsim world.
//!
//! Each tick runs these phases, always all of them, always in this order:
//!
//! 1. **Initialization** -- reset the run context's scratch state.
//! 2. **ApplyDeviceEffects** -- aggregate zone capacity and sum per-device
//!    thermal, humidity, CO2, lighting, and dosing effects into deltas.
//! 3. **ApplySensors** -- read the pre-actuation zone state through noisy
//!    sensors, each on its own RNG stream.
//! 4. **UpdateEnvironment** -- apply deltas, crop load and ambient exchange;
//!    queue one `zone.snapshot` per updated zone.
//! 5. **ApplyIrrigationAndNutrients** -- resolve irrigation events and
//!    dosing into substrate water and the nutrient buffer.
//! 6. **ApplyWorkforce** -- book payroll from the [`WorkforceSource`].
//! 7. **AdvancePhysiology** -- age, grow, stress, and stage plants against
//!    the tick's final environment.
//! 8. **ApplyHarvestAndInventory** -- turn harvest-ready plants into lots.
//! 9. **ApplyEconomyAccrual** -- consume the usage ledger once and price it.
//! 10. **CommitAndTelemetry** -- wear devices, advance time if anything
//!     changed, publish buffered events and `tick.completed`.
//!
//! Phases work on a private copy of the world whose children are still
//! shared with the input snapshot. Any error drops the copy, so a failed
//! tick commits nothing. A tick that changes nothing hands back the input
//! `Arc` itself.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use growsim_ledger::LedgerError;
use growsim_physics::PhysicsError;
use growsim_types::{topics, DeviceId, TickCompleted, World, ZoneId};

use crate::clock::{ClockError, SimClock};
use crate::config::SimulationConfig;
use crate::context::RunContext;
use crate::phases::{self, TickScope};
use crate::workforce::{StubWorkforce, WorkforceError, WorkforceSource};

/// The pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickPhase {
    /// Reset scratch state.
    Initialization,
    /// Device effects and capacity aggregation.
    ApplyDeviceEffects,
    /// Sensor readings.
    ApplySensors,
    /// Zone air balance.
    UpdateEnvironment,
    /// Irrigation and nutrient buffers.
    ApplyIrrigationAndNutrients,
    /// Workforce payroll.
    ApplyWorkforce,
    /// Plant growth and staging.
    AdvancePhysiology,
    /// Harvest lots.
    ApplyHarvestAndInventory,
    /// Cost accrual.
    ApplyEconomyAccrual,
    /// Wear, time advance, publication.
    CommitAndTelemetry,
}

impl TickPhase {
    /// Every phase in execution order.
    pub const ALL: [Self; 10] = [
        Self::Initialization,
        Self::ApplyDeviceEffects,
        Self::ApplySensors,
        Self::UpdateEnvironment,
        Self::ApplyIrrigationAndNutrients,
        Self::ApplyWorkforce,
        Self::AdvancePhysiology,
        Self::ApplyHarvestAndInventory,
        Self::ApplyEconomyAccrual,
        Self::CommitAndTelemetry,
    ];

    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialization => "initialization",
            Self::ApplyDeviceEffects => "apply_device_effects",
            Self::ApplySensors => "apply_sensors",
            Self::UpdateEnvironment => "update_environment",
            Self::ApplyIrrigationAndNutrients => "apply_irrigation_and_nutrients",
            Self::ApplyWorkforce => "apply_workforce",
            Self::AdvancePhysiology => "advance_physiology",
            Self::ApplyHarvestAndInventory => "apply_harvest_and_inventory",
            Self::ApplyEconomyAccrual => "apply_economy_accrual",
            Self::CommitAndTelemetry => "commit_and_telemetry",
        }
    }
}

/// Errors that abort a tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// Corrupt static data or a missing dependency in a physics computation.
    #[error("physics error (zone {zone_id:?}, device {device_id:?}): {source}")]
    Physics {
        /// Zone being processed.
        zone_id: Option<ZoneId>,
        /// Device being processed.
        device_id: Option<DeviceId>,
        /// The underlying physics error.
        source: PhysicsError,
    },

    /// Usage could not be recorded or priced.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The workforce source failed.
    #[error("workforce error: {source}")]
    Workforce {
        /// The underlying workforce error.
        #[from]
        source: WorkforceError,
    },

    /// A telemetry payload could not be serialized.
    #[error("telemetry serialization failed: {source}")]
    Telemetry {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The tick duration is not a positive, finite number of hours.
    #[error("tick duration {hours} h must be positive and finite")]
    InvalidTickDuration {
        /// The rejected duration.
        hours: f64,
    },
}

impl TickError {
    /// Wrap a physics error with the node it was raised for.
    pub(crate) const fn physics(
        zone_id: Option<ZoneId>,
        device_id: Option<DeviceId>,
        source: PhysicsError,
    ) -> Self {
        Self::Physics {
            zone_id,
            device_id,
            source,
        }
    }
}

/// Result of one successful tick.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    /// The next snapshot; the input `Arc` itself when nothing changed.
    pub world: Arc<World>,
    /// Whether the tick changed the world.
    pub mutated: bool,
    /// The `tick.completed` payload.
    pub summary: TickCompleted,
}

/// The tick pipeline bound to a configuration.
pub struct Simulation {
    config: SimulationConfig,
    clock: SimClock,
    workforce: Box<dyn WorkforceSource>,
}

impl Simulation {
    /// Build a pipeline with the stub workforce from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] if the configured epoch does not parse.
    pub fn new(config: SimulationConfig) -> Result<Self, TickError> {
        let clock = SimClock::new(&config.world.epoch)?;
        let workforce = Box::new(StubWorkforce::new(config.workforce.payroll_per_hour));
        Ok(Self {
            config,
            clock,
            workforce,
        })
    }

    /// Replace the workforce source.
    #[must_use]
    pub fn with_workforce(mut self, workforce: Box<dyn WorkforceSource>) -> Self {
        self.workforce = workforce;
        self
    }

    /// The active configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The calendar.
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Execute one complete tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] if any phase fails; the input world is then
    /// the current state and nothing has been published.
    pub fn run_tick(
        &mut self,
        world: &Arc<World>,
        ctx: &mut RunContext<'_>,
    ) -> Result<TickOutcome, TickError> {
        let hours = ctx.inputs().tick_duration_hours;
        if !hours.is_finite() || hours <= 0.0 {
            return Err(TickError::InvalidTickDuration { hours });
        }

        let scope = TickScope {
            config: &self.config,
            clock: &self.clock,
            seed: &world.seed,
            tick: world.tick,
            sim_time_hours: world.sim_time_hours,
            hours,
        };
        info!(
            tick = scope.tick,
            sim_time_hours = scope.sim_time_hours,
            hours,
            "Tick started"
        );

        // --- Phase 1: Initialization ---
        ctx.reset();
        let mut next = World::clone(world);
        ctx.stage_complete(TickPhase::Initialization);

        // --- Phase 2: Device effects ---
        phases::device_effects::run(&scope, &next, ctx)?;
        ctx.stage_complete(TickPhase::ApplyDeviceEffects);

        // --- Phase 3: Sensors ---
        phases::sensors::run(&scope, &next, ctx)?;
        ctx.stage_complete(TickPhase::ApplySensors);

        // --- Phase 4: Environment ---
        phases::environment::run(&scope, &mut next, ctx)?;
        ctx.stage_complete(TickPhase::UpdateEnvironment);

        // --- Phase 5: Irrigation and nutrients ---
        phases::irrigation::run(&scope, &mut next, ctx)?;
        ctx.stage_complete(TickPhase::ApplyIrrigationAndNutrients);

        // --- Phase 6: Workforce ---
        let workforce = self.workforce.payroll(scope.tick, &next, hours)?;
        ctx.runtime.payroll = workforce.payroll;
        debug!(tick = scope.tick, payroll = %workforce.payroll, "Workforce booked");
        ctx.stage_complete(TickPhase::ApplyWorkforce);

        // --- Phase 7: Physiology ---
        phases::physiology::run(&scope, &mut next, ctx);
        ctx.stage_complete(TickPhase::AdvancePhysiology);

        // --- Phase 8: Harvest ---
        phases::harvest::run(&scope, &mut next, ctx);
        ctx.stage_complete(TickPhase::ApplyHarvestAndInventory);

        // --- Phase 9: Economy ---
        let costs = phases::economy::run(&scope, &next, ctx)?;
        ctx.stage_complete(TickPhase::ApplyEconomyAccrual);

        // --- Phase 10: Commit ---
        let outcome = phases::commit::run(&scope, world, next, costs, ctx)?;
        ctx.stage_complete(TickPhase::CommitAndTelemetry);

        info!(
            tick = outcome.summary.tick,
            mutated = outcome.mutated,
            zones_updated = outcome.summary.throughput.zones_updated,
            total_cost = %outcome.summary.costs.total,
            "Tick completed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        let mut sorted = TickPhase::ALL;
        sorted.sort();
        assert_eq!(sorted, TickPhase::ALL);
        assert_eq!(TickPhase::ALL.first(), Some(&TickPhase::Initialization));
        assert_eq!(TickPhase::ALL.last(), Some(&TickPhase::CommitAndTelemetry));
    }

    #[test]
    fn phase_names_are_snake_case() {
        for phase in TickPhase::ALL {
            let json = serde_json::to_string(&phase).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
        }
    }

    #[test]
    fn bad_epoch_is_a_clock_error() {
        let mut config = SimulationConfig::default();
        config.world.epoch = "not a date".to_owned();
        assert!(matches!(
            Simulation::new(config),
            Err(TickError::Clock { .. })
        ));
    }
}
