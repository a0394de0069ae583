//! The caller-owned run context of one tick.
//!
//! A [`RunContext`] carries the tick's inputs, the observer sinks, and the
//! scratch state phases hand to each other (zone deltas, sensor readings,
//! dosing, operating hours, the usage ledger). The scratch state is reset
//! at `Initialization` and never persisted.
//!
//! Telemetry and diagnostics raised by phases are buffered and handed to the
//! sinks only when the tick commits, so a failed tick publishes nothing.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use growsim_ledger::{LedgerError, TariffOverrides, UsageLedger};
use growsim_physics::effects::NutrientMap;
use growsim_physics::{ZoneCapacity, ZoneDeltas};
use growsim_types::{
    CostBreakdown, DeviceId, Diagnostic, IrrigationEvent, SensorReading, Severity,
    TickThroughput, ZoneId,
};

use crate::sinks::{DiagnosticSink, StageHook, TelemetrySink};
use crate::tick::TickPhase;

/// Caller-supplied inputs of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickInputs {
    /// Irrigation events to apply this tick.
    #[serde(default)]
    pub irrigation_events: Vec<IrrigationEvent>,
    /// Simulated hours the tick covers.
    #[serde(default = "default_tick_duration_hours")]
    pub tick_duration_hours: f64,
    /// Tariffs replacing the configured ones for this tick only.
    #[serde(default)]
    pub tariff_overrides: TariffOverrides,
}

const fn default_tick_duration_hours() -> f64 {
    1.0
}

impl Default for TickInputs {
    fn default() -> Self {
        Self {
            irrigation_events: Vec::new(),
            tick_duration_hours: default_tick_duration_hours(),
            tariff_overrides: TariffOverrides::default(),
        }
    }
}

impl TickInputs {
    /// Inputs for a tick of `hours` with no events.
    pub fn with_duration(hours: f64) -> Self {
        Self {
            tick_duration_hours: hours,
            ..Self::default()
        }
    }
}

/// The observers a tick reports to.
pub struct Sinks<'a> {
    /// Receives `zone.snapshot` and `tick.completed`.
    pub telemetry: &'a mut dyn TelemetrySink,
    /// Receives diagnostics.
    pub diagnostics: &'a mut dyn DiagnosticSink,
    /// Notified after each phase.
    pub hook: &'a mut dyn StageHook,
}

/// Scratch state threaded between the phases of one tick.
#[derive(Debug, Default)]
pub(crate) struct TickRuntime {
    pub(crate) zone_deltas: BTreeMap<ZoneId, ZoneDeltas>,
    pub(crate) capacities: BTreeMap<ZoneId, ZoneCapacity>,
    pub(crate) lights_on: BTreeMap<ZoneId, bool>,
    pub(crate) sensor_readings: BTreeMap<ZoneId, Vec<SensorReading>>,
    pub(crate) zone_warnings: BTreeMap<ZoneId, Vec<Diagnostic>>,
    pub(crate) dosing_mg: BTreeMap<ZoneId, NutrientMap>,
    pub(crate) nutrient_satisfaction: BTreeMap<ZoneId, f64>,
    pub(crate) operating_hours: BTreeMap<DeviceId, f64>,
    pub(crate) updated_zones: BTreeSet<ZoneId>,
    pub(crate) ledger: UsageLedger,
    pub(crate) payroll: Decimal,
    pub(crate) throughput: TickThroughput,
    pub(crate) mutated: bool,
    pending_telemetry: Vec<(&'static str, serde_json::Value)>,
    pending_diagnostics: Vec<Diagnostic>,
}

/// Everything one tick reads and writes besides the world itself.
pub struct RunContext<'a> {
    inputs: TickInputs,
    sinks: Sinks<'a>,
    pub(crate) runtime: TickRuntime,
    last_costs: Option<CostBreakdown>,
}

impl<'a> RunContext<'a> {
    /// Create a context for one tick.
    pub fn new(inputs: TickInputs, sinks: Sinks<'a>) -> Self {
        Self {
            inputs,
            sinks,
            runtime: TickRuntime::default(),
            last_costs: None,
        }
    }

    /// The tick's inputs.
    pub const fn inputs(&self) -> &TickInputs {
        &self.inputs
    }

    /// Cost breakdown of the last completed tick run with this context.
    pub const fn last_costs(&self) -> Option<&CostBreakdown> {
        self.last_costs.as_ref()
    }

    /// Throughput counters of the tick in progress or last completed.
    pub const fn throughput(&self) -> TickThroughput {
        self.runtime.throughput
    }

    /// Drop all scratch state from a previous tick.
    pub(crate) fn reset(&mut self) {
        self.runtime = TickRuntime::default();
        self.last_costs = None;
    }

    /// Notify the stage hook.
    pub(crate) fn stage_complete(&mut self, phase: TickPhase) {
        tracing::debug!(phase = phase.as_str(), "Phase complete");
        self.sinks.hook.on_stage_complete(phase);
    }

    /// Record a diagnostic; zone-scoped ones are also kept for that zone's snapshot.
    pub(crate) fn diagnose(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity >= Severity::Warning {
            tracing::warn!(
                code = %diagnostic.code,
                zone_id = ?diagnostic.zone_id,
                device_id = ?diagnostic.device_id,
                plant_id = ?diagnostic.plant_id,
                "{}",
                diagnostic.message
            );
        }
        if let Some(zone_id) = diagnostic.zone_id {
            self.runtime
                .zone_warnings
                .entry(zone_id)
                .or_default()
                .push(diagnostic.clone());
        }
        self.runtime.pending_diagnostics.push(diagnostic);
    }

    /// Queue a telemetry event for publication at commit.
    pub(crate) fn publish<T: Serialize>(
        &mut self,
        topic: &'static str,
        payload: &T,
    ) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(payload)?;
        self.runtime.pending_telemetry.push((topic, value));
        Ok(())
    }

    /// Record energy used by a device.
    pub(crate) fn record_energy(&mut self, device_id: DeviceId, kwh: f64) -> Result<(), LedgerError> {
        self.runtime.ledger.record_energy(device_id, kwh)
    }

    /// Record water delivered to a zone.
    pub(crate) fn record_water(&mut self, zone_id: ZoneId, m3: f64) -> Result<(), LedgerError> {
        self.runtime.ledger.record_water(zone_id, m3)
    }

    /// Note a replaced zone; this makes the tick a mutating one.
    pub(crate) fn mark_zone_updated(&mut self, zone_id: ZoneId) {
        if self.runtime.updated_zones.insert(zone_id) {
            self.runtime.throughput.zones_updated =
                self.runtime.throughput.zones_updated.saturating_add(1);
        }
        self.runtime.mutated = true;
    }

    /// Hand everything buffered during the tick to the sinks.
    pub(crate) fn flush(&mut self, costs: CostBreakdown) {
        for diagnostic in std::mem::take(&mut self.runtime.pending_diagnostics) {
            self.sinks.diagnostics.emit(&diagnostic);
        }
        for (topic, payload) in std::mem::take(&mut self.runtime.pending_telemetry) {
            self.sinks.telemetry.emit(topic, &payload);
        }
        self.last_costs = Some(costs);
    }
}
