//! Telemetry payloads, diagnostics, and tick inputs.
//!
//! These are the externally visible contract of the core: the UI and other
//! subsystems key off the `zone.snapshot` and `tick.completed` payloads and
//! the dot-namespaced diagnostic codes.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{SensorMeasurement, Severity};
use crate::ids::{DeviceId, PlantId, ZoneId};

/// Telemetry topic names.
pub mod topics {
    /// One event per tick, emitted at commit.
    pub const TICK_COMPLETED: &str = "tick.completed";
    /// One event per updated zone per tick.
    pub const ZONE_SNAPSHOT: &str = "zone.snapshot";
}

/// Diagnostic codes emitted by the core.
pub mod codes {
    /// Device coverage is below the zone floor area.
    pub const COVERAGE_LOW: &str = "zone.capacity.coverage.warn";
    /// Air changes per hour are below the configured minimum.
    pub const AIRFLOW_LOW: &str = "zone.capacity.airflow.warn";
    /// A plant references a strain that is not in the catalog.
    pub const STRAIN_MISSING: &str = "plant.strain.missing";
    /// An irrigation event targets a zone or plant that does not exist.
    pub const IRRIGATION_TARGET_MISSING: &str = "irrigation.target.missing";
    /// Nutrients overflowed the zone buffer capacity.
    pub const NUTRIENT_RUNOFF: &str = "zone.nutrient.runoff";
    /// A device's condition dropped below the warning threshold.
    pub const DEVICE_CONDITION_LOW: &str = "device.condition.low";
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// A structured, non-fatal diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Diagnostic {
    /// Dot-namespaced code, see [`codes`].
    pub code: String,
    /// Severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Zone the diagnostic refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub zone_id: Option<ZoneId>,
    /// Device the diagnostic refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub device_id: Option<DeviceId>,
    /// Plant the diagnostic refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub plant_id: Option<PlantId>,
}

impl Diagnostic {
    /// A warning not tied to any node.
    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_owned(),
            severity: Severity::Warning,
            message: message.into(),
            zone_id: None,
            device_id: None,
            plant_id: None,
        }
    }

    /// A warning scoped to a zone.
    pub fn zone_warning(code: &str, zone_id: ZoneId, message: impl Into<String>) -> Self {
        Self {
            zone_id: Some(zone_id),
            ..Self::warning(code, message)
        }
    }

    /// Attach a device id.
    #[must_use]
    pub const fn with_device(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    /// Attach a plant id.
    #[must_use]
    pub const fn with_plant(mut self, plant_id: PlantId) -> Self {
        self.plant_id = Some(plant_id);
        self
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// What an irrigation event is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum IrrigationTarget {
    /// A whole zone.
    Zone(ZoneId),
    /// The zone containing this plant.
    Plant(PlantId),
}

/// One irrigation (fertigation) event for the current tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IrrigationEvent {
    /// Target zone or plant.
    pub target: IrrigationTarget,
    /// Water volume, litres.
    pub water_l: f64,
    /// Nutrient concentrations, mg per litre, by nutrient key.
    #[serde(default)]
    pub concentrations_mg_per_l: BTreeMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// A single sensor reading taken this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SensorReading {
    /// The sensor.
    pub device_id: DeviceId,
    /// The measured quantity.
    pub measurement: SensorMeasurement,
    /// The value the sensor reported.
    pub measured_value: f64,
    /// The true value at read time.
    pub true_value: f64,
}

/// Payload of `zone.snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ZoneSnapshot {
    /// Zone id.
    pub zone_id: ZoneId,
    /// Simulated hours after this tick.
    pub sim_time_hours: f64,
    /// Air temperature, °C.
    pub temperature_c: f64,
    /// Relative humidity, [0, 1].
    pub relative_humidity01: f64,
    /// CO2, ppm.
    pub co2_ppm: f64,
    /// Vapour-pressure deficit, kPa.
    pub vpd_kpa: f64,
    /// PPFD, µmol/m²/s.
    pub ppfd_umol_m2s: f64,
    /// Light integral so far today, mol/m².
    pub dli_mol_m2: f64,
    /// Air changes per hour delivered by active devices.
    pub ach: f64,
    /// Sensor readings taken before this tick's actuation.
    pub sensor_readings: Vec<SensorReading>,
    /// Warnings raised for this zone this tick.
    pub warnings: Vec<Diagnostic>,
}

/// Per-tick cost rollup.
///
/// All amounts are for this tick; [`CostBreakdown::total_per_hour`] is the
/// rate normalised by tick duration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CostBreakdown {
    /// Electrical energy consumed, kWh.
    pub energy_kwh: f64,
    /// Water consumed, m³.
    pub water_m3: f64,
    /// Energy cost.
    #[ts(as = "String")]
    pub energy_cost: Decimal,
    /// Water cost.
    #[ts(as = "String")]
    pub water_cost: Decimal,
    /// Workforce payroll.
    #[ts(as = "String")]
    pub payroll_cost: Decimal,
    /// Device maintenance.
    #[ts(as = "String")]
    pub maintenance_cost: Decimal,
    /// Sum of all costs.
    #[ts(as = "String")]
    pub total: Decimal,
    /// Total cost per simulated hour.
    #[ts(as = "String")]
    pub total_per_hour: Decimal,
}

/// Throughput counters of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickThroughput {
    /// Zones whose state changed.
    pub zones_updated: u32,
    /// Devices that ran.
    pub devices_active: u32,
    /// Plants alive at the end of the tick.
    pub plants: u32,
    /// Irrigation events applied.
    pub irrigation_events: u32,
    /// Harvest lots created.
    pub harvest_lots_created: u32,
}

/// Payload of `tick.completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickCompleted {
    /// World tick after commit.
    pub tick: u64,
    /// Simulated hours after commit.
    pub sim_time_hours: f64,
    /// Whether the tick changed the world.
    pub mutated: bool,
    /// Throughput counters.
    pub throughput: TickThroughput,
    /// Cost breakdown.
    pub costs: CostBreakdown,
}
