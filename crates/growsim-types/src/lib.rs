//! Shared type definitions for the growsim simulation core.
//!
//! This crate is the single source of truth for the world tree and for the
//! payloads the core exchanges with its collaborators. Telemetry and
//! diagnostic types flow downstream to `TypeScript` via `ts-rs` for the UI.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for every node in the world tree
//! - [`enums`] -- Room purposes, placements, lifecycle stages, effect kinds
//! - [`effects`] -- The per-device effect-kind → config map
//! - [`world`] -- Company / structure / room / zone / plant / device / lot
//! - [`telemetry`] -- Diagnostics, irrigation inputs, and telemetry payloads

pub mod effects;
pub mod enums;
pub mod ids;
pub mod telemetry;
pub mod world;

// Re-export all public types at crate root for convenience.
pub use effects::{
    AirflowConfig, Co2Config, EffectConfigs, HumidityConfig, LightingConfig, NutrientConfig,
    SensorConfig, ThermalConfig,
};
pub use enums::{
    DevicePlacement, EffectKind, HumidityMode, LifecycleStage, PhotoperiodPhase, RoomPurpose,
    SensorMeasurement, Severity,
};
pub use ids::{CompanyId, DeviceId, HarvestLotId, PlantId, RoomId, StructureId, ZoneId};
pub use telemetry::{
    codes, topics, CostBreakdown, Diagnostic, IrrigationEvent, IrrigationTarget, SensorReading,
    TickCompleted, TickThroughput, ZoneSnapshot,
};
pub use world::{
    AIR_DENSITY_KG_PER_M3, AREA_QUANTUM_M2, Company, DeviceInstance, HarvestLot, LightSchedule,
    Plant, Room, Structure, World, Zone, ZoneEnvironment, ZonePath,
};
