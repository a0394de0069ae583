//! Device effect stubs, one module per effect kind.
//!
//! Each stub is a pure function of its inputs and the tick duration. The
//! tick pipeline sums the per-device results per zone.

pub mod airflow;
pub mod co2;
pub mod humidity;
pub mod irrigation;
pub mod lighting;
pub mod nutrient;
pub mod sensor;
pub mod thermal;

pub use airflow::{airflow_effect, AirflowEffect, AirflowInputs};
pub use co2::{co2_injection, Co2Clamp, Co2Effect, Co2Inputs};
pub use humidity::{humidity_effect, HumidityEffect, HumidityInputs};
pub use irrigation::{resolve_zone_irrigation, IrrigationInputs, IrrigationOutcome};
pub use lighting::{dli_increment_mol_m2, lighting_ppfd, LightingInputs};
pub use nutrient::{dosing_inflow, update_buffer, BufferInputs, BufferUpdate, NutrientMap};
pub use sensor::{measure, SensorInputs};
pub use thermal::{apply_device_heat, thermal_effect, ThermalEffect, ThermalInputs};
