//! Deterministic randomness and environmental physics for the growsim core.
//!
//! Everything here is a pure function of its inputs. The tick pipeline in
//! `growsim-core` decides what to call and in which order; this crate only
//! knows how a single device, buffer, or zone responds over one tick.
//!
//! # Modules
//!
//! - [`rng`] -- Named, seed-derived random streams (SHA-256 → xoshiro128**).
//! - [`psychrometrics`] -- Vapour pressure, VPD, and sensible-heat deltas.
//! - [`effects`] -- One stub per device effect kind, plus the nutrient
//!   buffer and irrigation service.
//! - [`capacity`] -- Shared coverage/airflow aggregation and derating.
//! - [`balance`] -- Applies accumulated deltas, crop load, and ambient
//!   exchange to a zone's air.
//! - [`error`] -- Invalid-configuration and missing-dependency errors.

pub mod balance;
pub mod capacity;
pub mod effects;
pub mod error;
pub mod psychrometrics;
pub mod rng;

// Re-export primary types at crate root.
pub use balance::{apply_zone_balance, AmbientConditions, BalanceInputs, CropLoad, ZoneDeltas};
pub use capacity::{aggregate_zone, CapacityPolicy, ZoneCapacity};
pub use error::PhysicsError;
pub use psychrometrics::{
    clamp01, saturation_vapor_pressure_kpa, sensible_heat_delta_c, vapor_pressure_deficit_kpa,
    SensibleHeatInputs,
};
pub use rng::{create_rng, SimRng};
