//! Tick pipeline and orchestration for the growsim simulation core.
//!
//! This crate owns the ten-step tick cycle that advances a world snapshot:
//! Initialization, device effects, sensors, environment, irrigation and
//! nutrients, workforce, physiology, harvest, economy, and commit.
//!
//! # Modules
//!
//! - [`clock`] -- Calendar mapping of simulated hours, hour of day, day
//!   boundaries.
//! - [`config`] -- Configuration loading from `growsim-config.yaml` into
//!   strongly-typed structs.
//! - [`context`] -- [`RunContext`]: tick inputs, sinks, and per-tick scratch
//!   state.
//! - [`sinks`] -- Telemetry, diagnostic, and stage-hook observer traits with
//!   no-op and recording implementations.
//! - [`workforce`] -- [`WorkforceSource`] trait and [`StubWorkforce`].
//! - [`validation`] -- Whole-tree structural validation.
//! - [`tick`] -- The tick cycle itself.
//! - [`hashing`] -- Canonical SHA-256 world hashes.
//! - [`fixture`] -- The seeded demo facility.
//! - [`replay`] -- Multi-day deterministic replay for golden masters.
//!
//! [`RunContext`]: context::RunContext
//! [`WorkforceSource`]: workforce::WorkforceSource
//! [`StubWorkforce`]: workforce::StubWorkforce

pub mod clock;
pub mod config;
pub mod context;
pub mod fixture;
pub mod hashing;
mod phases;
pub mod replay;
pub mod sinks;
pub mod tick;
pub mod validation;
pub mod workforce;

pub use context::{RunContext, Sinks, TickInputs};
pub use replay::{run_deterministic, run_deterministic_with, DeterministicReport, RunOptions};
pub use tick::{Simulation, TickError, TickOutcome, TickPhase};
pub use validation::{validate_world, ValidationIssue};
