//! Error types for the `growsim-physics` crate.
//!
//! Every variant here means corrupt static data or a wiring mistake, never a
//! runtime-recoverable condition. Capacity shortfalls are not errors; they
//! are reported as diagnostics by the [`capacity`](crate::capacity) module.

/// Errors raised by effect and physics computations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    /// A device efficiency lies outside [0, 1].
    #[error("efficiency {value} is outside [0, 1]")]
    EfficiencyOutOfRange {
        /// The offending value.
        value: f64,
    },

    /// A nutrient leaching fraction lies outside [0, 1].
    #[error("leaching fraction {value} is outside [0, 1]")]
    LeachingFractionOutOfRange {
        /// The offending value.
        value: f64,
    },

    /// A sensor was evaluated without its RNG stream.
    #[error("sensor invoked without an RNG stream")]
    MissingRng,

    /// An input that must be finite was NaN or infinite.
    #[error("non-finite input for {field}")]
    NonFinite {
        /// Name of the offending input.
        field: &'static str,
    },
}
