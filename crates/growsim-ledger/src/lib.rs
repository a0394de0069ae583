//! Resource usage and cost accounting for the growsim simulation core.
//!
//! Phases of a tick record energy and water use as they happen. At commit
//! time the usage is consumed exactly once and priced into a single
//! [`CostBreakdown`] that travels in the `tick.completed` event.
//!
//! # Architecture
//!
//! - [`usage`] -- The [`UsageLedger`]: per-device kWh and per-zone m³,
//!   drained by a one-shot [`UsageLedger::consume`].
//! - [`tariff`] -- [`Tariffs`] and per-tick [`TariffOverrides`].
//! - [`costs`] -- [`CostRollup`] combines priced usage, payroll and
//!   maintenance; [`CostTotals`] sums breakdowns over a day or a run.
//!
//! # Double billing
//!
//! Consuming the ledger twice in one tick yields the totals once and an
//! empty [`AccruedUsage`] the second time:
//!
//! ```
//! use growsim_ledger::UsageLedger;
//! use growsim_types::DeviceId;
//!
//! let mut ledger = UsageLedger::new();
//! ledger.record_energy(DeviceId::new(), 1.5).ok();
//!
//! let first = ledger.consume();
//! assert!((first.total_energy_kwh() - 1.5).abs() < 1e-12);
//! assert!(ledger.consume().is_empty());
//! ```
//!
//! [`CostBreakdown`]: growsim_types::CostBreakdown

pub mod costs;
pub mod tariff;
pub mod usage;

// Re-export primary types at crate root.
pub use costs::{decimal_from_f64, CostRollup, CostTotals};
pub use tariff::{TariffOverrides, Tariffs};
pub use usage::{AccruedUsage, UsageLedger};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording usage or pricing it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// Usage quantities must not be negative.
    #[error("{what} must not be negative, got {quantity}")]
    NegativeQuantity {
        /// What was being recorded.
        what: &'static str,
        /// The invalid quantity.
        quantity: f64,
    },

    /// A quantity was NaN or infinite.
    #[error("{what} must be finite")]
    NonFinite {
        /// What was being recorded.
        what: &'static str,
    },

    /// Decimal arithmetic overflowed while pricing.
    #[error("overflow while computing {what}")]
    Overflow {
        /// The amount being computed.
        what: &'static str,
    },
}
