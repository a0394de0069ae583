//! Workforce source trait and stub implementation.
//!
//! During the `ApplyWorkforce` phase the pipeline asks a [`WorkforceSource`]
//! what the staff cost this tick. Scheduling, hiring and task assignment
//! live behind this seam; the core only books the payroll.
//!
//! [`StubWorkforce`] charges a flat hourly payroll, which is enough to
//! exercise the economy end to end.

use rust_decimal::Decimal;

use growsim_ledger::{decimal_from_f64, LedgerError};
use growsim_types::World;

/// Errors that can occur during the workforce phase.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkforceError {
    /// Payroll could not be priced.
    #[error("payroll error: {source}")]
    Payroll {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// An internal error in the workforce source.
    #[error("workforce source error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// What the workforce cost during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkforceOutcome {
    /// Payroll booked for the tick.
    pub payroll: Decimal,
}

/// A source of workforce activity.
pub trait WorkforceSource {
    /// Report the workforce outcome of `tick`, which spans `tick_hours`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkforceError`] if the outcome cannot be produced; the
    /// tick is then aborted.
    fn payroll(
        &mut self,
        tick: u64,
        world: &World,
        tick_hours: f64,
    ) -> Result<WorkforceOutcome, WorkforceError>;
}

/// Charges a flat payroll per simulated hour.
#[derive(Debug, Clone, Default)]
pub struct StubWorkforce {
    payroll_per_hour: Decimal,
}

impl StubWorkforce {
    /// Create a stub charging `payroll_per_hour`.
    pub const fn new(payroll_per_hour: Decimal) -> Self {
        Self { payroll_per_hour }
    }
}

impl WorkforceSource for StubWorkforce {
    fn payroll(
        &mut self,
        tick: u64,
        _world: &World,
        tick_hours: f64,
    ) -> Result<WorkforceOutcome, WorkforceError> {
        if tick_hours <= 0.0 || self.payroll_per_hour.is_zero() {
            return Ok(WorkforceOutcome::default());
        }
        let hours = decimal_from_f64(tick_hours, "workforce hours")?;
        let payroll = hours
            .checked_mul(self.payroll_per_hour)
            .ok_or(LedgerError::Overflow { what: "payroll" })?;
        tracing::trace!(tick, %payroll, "payroll booked");
        Ok(WorkforceOutcome { payroll })
    }
}
