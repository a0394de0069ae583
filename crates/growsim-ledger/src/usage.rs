//! The per-tick usage ledger.
//!
//! Energy is keyed by device and water by zone so a caller can attribute
//! cost. Maps are `BTreeMap`s to keep iteration (and therefore summation
//! order) deterministic.

use std::collections::BTreeMap;

use growsim_types::{DeviceId, ZoneId};

use crate::LedgerError;

/// Usage drained from a [`UsageLedger`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccruedUsage {
    /// Energy by device, kWh.
    pub energy_kwh: BTreeMap<DeviceId, f64>,
    /// Water by zone, m³.
    pub water_m3: BTreeMap<ZoneId, f64>,
}

impl AccruedUsage {
    /// Whether nothing was accrued.
    pub fn is_empty(&self) -> bool {
        self.energy_kwh.is_empty() && self.water_m3.is_empty()
    }

    /// Total energy, kWh.
    pub fn total_energy_kwh(&self) -> f64 {
        self.energy_kwh.values().sum()
    }

    /// Total water, m³.
    pub fn total_water_m3(&self) -> f64 {
        self.water_m3.values().sum()
    }
}

/// Accumulates consumption across the phases of one tick.
#[derive(Debug, Default)]
pub struct UsageLedger {
    pending: AccruedUsage,
}

fn check(what: &'static str, quantity: f64) -> Result<(), LedgerError> {
    if !quantity.is_finite() {
        return Err(LedgerError::NonFinite { what });
    }
    if quantity < 0.0 {
        return Err(LedgerError::NegativeQuantity { what, quantity });
    }
    Ok(())
}

impl UsageLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record energy used by a device. Zero is accepted and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] for negative or non-finite quantities.
    pub fn record_energy(&mut self, device_id: DeviceId, kwh: f64) -> Result<(), LedgerError> {
        check("energy", kwh)?;
        if kwh > 0.0 {
            *self.pending.energy_kwh.entry(device_id).or_insert(0.0) += kwh;
        }
        Ok(())
    }

    /// Record water delivered to a zone. Zero is accepted and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] for negative or non-finite quantities.
    pub fn record_water(&mut self, zone_id: ZoneId, m3: f64) -> Result<(), LedgerError> {
        check("water", m3)?;
        if m3 > 0.0 {
            *self.pending.water_m3.entry(zone_id).or_insert(0.0) += m3;
        }
        Ok(())
    }

    /// Whether anything is waiting to be consumed.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain everything accrued so far. A second call returns an empty
    /// [`AccruedUsage`] until new usage is recorded.
    pub fn consume(&mut self) -> AccruedUsage {
        let usage = std::mem::take(&mut self.pending);
        if !usage.is_empty() {
            tracing::trace!(
                devices = usage.energy_kwh.len(),
                zones = usage.water_m3.len(),
                "usage consumed"
            );
        }
        usage
    }
}
