//! Cost rollups.
//!
//! Physical quantities are tracked as `f64` by the physics layer; money is
//! `Decimal`. Conversion happens once, here, and amounts are rounded to
//! [`MONEY_DP`] places so rollups compare exactly across hosts.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use growsim_types::CostBreakdown;

use crate::tariff::Tariffs;
use crate::usage::AccruedUsage;
use crate::LedgerError;

/// Decimal places kept on monetary amounts.
pub const MONEY_DP: u32 = 4;

/// Convert a finite float to a `Decimal` rounded to [`MONEY_DP`] places.
///
/// # Errors
///
/// [`LedgerError::NonFinite`] for NaN, infinities, or values outside the
/// `Decimal` range.
pub fn decimal_from_f64(value: f64, what: &'static str) -> Result<Decimal, LedgerError> {
    if !value.is_finite() {
        return Err(LedgerError::NonFinite { what });
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp(MONEY_DP))
        .ok_or(LedgerError::NonFinite { what })
}

fn price(quantity: f64, rate: Decimal, what: &'static str) -> Result<Decimal, LedgerError> {
    decimal_from_f64(quantity, what)?
        .checked_mul(rate)
        .map(|d| d.round_dp(MONEY_DP))
        .ok_or(LedgerError::Overflow { what })
}

fn sum(parts: &[Decimal]) -> Result<Decimal, LedgerError> {
    parts.iter().try_fold(Decimal::ZERO, |acc, part| {
        acc.checked_add(*part).ok_or(LedgerError::Overflow { what: "total" })
    })
}

/// Builder combining priced usage, payroll, and maintenance for one tick.
#[derive(Debug, Clone)]
pub struct CostRollup {
    tariffs: Tariffs,
    tick_hours: f64,
    energy_kwh: f64,
    water_m3: f64,
    payroll: Decimal,
    maintenance: Decimal,
}

impl CostRollup {
    /// Start a rollup for a tick of `tick_hours` priced at `tariffs`.
    pub const fn new(tariffs: Tariffs, tick_hours: f64) -> Self {
        Self {
            tariffs,
            tick_hours,
            energy_kwh: 0.0,
            water_m3: 0.0,
            payroll: Decimal::ZERO,
            maintenance: Decimal::ZERO,
        }
    }

    /// Add consumed usage.
    #[must_use]
    pub fn usage(mut self, usage: &AccruedUsage) -> Self {
        self.energy_kwh += usage.total_energy_kwh();
        self.water_m3 += usage.total_water_m3();
        self
    }

    /// Add workforce payroll.
    #[must_use]
    pub fn payroll(mut self, amount: Decimal) -> Self {
        self.payroll = self.payroll.saturating_add(amount);
        self
    }

    /// Add device maintenance.
    #[must_use]
    pub fn maintenance(mut self, amount: Decimal) -> Self {
        self.maintenance = self.maintenance.saturating_add(amount);
        self
    }

    /// Price everything into a [`CostBreakdown`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if a quantity is non-finite or an amount
    /// overflows.
    pub fn build(&self) -> Result<CostBreakdown, LedgerError> {
        let energy_cost = price(self.energy_kwh, self.tariffs.energy_per_kwh, "energy cost")?;
        let water_cost = price(self.water_m3, self.tariffs.water_per_m3, "water cost")?;
        let payroll_cost = self.payroll.round_dp(MONEY_DP);
        let maintenance_cost = self.maintenance.round_dp(MONEY_DP);
        let total = sum(&[energy_cost, water_cost, payroll_cost, maintenance_cost])?;

        Ok(CostBreakdown {
            energy_kwh: self.energy_kwh,
            water_m3: self.water_m3,
            energy_cost,
            water_cost,
            payroll_cost,
            maintenance_cost,
            total,
            total_per_hour: per_hour(total, self.tick_hours)?,
        })
    }
}

fn per_hour(total: Decimal, hours: f64) -> Result<Decimal, LedgerError> {
    if hours <= 0.0 {
        return Ok(Decimal::ZERO);
    }
    let hours = decimal_from_f64(hours, "tick hours")?;
    if hours.is_zero() {
        return Ok(Decimal::ZERO);
    }
    total
        .checked_div(hours)
        .map(|d| d.round_dp(MONEY_DP))
        .ok_or(LedgerError::Overflow { what: "cost per hour" })
}

/// Running sum of [`CostBreakdown`]s, e.g. over a sim day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostTotals {
    breakdown: CostBreakdown,
    hours: f64,
    ticks: u64,
}

impl CostTotals {
    /// Start from zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one tick's breakdown covering `tick_hours`.
    pub fn add(&mut self, costs: &CostBreakdown, tick_hours: f64) {
        let b = &mut self.breakdown;
        b.energy_kwh += costs.energy_kwh;
        b.water_m3 += costs.water_m3;
        b.energy_cost = b.energy_cost.saturating_add(costs.energy_cost);
        b.water_cost = b.water_cost.saturating_add(costs.water_cost);
        b.payroll_cost = b.payroll_cost.saturating_add(costs.payroll_cost);
        b.maintenance_cost = b.maintenance_cost.saturating_add(costs.maintenance_cost);
        b.total = b.total.saturating_add(costs.total);
        self.hours += tick_hours.max(0.0);
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Number of ticks added.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The summed breakdown, with `total_per_hour` averaged over the
    /// hours covered.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the hour count cannot be represented.
    pub fn breakdown(&self) -> Result<CostBreakdown, LedgerError> {
        Ok(CostBreakdown {
            total_per_hour: per_hour(self.breakdown.total, self.hours)?,
            ..self.breakdown.clone()
        })
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use growsim_types::{DeviceId, ZoneId};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::usage::UsageLedger;

    fn usage(kwh: f64, m3: f64) -> AccruedUsage {
        let mut ledger = UsageLedger::new();
        ledger.record_energy(DeviceId::new(), kwh).ok();
        ledger.record_water(ZoneId::new(), m3).ok();
        ledger.consume()
    }

    #[test]
    fn rollup_prices_all_components() {
        let costs = CostRollup::new(Tariffs::default(), 1.0)
            .usage(&usage(10.0, 0.2))
            .payroll(dec!(25))
            .maintenance(dec!(0.5))
            .build();
        let costs = costs.unwrap_or_default();

        assert_eq!(costs.energy_cost, dec!(1.50));
        assert_eq!(costs.water_cost, dec!(0.50));
        assert_eq!(costs.payroll_cost, dec!(25));
        assert_eq!(costs.maintenance_cost, dec!(0.5));
        assert_eq!(costs.total, dec!(27.5));
        assert_eq!(costs.total_per_hour, dec!(27.5));
    }

    #[test]
    fn per_hour_rate_scales_with_tick_length() {
        let costs = CostRollup::new(Tariffs::default(), 0.5)
            .payroll(dec!(10))
            .build()
            .unwrap_or_default();
        assert_eq!(costs.total, dec!(10));
        assert_eq!(costs.total_per_hour, dec!(20));
    }

    #[test]
    fn empty_rollup_is_zero() {
        let costs = CostRollup::new(Tariffs::default(), 1.0).build().unwrap_or_default();
        assert!(costs.total.is_zero());
        assert_eq!(costs.energy_kwh, 0.0);
    }

    #[test]
    fn non_finite_usage_is_rejected() {
        assert_eq!(
            decimal_from_f64(f64::INFINITY, "energy"),
            Err(LedgerError::NonFinite { what: "energy" })
        );
    }

    #[test]
    fn totals_sum_ticks() {
        let tick = CostRollup::new(Tariffs::default(), 1.0)
            .payroll(dec!(2))
            .build()
            .unwrap_or_default();
        let mut totals = CostTotals::new();
        for _ in 0..24 {
            totals.add(&tick, 1.0);
        }
        let day = totals.breakdown().unwrap_or_default();
        assert_eq!(totals.ticks(), 24);
        assert_eq!(day.total, dec!(48));
        assert_eq!(day.total_per_hour, dec!(2));
    }
}
