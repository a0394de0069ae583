//! `ApplyEconomyAccrual`: price the tick.
//!
//! The usage ledger is consumed exactly once here. Maintenance is charged per
//! operating hour and grows as devices wear: a device at condition `c` costs
//! `base × (2 − c)` per hour.

use rust_decimal::Decimal;

use growsim_ledger::{decimal_from_f64, CostRollup, LedgerError};
use growsim_physics::clamp01;
use growsim_types::{CostBreakdown, World};

use crate::context::RunContext;
use crate::phases::{all_devices, TickScope};
use crate::tick::TickError;

fn maintenance(world: &World, ctx: &RunContext<'_>) -> Result<Decimal, LedgerError> {
    let mut total = Decimal::ZERO;
    for device in all_devices(world) {
        let Some(hours) = ctx.runtime.operating_hours.get(&device.id).copied() else {
            continue;
        };
        let weighted = decimal_from_f64((2.0 - clamp01(device.condition01)) * hours, "maintenance hours")?;
        let cost = device
            .maintenance_cost_per_hour
            .checked_mul(weighted)
            .ok_or(LedgerError::Overflow { what: "maintenance" })?;
        total = total.saturating_add(cost);
    }
    Ok(total)
}

pub(crate) fn run(scope: &TickScope<'_>, world: &World, ctx: &mut RunContext<'_>) -> Result<CostBreakdown, TickError> {
    let maintenance = maintenance(world, ctx)?;
    let usage = ctx.runtime.ledger.consume();
    let tariffs = scope.config.tariffs.with_overrides(&ctx.inputs().tariff_overrides);

    let costs = CostRollup::new(tariffs, scope.hours)
        .usage(&usage)
        .payroll(ctx.runtime.payroll)
        .maintenance(maintenance)
        .build()?;

    tracing::debug!(
        tick = scope.tick,
        energy_kwh = costs.energy_kwh,
        water_m3 = costs.water_m3,
        total = %costs.total,
        "Costs accrued"
    );
    Ok(costs)
}
