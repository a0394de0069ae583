//! Stateless psychrometric and sensible-heat utilities.
//!
//! Saturation vapour pressure uses the Tetens correlation, which is accurate
//! to a few tenths of a percent over the 0-50 °C range a grow room lives in.
//! Exponentials go through `libm` so hashed world state is bit-identical
//! across hosts.

use crate::error::PhysicsError;

/// Specific heat of dry air at constant pressure, J/(kg·K).
pub const SPECIFIC_HEAT_AIR_J_PER_KG_K: f64 = 1005.0;

/// Standard atmospheric pressure, kPa.
pub const ATMOSPHERIC_PRESSURE_KPA: f64 = 101.325;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Clamp into [0, 1]; NaN maps to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Saturation vapour pressure over water at `temperature_c`, kPa.
pub fn saturation_vapor_pressure_kpa(temperature_c: f64) -> f64 {
    0.61078 * libm::exp((17.27 * temperature_c) / (temperature_c + 237.3))
}

/// Vapour-pressure deficit, kPa.
pub fn vapor_pressure_deficit_kpa(temperature_c: f64, relative_humidity01: f64) -> f64 {
    saturation_vapor_pressure_kpa(temperature_c) * (1.0 - clamp01(relative_humidity01))
}

/// Saturation humidity ratio, grams of water per kilogram of dry air.
pub fn saturation_humidity_ratio_g_per_kg(temperature_c: f64) -> f64 {
    let es = saturation_vapor_pressure_kpa(temperature_c);
    622.0 * es / (ATMOSPHERIC_PRESSURE_KPA - es)
}

/// Change in relative humidity caused by adding `water_g` (negative to
/// remove) to `air_mass_kg` of air at `temperature_c`.
pub fn water_to_rh_delta(water_g: f64, air_mass_kg: f64, temperature_c: f64) -> f64 {
    let capacity_g = air_mass_kg * saturation_humidity_ratio_g_per_kg(temperature_c);
    if capacity_g <= 0.0 || !capacity_g.is_finite() {
        return 0.0;
    }
    water_g / capacity_g
}

/// Temperature change from depositing `energy_j` into `air_mass_kg` of air.
pub fn energy_to_delta_c(energy_j: f64, air_mass_kg: f64) -> f64 {
    if air_mass_kg <= 0.0 {
        return 0.0;
    }
    energy_j / (air_mass_kg * SPECIFIC_HEAT_AIR_J_PER_KG_K)
}

/// Inputs for [`sensible_heat_delta_c`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensibleHeatInputs {
    /// Electrical draw, W.
    pub power_w: f64,
    /// Duty cycle, clamped into [0, 1].
    pub duty_cycle01: f64,
    /// Efficiency, must lie in [0, 1].
    pub efficiency01: f64,
    /// Tick duration, hours.
    pub tick_hours: f64,
    /// Zone air mass, kg.
    pub air_mass_kg: f64,
}

/// Temperature rise of zone air from a device's waste heat.
///
/// `ΔT = power × (1 − efficiency) × duty × tick_seconds / (air_mass × c_p)`.
///
/// # Errors
///
/// [`PhysicsError::EfficiencyOutOfRange`] if the efficiency is outside
/// [0, 1] (including NaN). Zero air mass, duty, power, or tick duration
/// yields `0.0` rather than an error.
pub fn sensible_heat_delta_c(inputs: &SensibleHeatInputs) -> Result<f64, PhysicsError> {
    if !(0.0..=1.0).contains(&inputs.efficiency01) {
        return Err(PhysicsError::EfficiencyOutOfRange {
            value: inputs.efficiency01,
        });
    }
    let duty = clamp01(inputs.duty_cycle01);
    if inputs.air_mass_kg <= 0.0 || duty <= 0.0 || inputs.power_w <= 0.0 || inputs.tick_hours <= 0.0 {
        return Ok(0.0);
    }
    let waste_w = inputs.power_w * (1.0 - inputs.efficiency01) * duty;
    let energy_j = waste_w * inputs.tick_hours * SECONDS_PER_HOUR;
    Ok(energy_to_delta_c(energy_j, inputs.air_mass_kg))
}
