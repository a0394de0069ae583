//! Thermal effect: waste heat plus optional active conditioning.

use growsim_types::ThermalConfig;

use crate::error::PhysicsError;
use crate::psychrometrics::{
    clamp01, energy_to_delta_c, sensible_heat_delta_c, SensibleHeatInputs, SECONDS_PER_HOUR,
};

/// Device and zone state needed to evaluate a thermal effect.
#[derive(Debug, Clone, Copy)]
pub struct ThermalInputs<'a> {
    /// Thermal config of the device.
    pub config: &'a ThermalConfig,
    /// Electrical draw, W.
    pub power_draw_w: f64,
    /// Efficiency, [0, 1].
    pub efficiency01: f64,
    /// Duty cycle.
    pub duty_cycle01: f64,
    /// Zone air mass, kg.
    pub air_mass_kg: f64,
    /// Zone temperature before this tick's actuation, °C.
    pub current_temperature_c: f64,
    /// Tick duration, hours.
    pub tick_hours: f64,
}

/// Temperature change contributed by one device.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThermalEffect {
    /// From waste heat.
    pub waste_delta_c: f64,
    /// From active heating (positive) or cooling (negative).
    pub active_delta_c: f64,
}

impl ThermalEffect {
    /// Combined temperature change.
    pub fn total_delta_c(&self) -> f64 {
        self.waste_delta_c + self.active_delta_c
    }
}

/// Waste-heat temperature rise of a device.
///
/// Returns exactly `0.0` for zero duty or unit efficiency.
///
/// # Errors
///
/// [`PhysicsError::EfficiencyOutOfRange`] for an efficiency outside [0, 1].
pub fn apply_device_heat(inputs: &ThermalInputs<'_>) -> Result<f64, PhysicsError> {
    sensible_heat_delta_c(&SensibleHeatInputs {
        power_w: inputs.power_draw_w,
        duty_cycle01: inputs.duty_cycle01,
        efficiency01: inputs.efficiency01,
        tick_hours: inputs.tick_hours,
        air_mass_kg: inputs.air_mass_kg,
    })
}

/// Full thermal effect of a device: waste heat plus conditioning toward the
/// setpoint. Active conditioning never pushes the zone past the setpoint.
///
/// # Errors
///
/// [`PhysicsError::EfficiencyOutOfRange`] for an efficiency outside [0, 1].
pub fn thermal_effect(inputs: &ThermalInputs<'_>) -> Result<ThermalEffect, PhysicsError> {
    let waste_delta_c = apply_device_heat(inputs)?;

    let Some(setpoint) = inputs.config.setpoint_c else {
        return Ok(ThermalEffect {
            waste_delta_c,
            active_delta_c: 0.0,
        });
    };

    let duty = clamp01(inputs.duty_cycle01);
    let seconds = inputs.tick_hours.max(0.0) * SECONDS_PER_HOUR;
    // Conditioning acts on the air after waste heat has been deposited.
    let gap = setpoint - (inputs.current_temperature_c + waste_delta_c);

    let active_delta_c = if gap > 0.0 && inputs.config.heating_capacity_w > 0.0 {
        let max = energy_to_delta_c(inputs.config.heating_capacity_w * duty * seconds, inputs.air_mass_kg);
        max.min(gap)
    } else if gap < 0.0 && inputs.config.cooling_capacity_w > 0.0 {
        let max = energy_to_delta_c(inputs.config.cooling_capacity_w * duty * seconds, inputs.air_mass_kg);
        -max.min(-gap)
    } else {
        0.0
    };

    Ok(ThermalEffect {
        waste_delta_c,
        active_delta_c,
    })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn inputs(config: &ThermalConfig) -> ThermalInputs<'_> {
        ThermalInputs {
            config,
            power_draw_w: 500.0,
            efficiency01: 0.5,
            duty_cycle01: 1.0,
            air_mass_kg: 72.0,
            current_temperature_c: 24.0,
            tick_hours: 1.0,
        }
    }

    #[test]
    fn zero_duty_or_full_efficiency_is_exactly_zero() {
        let config = ThermalConfig::default();
        let idle = ThermalInputs { duty_cycle01: 0.0, ..inputs(&config) };
        let perfect = ThermalInputs { efficiency01: 1.0, ..inputs(&config) };
        assert_eq!(apply_device_heat(&idle), Ok(0.0));
        assert_eq!(apply_device_heat(&perfect), Ok(0.0));
    }

    #[test]
    fn bad_efficiency_is_rejected() {
        let config = ThermalConfig::default();
        let bad = ThermalInputs { efficiency01: 1.2, ..inputs(&config) };
        assert!(matches!(
            apply_device_heat(&bad),
            Err(PhysicsError::EfficiencyOutOfRange { .. })
        ));
        assert!(thermal_effect(&bad).is_err());
    }

    #[test]
    fn waste_heat_only_without_setpoint() {
        let config = ThermalConfig::default();
        let effect = thermal_effect(&inputs(&config)).unwrap_or_default();
        assert!(effect.waste_delta_c > 0.0);
        assert_eq!(effect.active_delta_c, 0.0);
    }

    #[test]
    fn cooling_stops_at_setpoint() {
        let config = ThermalConfig {
            setpoint_c: Some(24.0),
            heating_capacity_w: 0.0,
            cooling_capacity_w: 50_000.0,
        };
        let effect = thermal_effect(&inputs(&config)).unwrap_or_default();
        // Large cooler removes exactly the waste heat and stops at the setpoint.
        assert!((effect.total_delta_c()).abs() < 1e-9);
    }

    #[test]
    fn small_heater_is_capacity_limited() {
        let config = ThermalConfig {
            setpoint_c: Some(40.0),
            heating_capacity_w: 100.0,
            cooling_capacity_w: 0.0,
        };
        let case = ThermalInputs { power_draw_w: 0.0, ..inputs(&config) };
        let effect = thermal_effect(&case).unwrap_or_default();
        let expected = 100.0 * 3600.0 / (72.0 * 1005.0);
        assert!((effect.active_delta_c - expected).abs() < 1e-9);
    }
}
