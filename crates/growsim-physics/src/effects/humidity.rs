//! Humidifiers and dehumidifiers.

use growsim_types::{HumidityConfig, HumidityMode};

use crate::psychrometrics::{clamp01, water_to_rh_delta};

/// Inputs for [`humidity_effect`].
#[derive(Debug, Clone, Copy)]
pub struct HumidityInputs<'a> {
    /// Device config.
    pub config: &'a HumidityConfig,
    /// Device duty cycle.
    pub duty_cycle01: f64,
    /// Zone air mass, kg.
    pub air_mass_kg: f64,
    /// Zone air temperature, °C.
    pub temperature_c: f64,
    /// Zone relative humidity before actuation.
    pub current_rh01: f64,
    /// Tick duration, hours.
    pub tick_hours: f64,
}

/// Water moved by a device in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HumidityEffect {
    /// Relative humidity change (negative when drying).
    pub delta_rh01: f64,
    /// Water added (positive) or removed (negative), grams.
    pub water_g: f64,
}

/// Move water toward the device target, never past it.
pub fn humidity_effect(inputs: &HumidityInputs<'_>) -> HumidityEffect {
    let config = inputs.config;
    let duty = clamp01(inputs.duty_cycle01);
    if duty <= 0.0 || inputs.tick_hours <= 0.0 || config.capacity_g_per_h <= 0.0 {
        return HumidityEffect::default();
    }

    let target = clamp01(config.target_rh01);
    let current = clamp01(inputs.current_rh01);
    let gap = match config.mode {
        HumidityMode::Humidify => target - current,
        HumidityMode::Dehumidify => current - target,
    };
    if gap <= 0.0 {
        return HumidityEffect::default();
    }

    let max_water_g = config.capacity_g_per_h * duty * inputs.tick_hours;
    let max_delta = water_to_rh_delta(max_water_g, inputs.air_mass_kg, inputs.temperature_c);
    if max_delta <= 0.0 {
        return HumidityEffect::default();
    }
    let delta = max_delta.min(gap);
    let water_g = max_water_g * (delta / max_delta);

    match config.mode {
        HumidityMode::Humidify => HumidityEffect {
            delta_rh01: delta,
            water_g,
        },
        HumidityMode::Dehumidify => HumidityEffect {
            delta_rh01: -delta,
            water_g: -water_g,
        },
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn config(mode: HumidityMode, target: f64) -> HumidityConfig {
        HumidityConfig {
            mode,
            capacity_g_per_h: 500.0,
            target_rh01: target,
        }
    }

    fn run(config: &HumidityConfig, current: f64) -> HumidityEffect {
        humidity_effect(&HumidityInputs {
            config,
            duty_cycle01: 1.0,
            air_mass_kg: 72.0,
            temperature_c: 24.0,
            current_rh01: current,
            tick_hours: 1.0,
        })
    }

    #[test]
    fn dehumidifier_stops_at_target() {
        let cfg = config(HumidityMode::Dehumidify, 0.55);
        let effect = run(&cfg, 0.60);
        assert!((effect.delta_rh01 + 0.05).abs() < 1e-12);
        assert!(effect.water_g < 0.0);
    }

    #[test]
    fn humidifier_is_capacity_limited() {
        let cfg = HumidityConfig {
            capacity_g_per_h: 10.0,
            ..config(HumidityMode::Humidify, 0.9)
        };
        let effect = run(&cfg, 0.3);
        assert!(effect.delta_rh01 > 0.0);
        assert!(effect.delta_rh01 < 0.6);
        assert!((effect.water_g - 10.0).abs() < 1e-9);
    }

    #[test]
    fn wrong_side_of_target_is_idle() {
        let dry = config(HumidityMode::Dehumidify, 0.6);
        assert_eq!(run(&dry, 0.5), HumidityEffect::default());
        let wet = config(HumidityMode::Humidify, 0.4);
        assert_eq!(run(&wet, 0.5), HumidityEffect::default());
    }
}
