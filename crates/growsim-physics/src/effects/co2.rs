//! CO2 enrichment.
//!
//! An injector delivers at most `pulse_ppm_per_tick` per nominal one-hour
//! tick. It runs just long enough to close the gap to its target, never
//! longer than the device duty allows, and never pushes the zone above the
//! safety ceiling. Inside the hysteresis band it stays idle.

use growsim_types::Co2Config;

use crate::psychrometrics::clamp01;

/// Tick length the pulse rating refers to, hours.
pub const NOMINAL_TICK_HOURS: f64 = 1.0;

/// Which limit shaped the injected amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Co2Clamp {
    /// Idle, or limited only by capacity / device duty.
    #[default]
    None,
    /// The injector stopped on reaching the target.
    Target,
    /// The safety ceiling trimmed the injection.
    Safety,
}

/// Inputs for [`co2_injection`].
#[derive(Debug, Clone, Copy)]
pub struct Co2Inputs<'a> {
    /// Injector config.
    pub config: &'a Co2Config,
    /// Zone concentration before actuation, ppm.
    pub current_ppm: f64,
    /// Device duty cycle; caps the effective duty.
    pub max_duty01: f64,
    /// Electrical draw, W.
    pub power_draw_w: f64,
    /// Tick duration, hours.
    pub tick_hours: f64,
}

/// Result of one injector evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Co2Effect {
    /// Concentration added, ppm.
    pub delta_ppm: f64,
    /// Fraction of the tick the injector ran.
    pub effective_duty01: f64,
    /// Electrical energy used, kWh.
    pub energy_kwh: f64,
    /// Which limit fired.
    pub clamp: Co2Clamp,
}

/// Evaluate an injector for one tick.
pub fn co2_injection(inputs: &Co2Inputs<'_>) -> Co2Effect {
    let config = inputs.config;
    if inputs.tick_hours <= 0.0 || config.pulse_ppm_per_tick <= 0.0 {
        return Co2Effect::default();
    }

    let gap = config.target_ppm - inputs.current_ppm;
    if gap <= 0.0 || gap <= config.hysteresis_ppm {
        return Co2Effect::default();
    }

    let capacity = config.pulse_ppm_per_tick * (inputs.tick_hours / NOMINAL_TICK_HOURS);
    // Unclamped, so a gap beyond capacity never reads as reaching the target.
    let required = gap / capacity;
    let max_duty = clamp01(inputs.max_duty01);

    let (mut duty, mut clamp) = if required <= max_duty {
        (required, Co2Clamp::Target)
    } else {
        (max_duty, Co2Clamp::None)
    };

    let mut delta = capacity * duty;
    let headroom = (config.safety_max_ppm - inputs.current_ppm).max(0.0);
    if delta > headroom {
        delta = headroom;
        duty = delta / capacity;
        clamp = Co2Clamp::Safety;
    }

    Co2Effect {
        delta_ppm: delta,
        effective_duty01: duty,
        energy_kwh: inputs.power_draw_w.max(0.0) * duty * inputs.tick_hours / 1000.0,
        clamp,
    }
}
