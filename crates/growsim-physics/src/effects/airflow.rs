//! Airflow effect: air changes per hour delivered by an air mover.

use crate::psychrometrics::clamp01;

/// Inputs for [`airflow_effect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirflowInputs {
    /// Air moved at full duty, m³/h.
    pub airflow_m3_per_h: f64,
    /// Duty cycle; values above 1 clamp to 1.
    pub duty_cycle01: f64,
    /// Zone air volume, m³.
    pub zone_volume_m3: f64,
    /// Tick duration, hours.
    pub tick_hours: f64,
}

/// Airflow delivered by one device.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AirflowEffect {
    /// `airflow × clamp01(duty)`, m³/h.
    pub effective_airflow_m3_per_h: f64,
    /// Air changes per hour.
    pub ach: f64,
}

/// Compute effective airflow and ACH.
///
/// Non-positive airflow, zero duty, zero volume, or a zero tick all yield
/// the zero effect.
pub fn airflow_effect(inputs: &AirflowInputs) -> AirflowEffect {
    let duty = clamp01(inputs.duty_cycle01);
    if inputs.airflow_m3_per_h <= 0.0
        || duty <= 0.0
        || inputs.zone_volume_m3 <= 0.0
        || inputs.tick_hours <= 0.0
    {
        return AirflowEffect::default();
    }
    let effective = inputs.airflow_m3_per_h * duty;
    AirflowEffect {
        effective_airflow_m3_per_h: effective,
        ach: effective / inputs.zone_volume_m3,
    }
}
