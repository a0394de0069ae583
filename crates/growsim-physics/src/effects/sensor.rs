//! Sensor readings with condition-dependent noise.

use growsim_types::{SensorConfig, SensorMeasurement};

use crate::error::PhysicsError;
use crate::psychrometrics::clamp01;
use crate::rng::SimRng;

/// Inputs for [`measure`].
#[derive(Debug, Clone, Copy)]
pub struct SensorInputs<'a> {
    /// Sensor config.
    pub config: &'a SensorConfig,
    /// The value being measured.
    pub true_value: f64,
    /// Device condition; a pristine sensor reads exactly.
    pub condition01: f64,
}

/// Take a reading.
///
/// `measured = true + (2u − 1) × noise01 × (1 − condition01)` with `u`
/// drawn from the device's own stream. The noise is additive and in the
/// measured quantity's units. Humidity readings stay in [0, 1]; CO2 and
/// PPFD readings never go negative.
///
/// # Errors
///
/// [`PhysicsError::MissingRng`] when no stream is supplied, even if the
/// reading would be exact.
pub fn measure(inputs: &SensorInputs<'_>, rng: Option<&mut SimRng>) -> Result<f64, PhysicsError> {
    let rng = rng.ok_or(PhysicsError::MissingRng)?;

    let amplitude = clamp01(inputs.config.noise01) * (1.0 - clamp01(inputs.condition01));
    if amplitude <= 0.0 {
        return Ok(inputs.true_value);
    }

    let u = rng.next_f64();
    let measured = 2.0f64.mul_add(u, -1.0).mul_add(amplitude, inputs.true_value);
    Ok(match inputs.config.measurement {
        SensorMeasurement::Humidity => clamp01(measured),
        SensorMeasurement::Co2 | SensorMeasurement::Ppfd => measured.max(0.0),
        SensorMeasurement::Temperature => measured,
    })
}
