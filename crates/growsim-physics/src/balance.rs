//! First-order zone air balance.
//!
//! Device deltas accumulated during the device-effects phase are applied to
//! the zone's air, followed by the crop's own load (CO2 drawdown and
//! transpiration while lit) and a relaxation toward ambient proportional to
//! the air exchanged with outside: `f = 1 − exp(−exchange_ach × tick_h)`.

use growsim_types::ZoneEnvironment;

use crate::effects::lighting::dli_increment_mol_m2;
use crate::psychrometrics::{clamp01, water_to_rh_delta};

/// Per-zone deltas accumulated over one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ZoneDeltas {
    /// Temperature change, °C.
    pub temperature_c: f64,
    /// Relative humidity change.
    pub humidity01: f64,
    /// CO2 change, ppm.
    pub co2_ppm: f64,
    /// PPFD delivered this tick, µmol/(m²·s).
    pub ppfd_umol_m2s: f64,
    /// Air changes per hour from all movers.
    pub ach: f64,
    /// Air changes per hour with ambient.
    pub exchange_ach: f64,
}

impl ZoneDeltas {
    /// Whether nothing was accumulated.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Outside air the zone exchanges with.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AmbientConditions {
    /// Temperature, °C.
    pub temperature_c: f64,
    /// Relative humidity.
    pub relative_humidity01: f64,
    /// CO2, ppm.
    pub co2_ppm: f64,
}

impl Default for AmbientConditions {
    fn default() -> Self {
        Self {
            temperature_c: 20.0,
            relative_humidity01: 0.5,
            co2_ppm: 420.0,
        }
    }
}

/// The crop's own effect on zone air.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CropLoad {
    /// Standing biomass, kg.
    pub biomass_kg: f64,
    /// Whether the canopy is lit (photosynthesis and transpiration run).
    pub lights_on: bool,
    /// CO2 drawdown per kg biomass per lit hour, ppm.
    pub co2_uptake_ppm_per_kg_h: f64,
    /// Water transpired per kg biomass per lit hour, g.
    pub transpiration_g_per_kg_h: f64,
}

/// Inputs for [`apply_zone_balance`].
#[derive(Debug, Clone, Copy)]
pub struct BalanceInputs<'a> {
    /// Air state at tick start.
    pub environment: &'a ZoneEnvironment,
    /// Accumulated device deltas.
    pub deltas: &'a ZoneDeltas,
    /// Outside air.
    pub ambient: &'a AmbientConditions,
    /// Crop load.
    pub crop: &'a CropLoad,
    /// Zone air mass, kg.
    pub air_mass_kg: f64,
    /// Tick duration, hours.
    pub tick_hours: f64,
    /// Start a new light integral (first tick of a sim day).
    pub reset_dli: bool,
}

/// Apply one tick of the zone balance and return the new air state.
pub fn apply_zone_balance(inputs: &BalanceInputs<'_>) -> ZoneEnvironment {
    let env = inputs.environment;
    let hours = inputs.tick_hours;
    if hours <= 0.0 {
        return env.clone();
    }
    let deltas = inputs.deltas;

    let mut temperature = env.air_temperature_c + deltas.temperature_c;
    let mut humidity = env.relative_humidity01 + deltas.humidity01;
    let mut co2 = env.co2_ppm + deltas.co2_ppm;

    let crop = inputs.crop;
    if crop.lights_on && crop.biomass_kg > 0.0 {
        co2 -= crop.biomass_kg * crop.co2_uptake_ppm_per_kg_h * hours;
        let transpired_g = crop.biomass_kg * crop.transpiration_g_per_kg_h * hours;
        humidity += water_to_rh_delta(transpired_g, inputs.air_mass_kg, temperature);
    }

    if deltas.exchange_ach > 0.0 {
        let f = 1.0 - libm::exp(-deltas.exchange_ach * hours);
        let ambient = inputs.ambient;
        temperature += (ambient.temperature_c - temperature) * f;
        humidity += (ambient.relative_humidity01 - humidity) * f;
        co2 += (ambient.co2_ppm - co2) * f;
    }

    let base_dli = if inputs.reset_dli { 0.0 } else { env.dli_mol_m2 };

    ZoneEnvironment {
        air_temperature_c: temperature,
        relative_humidity01: clamp01(humidity),
        co2_ppm: co2.max(0.0),
        ppfd_umol_m2s: deltas.ppfd_umol_m2s.max(0.0),
        dli_mol_m2: base_dli + dli_increment_mol_m2(deltas.ppfd_umol_m2s, hours),
    }
}
