//! Grow lights: PPFD contribution and daily light integral.

use crate::psychrometrics::{clamp01, SECONDS_PER_HOUR};

/// Inputs for [`lighting_ppfd`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingInputs {
    /// Rated PPFD over the fixture footprint, µmol/(m²·s).
    pub ppfd_umol_m2s: f64,
    /// Device duty cycle.
    pub duty_cycle01: f64,
    /// Fixture footprint, m².
    pub coverage_m2: f64,
    /// Zone floor area, m².
    pub zone_area_m2: f64,
    /// Whether the zone photoperiod has lights on this tick.
    pub lights_on: bool,
}

/// Zone-average PPFD delivered by one fixture.
///
/// The fixture's footprint is spread over the whole zone, so a fixture
/// covering half the floor contributes half its rated PPFD.
pub fn lighting_ppfd(inputs: &LightingInputs) -> f64 {
    if !inputs.lights_on || inputs.ppfd_umol_m2s <= 0.0 || inputs.zone_area_m2 <= 0.0 {
        return 0.0;
    }
    let share = (inputs.coverage_m2.max(0.0) / inputs.zone_area_m2).min(1.0);
    inputs.ppfd_umol_m2s * clamp01(inputs.duty_cycle01) * share
}

/// DLI accumulated over a tick at constant PPFD, mol/m².
pub fn dli_increment_mol_m2(ppfd_umol_m2s: f64, tick_hours: f64) -> f64 {
    if ppfd_umol_m2s <= 0.0 || tick_hours <= 0.0 {
        return 0.0;
    }
    ppfd_umol_m2s * SECONDS_PER_HOUR * tick_hours / 1_000_000.0
}
