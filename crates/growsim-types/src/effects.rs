//! Per-device effect configuration.
//!
//! A device carries an explicit effect-kind → config map. The set of kinds
//! is closed ([`EffectKind`]), so the map is a struct with one optional slot
//! per kind; it serializes as a JSON object keyed by kind name. A single
//! device may carry several effects at once (an LED fixture is both a
//! `lighting` and a `thermal` device).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{EffectKind, HumidityMode, SensorMeasurement};

/// Sensible-heat behaviour of a device.
///
/// Every powered device with a thermal entry dumps its waste heat
/// (`power × (1 − efficiency) × duty`) into the zone. When `setpoint_c` is
/// set, the device additionally heats or cools toward it, limited by the
/// configured capacities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalConfig {
    /// Target air temperature for active conditioning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint_c: Option<f64>,
    /// Maximum active heating power in watts.
    #[serde(default)]
    pub heating_capacity_w: f64,
    /// Maximum active cooling power in watts.
    #[serde(default)]
    pub cooling_capacity_w: f64,
}

/// Humidifier / dehumidifier behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumidityConfig {
    /// Whether the device adds or removes water vapour.
    pub mode: HumidityMode,
    /// Water moved at full duty, grams per hour.
    pub capacity_g_per_h: f64,
    /// Relative humidity the device steers toward.
    pub target_rh01: f64,
}

/// CO2 injector behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Co2Config {
    /// Concentration the injector steers toward.
    pub target_ppm: f64,
    /// Concentration added in one nominal (one-hour) tick at full duty.
    pub pulse_ppm_per_tick: f64,
    /// Hard ceiling the injector may never push the zone above.
    pub safety_max_ppm: f64,
    /// Band below the target inside which the injector stays idle.
    #[serde(default)]
    pub hysteresis_ppm: f64,
}

/// Sensor behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// The quantity being measured.
    pub measurement: SensorMeasurement,
    /// Noise amplitude at zero condition, in the measured quantity's units.
    pub noise01: f64,
}

/// Air mover behaviour. Volume comes from the device's `airflow_m3_per_h`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirflowConfig {
    /// Whether the moved air is exchanged with ambient (ventilation) rather
    /// than recirculated inside the zone.
    #[serde(default)]
    pub exchanges_with_ambient: bool,
}

/// Grow light behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingConfig {
    /// PPFD delivered over the fixture's coverage area at full duty.
    pub ppfd_umol_m2s: f64,
}

/// Nutrient dosing pump behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientConfig {
    /// Mass added to the zone buffer per hour at full duty, by nutrient key.
    #[serde(default)]
    pub dosing_mg_per_h: BTreeMap<String, f64>,
}

/// The effect-kind → config map of one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectConfigs {
    /// Thermal entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalConfig>,
    /// Humidity entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<HumidityConfig>,
    /// CO2 entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2: Option<Co2Config>,
    /// Sensor entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor: Option<SensorConfig>,
    /// Airflow entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow: Option<AirflowConfig>,
    /// Lighting entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting: Option<LightingConfig>,
    /// Nutrient entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrient: Option<NutrientConfig>,
}

impl EffectConfigs {
    /// The effect kinds present on this device, in [`EffectKind`] order.
    pub fn kinds(&self) -> Vec<EffectKind> {
        let slots = [
            (EffectKind::Thermal, self.thermal.is_some()),
            (EffectKind::Humidity, self.humidity.is_some()),
            (EffectKind::Co2, self.co2.is_some()),
            (EffectKind::Sensor, self.sensor.is_some()),
            (EffectKind::Airflow, self.airflow.is_some()),
            (EffectKind::Lighting, self.lighting.is_some()),
            (EffectKind::Nutrient, self.nutrient.is_some()),
        ];
        slots
            .into_iter()
            .filter_map(|(kind, present)| present.then_some(kind))
            .collect()
    }

    /// Whether the device carries the given kind.
    pub fn has(&self, kind: EffectKind) -> bool {
        self.kinds().contains(&kind)
    }

    /// Whether any effect depends on the device's coverage footprint.
    pub const fn is_coverage_dependent(&self) -> bool {
        self.thermal.is_some() || self.humidity.is_some() || self.lighting.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_enum_order() {
        let effects = EffectConfigs {
            lighting: Some(LightingConfig { ppfd_umol_m2s: 600.0 }),
            thermal: Some(ThermalConfig::default()),
            ..EffectConfigs::default()
        };
        assert_eq!(effects.kinds(), vec![EffectKind::Thermal, EffectKind::Lighting]);
        assert!(effects.has(EffectKind::Lighting));
        assert!(!effects.has(EffectKind::Co2));
    }

    #[test]
    fn serializes_as_map_keyed_by_kind() {
        let effects = EffectConfigs {
            airflow: Some(AirflowConfig { exchanges_with_ambient: true }),
            ..EffectConfigs::default()
        };
        let value = serde_json::to_value(&effects).unwrap_or_default();
        let object = value.as_object().cloned().unwrap_or_default();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("airflow"));
    }

    #[test]
    fn sensor_only_device_is_not_coverage_dependent() {
        let effects = EffectConfigs {
            sensor: Some(SensorConfig {
                measurement: SensorMeasurement::Temperature,
                noise01: 0.1,
            }),
            ..EffectConfigs::default()
        };
        assert!(!effects.is_coverage_dependent());
    }
}
