//! Enumeration types for the growsim world model.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Containment
// ---------------------------------------------------------------------------

/// Declared purpose of a room. Only [`RoomPurpose::GrowRoom`] may host zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum RoomPurpose {
    /// Cultivation space; the only purpose allowed to contain zones.
    GrowRoom,
    /// Dry storage for harvested lots and supplies.
    Storage,
    /// Staff office / break room.
    Office,
    /// Drying, curing, and trimming.
    Processing,
}

impl RoomPurpose {
    /// Whether rooms with this purpose may contain zones.
    pub const fn hosts_zones(self) -> bool {
        matches!(self, Self::GrowRoom)
    }
}

/// Which kind of node a device is installed on.
///
/// The placement must match the node that actually hosts the device; the
/// world validator reports a mismatch as an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum DevicePlacement {
    /// Installed at building level (pumps, boilers).
    Structure,
    /// Installed at room level (room HVAC, dehumidifiers serving a whole room).
    Room,
    /// Installed inside a zone; the only placement that produces zone effects.
    Zone,
}

// ---------------------------------------------------------------------------
// Plants
// ---------------------------------------------------------------------------

/// Plant lifecycle stage. Transitions are monotonic and forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    /// Freshly germinated or cloned.
    Seedling,
    /// Leaf and stem growth.
    Vegetative,
    /// Flower development, triggered by a short photoperiod.
    Flowering,
    /// Mature and waiting to be harvested.
    HarvestReady,
}

impl LifecycleStage {
    /// The stage that follows this one, or `None` for the terminal stage.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Seedling => Some(Self::Vegetative),
            Self::Vegetative => Some(Self::Flowering),
            Self::Flowering => Some(Self::HarvestReady),
            Self::HarvestReady => None,
        }
    }
}

/// The light regime a zone is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum PhotoperiodPhase {
    /// Long days; plants stay vegetative.
    Vegetative,
    /// Short days; vegetative plants of sufficient age start flowering.
    Flowering,
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// The closed set of effect kinds a device can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Sensible heat (waste heat plus optional active conditioning).
    Thermal,
    /// Water vapour added to or removed from zone air.
    Humidity,
    /// CO2 enrichment.
    Co2,
    /// Noisy measurement of a zone quantity.
    Sensor,
    /// Air movement / ventilation.
    Airflow,
    /// Photosynthetic lighting.
    Lighting,
    /// Nutrient dosing into the zone buffer.
    Nutrient,
}

/// Direction of a humidity device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum HumidityMode {
    /// Adds water vapour.
    Humidify,
    /// Removes water vapour.
    Dehumidify,
}

/// The zone quantity a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum SensorMeasurement {
    /// Dry-bulb air temperature in degrees Celsius.
    Temperature,
    /// Relative humidity as a fraction.
    Humidity,
    /// CO2 concentration in ppm.
    Co2,
    /// Photosynthetic photon flux density in µmol/m²/s.
    Ppfd,
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    Info,
    /// Degraded but still running.
    Warning,
    /// Requires operator attention.
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_moves_forward_only() {
        let mut stage = LifecycleStage::Seedling;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            stage = next;
            seen.push(stage);
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(stage, LifecycleStage::HarvestReady);
    }

    #[test]
    fn only_growrooms_host_zones() {
        assert!(RoomPurpose::GrowRoom.hosts_zones());
        assert!(!RoomPurpose::Storage.hosts_zones());
        assert!(!RoomPurpose::Office.hosts_zones());
        assert!(!RoomPurpose::Processing.hosts_zones());
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap_or_default();
        assert_eq!(json, "\"warning\"");
    }
}
