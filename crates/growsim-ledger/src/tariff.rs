//! Utility tariffs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Prices applied to metered usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tariffs {
    /// Currency per kWh.
    pub energy_per_kwh: Decimal,
    /// Currency per m³ of water.
    pub water_per_m3: Decimal,
}

impl Default for Tariffs {
    fn default() -> Self {
        Self {
            energy_per_kwh: Decimal::new(15, 2),
            water_per_m3: Decimal::new(250, 2),
        }
    }
}

/// Per-tick replacements for configured tariffs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffOverrides {
    /// Replaces [`Tariffs::energy_per_kwh`] when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_per_kwh: Option<Decimal>,
    /// Replaces [`Tariffs::water_per_m3`] when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_per_m3: Option<Decimal>,
}

impl Tariffs {
    /// The tariffs in effect after applying `overrides`.
    #[must_use]
    pub fn with_overrides(self, overrides: &TariffOverrides) -> Self {
        Self {
            energy_per_kwh: overrides.energy_per_kwh.unwrap_or(self.energy_per_kwh),
            water_per_m3: overrides.water_per_m3.unwrap_or(self.water_per_m3),
        }
    }
}
