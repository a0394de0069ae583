//! Shared-capacity aggregation per zone.
//!
//! Devices in a zone share two capacities: the floor area their footprint
//! covers and the air they move. When either falls short, the thermal and
//! humidity contributions of every device in the zone are derated
//! proportionally and a warning is emitted. Oversupply is left unclamped.

use growsim_types::{codes, Diagnostic, Zone};

use crate::effects::airflow::{airflow_effect, AirflowInputs};

/// Thresholds the aggregator checks against.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CapacityPolicy {
    /// Minimum air changes per hour; `0` disables the airflow check.
    pub min_ach: f64,
    /// Coverage ratio below which a warning is emitted. Derating applies
    /// whenever coverage is below the floor area, independent of this.
    pub coverage_warn_ratio: f64,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            min_ach: 0.0,
            coverage_warn_ratio: 1.0,
        }
    }
}

/// Aggregated capacity of one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCapacity {
    /// Sum of active device footprints, m².
    pub total_coverage_m2: f64,
    /// Floor area that needs covering, m².
    pub required_coverage_m2: f64,
    /// `min(1, total / required)`.
    pub coverage_factor: f64,
    /// Sum of effective airflow, m³/h.
    pub total_airflow_m3_per_h: f64,
    /// Effective airflow of devices exchanging with ambient, m³/h.
    pub exchange_airflow_m3_per_h: f64,
    /// Air changes per hour from all air movers.
    pub ach: f64,
    /// Air changes per hour with ambient air.
    pub exchange_ach: f64,
    /// `min(1, ach / min_ach)`, or 1 when no minimum applies.
    pub airflow_factor: f64,
    /// Warnings raised for this zone.
    pub diagnostics: Vec<Diagnostic>,
}

impl ZoneCapacity {
    /// Combined derate applied to thermal and humidity contributions.
    pub fn derate(&self) -> f64 {
        self.coverage_factor * self.airflow_factor
    }
}

/// Aggregate the active zone-scoped devices of `zone`.
pub fn aggregate_zone(zone: &Zone, policy: &CapacityPolicy, tick_hours: f64) -> ZoneCapacity {
    let volume = zone.air_volume_m3();
    let mut total_coverage_m2 = 0.0;
    let mut total_airflow = 0.0;
    let mut exchange_airflow = 0.0;
    let mut any_active = false;
    let mut any_covering = false;

    for device in zone.devices.iter().filter(|d| d.is_active()) {
        any_active = true;
        if device.effects.is_coverage_dependent() {
            any_covering = true;
            total_coverage_m2 += device.coverage_m2.max(0.0);
        }
        let flow = airflow_effect(&AirflowInputs {
            airflow_m3_per_h: device.airflow_m3_per_h,
            duty_cycle01: device.duty_cycle01,
            zone_volume_m3: volume,
            tick_hours,
        });
        total_airflow += flow.effective_airflow_m3_per_h;
        if device.effects.airflow.as_ref().is_some_and(|a| a.exchanges_with_ambient) {
            exchange_airflow += flow.effective_airflow_m3_per_h;
        }
    }

    let required = zone.floor_area_m2.max(0.0);
    let (ach, exchange_ach) = if volume > 0.0 {
        (total_airflow / volume, exchange_airflow / volume)
    } else {
        (0.0, 0.0)
    };

    let mut capacity = ZoneCapacity {
        total_coverage_m2,
        required_coverage_m2: required,
        coverage_factor: 1.0,
        total_airflow_m3_per_h: total_airflow,
        exchange_airflow_m3_per_h: exchange_airflow,
        ach,
        exchange_ach,
        airflow_factor: 1.0,
        diagnostics: Vec::new(),
    };
    if !any_active {
        return capacity;
    }

    // Only thermal, humidity and lighting devices have a footprint to share.
    if any_covering && required > 0.0 && total_coverage_m2 < required {
        let ratio = total_coverage_m2 / required;
        capacity.coverage_factor = ratio;
        if ratio < policy.coverage_warn_ratio {
            capacity.diagnostics.push(Diagnostic::zone_warning(
                codes::COVERAGE_LOW,
                zone.id,
                format!(
                    "device coverage {total_coverage_m2:.2} m² below floor area {required:.2} m²"
                ),
            ));
        }
    }

    if policy.min_ach > 0.0 && ach < policy.min_ach {
        capacity.airflow_factor = ach / policy.min_ach;
        capacity.diagnostics.push(Diagnostic::zone_warning(
            codes::AIRFLOW_LOW,
            zone.id,
            format!("{ach:.2} air changes per hour below minimum {:.2}", policy.min_ach),
        ));
    }

    if !capacity.diagnostics.is_empty() {
        tracing::debug!(
            zone_id = %zone.id,
            coverage_factor = capacity.coverage_factor,
            airflow_factor = capacity.airflow_factor,
            "zone capacity undersupplied"
        );
    }
    capacity
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use growsim_types::{
        AirflowConfig, DeviceId, DeviceInstance, DevicePlacement, EffectConfigs, Severity, ThermalConfig,
    };
    use rust_decimal::Decimal;

    use super::*;
    use crate::tests_support::zone_with_area;

    fn heater(coverage_m2: f64) -> DeviceInstance {
        DeviceInstance {
            id: DeviceId::new(),
            name: "heater".to_owned(),
            placement: DevicePlacement::Zone,
            quality01: 0.9,
            condition01: 1.0,
            power_draw_w: 1_000.0,
            duty_cycle01: 1.0,
            efficiency01: 0.0,
            coverage_m2,
            airflow_m3_per_h: 0.0,
            maintenance_cost_per_hour: Decimal::ZERO,
            effects: EffectConfigs {
                thermal: Some(ThermalConfig::default()),
                ..EffectConfigs::default()
            },
        }
    }

    fn fan(airflow: f64) -> DeviceInstance {
        DeviceInstance {
            name: "fan".to_owned(),
            power_draw_w: 50.0,
            coverage_m2: 0.0,
            airflow_m3_per_h: airflow,
            effects: EffectConfigs {
                airflow: Some(AirflowConfig {
                    exchanges_with_ambient: true,
                }),
                ..EffectConfigs::default()
            },
            ..heater(0.0)
        }
    }

    #[test]
    fn half_coverage_derates_by_half_and_warns() {
        let mut zone = zone_with_area(20.0, 3.0);
        zone.devices.push(heater(10.0));
        let capacity = aggregate_zone(&zone, &CapacityPolicy::default(), 1.0);

        assert_eq!(capacity.coverage_factor, 0.5);
        assert_eq!(capacity.derate(), 0.5);
        assert_eq!(capacity.diagnostics.len(), 1);
        let diag = &capacity.diagnostics[0];
        assert_eq!(diag.code, codes::COVERAGE_LOW);
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.zone_id, Some(zone.id));
    }

    #[test]
    fn oversupply_is_not_clamped_or_reported() {
        let mut zone = zone_with_area(20.0, 3.0);
        zone.devices.push(heater(15.0));
        zone.devices.push(heater(15.0));
        let capacity = aggregate_zone(&zone, &CapacityPolicy::default(), 1.0);
        assert_eq!(capacity.total_coverage_m2, 30.0);
        assert_eq!(capacity.coverage_factor, 1.0);
        assert!(capacity.diagnostics.is_empty());
    }

    #[test]
    fn low_airflow_warns_when_minimum_is_set() {
        let mut zone = zone_with_area(20.0, 3.0);
        zone.devices.push(heater(20.0));
        zone.devices.push(fan(120.0));
        let policy = CapacityPolicy {
            min_ach: 4.0,
            ..CapacityPolicy::default()
        };
        let capacity = aggregate_zone(&zone, &policy, 1.0);

        // 120 m³/h over 60 m³ = 2 ACH, half the minimum.
        assert_eq!(capacity.ach, 2.0);
        assert_eq!(capacity.exchange_ach, 2.0);
        assert_eq!(capacity.airflow_factor, 0.5);
        assert_eq!(capacity.diagnostics.len(), 1);
        assert_eq!(capacity.diagnostics[0].code, codes::AIRFLOW_LOW);
    }

    #[test]
    fn footprint_free_devices_do_not_trigger_coverage_warning() {
        let mut zone = zone_with_area(20.0, 3.0);
        zone.devices.push(fan(240.0));
        let capacity = aggregate_zone(&zone, &CapacityPolicy::default(), 1.0);
        assert_eq!(capacity.total_coverage_m2, 0.0);
        assert_eq!(capacity.coverage_factor, 1.0);
        assert!(capacity.diagnostics.is_empty());
    }

    #[test]
    fn zone_without_active_devices_is_neutral() {
        let mut zone = zone_with_area(20.0, 3.0);
        let mut idle = heater(1.0);
        idle.duty_cycle01 = 0.0;
        zone.devices.push(idle);
        let policy = CapacityPolicy {
            min_ach: 4.0,
            ..CapacityPolicy::default()
        };
        let capacity = aggregate_zone(&zone, &policy, 1.0);
        assert_eq!(capacity.derate(), 1.0);
        assert!(capacity.diagnostics.is_empty());
    }
}
