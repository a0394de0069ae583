//! World-tree validation.
//!
//! [`validate_world`] walks the whole tree and returns every violation it
//! finds as a [`ValidationIssue`]; it never stops at the first one. An empty
//! list means the world is safe to tick.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use growsim_types::{DeviceInstance, DevicePlacement, World, Zone, AREA_QUANTUM_M2};

/// Tolerance when checking that an area is a whole number of quanta.
const QUANTUM_EPSILON: f64 = 1e-6;

/// One violated invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path to the offending node, e.g. `structures[0].rooms[1].zones[0]`.
    pub path: String,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Default)]
struct Issues {
    list: Vec<ValidationIssue>,
    seen_ids: BTreeSet<uuid::Uuid>,
}

impl Issues {
    fn push(&mut self, path: &str, message: impl Into<String>) {
        self.list.push(ValidationIssue {
            path: path.to_owned(),
            message: message.into(),
        });
    }

    fn unit(&mut self, path: &str, field: &str, value: f64) {
        if !(0.0..=1.0).contains(&value) {
            self.push(path, format!("{field} {value} is outside [0, 1]"));
        }
    }

    fn non_negative(&mut self, path: &str, field: &str, value: f64) {
        if !value.is_finite() || value < 0.0 {
            self.push(path, format!("{field} {value} must be a finite, non-negative number"));
        }
    }

    fn footprint(&mut self, path: &str, area_m2: f64, height_m: f64) {
        if !area_m2.is_finite() || area_m2 <= 0.0 {
            self.push(path, format!("floor area {area_m2} m² must be positive"));
        } else {
            let quanta = area_m2 / AREA_QUANTUM_M2;
            if (quanta - quanta.round()).abs() > QUANTUM_EPSILON {
                self.push(
                    path,
                    format!("floor area {area_m2} m² is not a multiple of {AREA_QUANTUM_M2} m²"),
                );
            }
        }
        if !height_m.is_finite() || height_m <= 0.0 {
            self.push(path, format!("height {height_m} m must be positive"));
        }
    }

    fn unique(&mut self, path: &str, id: uuid::Uuid) {
        if !self.seen_ids.insert(id) {
            self.push(path, format!("duplicate id {id}"));
        }
    }
}

/// Check every containment, placement, and range invariant of `world`.
pub fn validate_world(world: &World) -> Vec<ValidationIssue> {
    let mut issues = Issues::default();

    if !world.sim_time_hours.is_finite() || world.sim_time_hours < 0.0 {
        issues.push("world", format!("sim time {} h must be non-negative", world.sim_time_hours));
    }

    for (s_idx, structure) in world.company.structures.iter().enumerate() {
        let s_path = format!("structures[{s_idx}]");
        issues.unique(&s_path, structure.id.into_inner());
        issues.footprint(&s_path, structure.floor_area_m2, structure.height_m);
        check_devices(&mut issues, &s_path, &structure.devices, DevicePlacement::Structure);

        let room_area: f64 = structure.rooms.iter().map(|r| r.floor_area_m2).sum();
        if room_area > structure.floor_area_m2 + QUANTUM_EPSILON {
            issues.push(
                &s_path,
                format!(
                    "rooms occupy {room_area} m², more than the structure's {} m²",
                    structure.floor_area_m2
                ),
            );
        }

        for (r_idx, room) in structure.rooms.iter().enumerate() {
            let r_path = format!("{s_path}.rooms[{r_idx}]");
            issues.unique(&r_path, room.id.into_inner());
            issues.footprint(&r_path, room.floor_area_m2, room.height_m);
            if room.height_m > structure.height_m + QUANTUM_EPSILON {
                issues.push(&r_path, "room is taller than its structure");
            }
            check_devices(&mut issues, &r_path, &room.devices, DevicePlacement::Room);

            if !room.zones.is_empty() && !room.purpose.hosts_zones() {
                issues.push(
                    &r_path,
                    format!("room with purpose {:?} may not contain zones", room.purpose),
                );
            }
            let zone_area: f64 = room.zones.iter().map(|z| z.floor_area_m2).sum();
            if zone_area > room.floor_area_m2 + QUANTUM_EPSILON {
                issues.push(
                    &r_path,
                    format!(
                        "zones occupy {zone_area} m², more than the room's {} m²",
                        room.floor_area_m2
                    ),
                );
            }

            for (z_idx, zone) in room.zones.iter().enumerate() {
                let z_path = format!("{r_path}.zones[{z_idx}]");
                if zone.height_m > room.height_m + QUANTUM_EPSILON {
                    issues.push(&z_path, "zone is taller than its room");
                }
                check_zone(&mut issues, &z_path, zone);
            }
        }
    }

    for (l_idx, lot) in world.company.harvest_lots.iter().enumerate() {
        let l_path = format!("harvest_lots[{l_idx}]");
        issues.unique(&l_path, lot.id.into_inner());
        issues.non_negative(&l_path, "fresh_weight_kg", lot.fresh_weight_kg);
        issues.unit(&l_path, "moisture01", lot.moisture01);
        issues.unit(&l_path, "quality01", lot.quality01);
    }

    issues.list
}

fn check_zone(issues: &mut Issues, path: &str, zone: &Zone) {
    issues.unique(path, zone.id.into_inner());
    issues.footprint(path, zone.floor_area_m2, zone.height_m);

    let env = &zone.environment;
    issues.unit(path, "relative_humidity01", env.relative_humidity01);
    issues.non_negative(path, "co2_ppm", env.co2_ppm);
    if !env.air_temperature_c.is_finite() {
        issues.push(path, "air temperature must be finite");
    }

    let schedule = zone.light_schedule;
    if schedule.on_hour >= 24 {
        issues.push(path, format!("light on_hour {} is outside 0..24", schedule.on_hour));
    }
    if schedule.photoperiod_hours > 24 {
        issues.push(
            path,
            format!("photoperiod {} h exceeds a day", schedule.photoperiod_hours),
        );
    }

    issues.non_negative(path, "nutrient_capacity_mg", zone.nutrient_capacity_mg);
    for (key, mg) in &zone.nutrient_buffer_mg {
        issues.non_negative(path, &format!("nutrient_buffer_mg.{key}"), *mg);
    }
    issues.non_negative(path, "substrate_capacity_l", zone.substrate_capacity_l);
    issues.non_negative(path, "substrate_water_l", zone.substrate_water_l);
    if zone.substrate_water_l > zone.substrate_capacity_l {
        issues.push(path, "substrate holds more water than its capacity");
    }

    check_devices(issues, path, &zone.devices, DevicePlacement::Zone);

    for (p_idx, plant) in zone.plants.iter().enumerate() {
        let p_path = format!("{path}.plants[{p_idx}]");
        issues.unique(&p_path, plant.id.into_inner());
        issues.unit(&p_path, "health01", plant.health01);
        issues.non_negative(&p_path, "biomass_g", plant.biomass_g);
        issues.non_negative(&p_path, "age_hours", plant.age_hours);
        issues.non_negative(&p_path, "stage_age_hours", plant.stage_age_hours);
        if plant.stage_age_hours > plant.age_hours {
            issues.push(&p_path, "stage age exceeds plant age");
        }
    }
}

fn check_devices(issues: &mut Issues, parent: &str, devices: &[DeviceInstance], host: DevicePlacement) {
    for (d_idx, device) in devices.iter().enumerate() {
        let path = format!("{parent}.devices[{d_idx}]");
        issues.unique(&path, device.id.into_inner());
        if device.placement != host {
            issues.push(
                &path,
                format!(
                    "device placed as {:?} is installed on a {host:?} node",
                    device.placement
                ),
            );
        }
        issues.unit(&path, "quality01", device.quality01);
        issues.unit(&path, "condition01", device.condition01);
        issues.unit(&path, "duty_cycle01", device.duty_cycle01);
        issues.unit(&path, "efficiency01", device.efficiency01);
        issues.non_negative(&path, "power_draw_w", device.power_draw_w);
        issues.non_negative(&path, "coverage_m2", device.coverage_m2);
        issues.non_negative(&path, "airflow_m3_per_h", device.airflow_m3_per_h);

        let effects = &device.effects;
        if host != DevicePlacement::Zone && (effects.sensor.is_some() || effects.lighting.is_some()) {
            issues.push(&path, "sensor and lighting effects need a zone placement");
        }
        if let Some(humidity) = &effects.humidity {
            issues.unit(&path, "humidity.target_rh01", humidity.target_rh01);
        }
        if let Some(sensor) = &effects.sensor {
            issues.unit(&path, "sensor.noise01", sensor.noise01);
        }
        if let Some(co2) = &effects.co2 {
            if co2.target_ppm > co2.safety_max_ppm {
                issues.push(&path, "co2 target exceeds the safety maximum");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use growsim_types::RoomPurpose;

    use super::*;
    use crate::fixture::demo_world;

    #[test]
    fn demo_world_is_valid() {
        let issues = validate_world(&demo_world("gm-001"));
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn all_issues_are_collected() {
        let mut world = demo_world("bad");
        let structure = Arc::make_mut(&mut world.company.structures[0]);
        let room = Arc::make_mut(&mut structure.rooms[0]);
        room.purpose = RoomPurpose::Storage;
        let zone = Arc::make_mut(&mut room.zones[0]);
        zone.devices[0].efficiency01 = 1.5;
        zone.devices[1].placement = DevicePlacement::Room;

        let issues = validate_world(&world);
        assert!(issues.len() >= 3, "{issues:?}");
        assert!(issues.iter().any(|i| i.message.contains("may not contain zones")));
        assert!(issues
            .iter()
            .any(|i| i.path.ends_with("devices[0]") && i.message.contains("efficiency01")));
        assert!(issues
            .iter()
            .any(|i| i.path.ends_with("devices[1]") && i.message.contains("installed on a Zone")));
    }

    #[test]
    fn off_quantum_area_is_reported() {
        let mut world = demo_world("area");
        let structure = Arc::make_mut(&mut world.company.structures[0]);
        let room = Arc::make_mut(&mut structure.rooms[0]);
        Arc::make_mut(&mut room.zones[0]).floor_area_m2 = 10.1;

        let issues = validate_world(&world);
        assert_eq!(issues.len(), 1, "{issues:?}");
        assert!(issues[0].message.contains("not a multiple"));
        assert_eq!(issues[0].path, "structures[0].rooms[0].zones[0]");
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let mut world = demo_world("dup");
        let structure = Arc::make_mut(&mut world.company.structures[0]);
        let room = Arc::make_mut(&mut structure.rooms[0]);
        let zone = Arc::make_mut(&mut room.zones[0]);
        let first = zone.plants[0].clone();
        zone.plants.push(first);

        let issues = validate_world(&world);
        assert!(issues.iter().any(|i| i.message.starts_with("duplicate id")));
    }
}
