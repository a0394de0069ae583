//! The world tree: company → structures → rooms → zones → plants/devices.
//!
//! A [`World`] is an immutable snapshot. The tick pipeline produces the next
//! snapshot by cloning the top level and replacing only the subtrees that
//! changed; children are held behind [`Arc`] so untouched structures, rooms
//! and zones are shared between consecutive snapshots. Mutation goes through
//! [`World::replace_zone`] and friends, which call [`Arc::make_mut`] along the
//! path to the changed node.
//!
//! Children are stored in `Vec`s: insertion order is the canonical,
//! seed-independent iteration order of every phase.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::effects::EffectConfigs;
use crate::enums::{DevicePlacement, LifecycleStage, PhotoperiodPhase, RoomPurpose};
use crate::ids::{
    CompanyId, DeviceId, HarvestLotId, PlantId, RoomId, StructureId, ZoneId,
};

/// Floor areas must be whole multiples of this quantum.
pub const AREA_QUANTUM_M2: f64 = 0.25;

/// Density of air used to derive zone air mass, kg/m³.
pub const AIR_DENSITY_KG_PER_M3: f64 = 1.2;

// ---------------------------------------------------------------------------
// World / Company
// ---------------------------------------------------------------------------

/// An immutable snapshot of the simulated company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Seed string from which every RNG stream of this world is derived.
    pub seed: String,
    /// Number of mutating ticks applied so far.
    pub tick: u64,
    /// Simulated hours elapsed. Advances only on a mutating tick.
    pub sim_time_hours: f64,
    /// The company and everything it owns.
    pub company: Company,
}

/// The owning company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Company id.
    pub id: CompanyId,
    /// Display name.
    pub name: String,
    /// Buildings, in insertion order.
    pub structures: Vec<Arc<Structure>>,
    /// Harvest lots created so far, oldest first.
    #[serde(default)]
    pub harvest_lots: Vec<Arc<HarvestLot>>,
}

/// A building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Structure id.
    pub id: StructureId,
    /// Display name.
    pub name: String,
    /// Gross floor area.
    pub floor_area_m2: f64,
    /// Ceiling height.
    pub height_m: f64,
    /// Rooms, in insertion order.
    pub rooms: Vec<Arc<Room>>,
    /// Structure-scoped devices.
    #[serde(default)]
    pub devices: Vec<DeviceInstance>,
}

/// A room inside a structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Room id.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// Declared purpose; constrains what the room may contain.
    pub purpose: RoomPurpose,
    /// Floor area.
    pub floor_area_m2: f64,
    /// Ceiling height.
    pub height_m: f64,
    /// Zones (growrooms only), in insertion order.
    #[serde(default)]
    pub zones: Vec<Arc<Zone>>,
    /// Room-scoped devices.
    #[serde(default)]
    pub devices: Vec<DeviceInstance>,
}

// ---------------------------------------------------------------------------
// Zone
// ---------------------------------------------------------------------------

/// Air state of a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneEnvironment {
    /// Dry-bulb temperature, °C.
    pub air_temperature_c: f64,
    /// Relative humidity, [0, 1].
    pub relative_humidity01: f64,
    /// CO2 concentration, ppm.
    pub co2_ppm: f64,
    /// Canopy PPFD during the last tick, µmol/m²/s.
    #[serde(default)]
    pub ppfd_umol_m2s: f64,
    /// Light integral accumulated since the start of the current sim day, mol/m².
    #[serde(default)]
    pub dli_mol_m2: f64,
}

impl Default for ZoneEnvironment {
    fn default() -> Self {
        Self {
            air_temperature_c: 22.0,
            relative_humidity01: 0.55,
            co2_ppm: 420.0,
            ppfd_umol_m2s: 0.0,
            dli_mol_m2: 0.0,
        }
    }
}

/// Daily lighting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightSchedule {
    /// Hour of day (0-23) at which lights switch on.
    pub on_hour: u8,
    /// Hours of light per day (0-24).
    pub photoperiod_hours: u8,
}

impl LightSchedule {
    /// Whether lights are on at the given hour of day.
    pub fn is_on(self, hour_of_day: u32) -> bool {
        let len = u32::from(self.photoperiod_hours);
        if len >= 24 {
            return true;
        }
        let on = u32::from(self.on_hour).rem_euclid(24);
        // Both operands are below 24, so the shift stays in range.
        let shifted = hour_of_day.rem_euclid(24).wrapping_add(24).wrapping_sub(on).rem_euclid(24);
        shifted < len
    }
}

impl Default for LightSchedule {
    fn default() -> Self {
        Self {
            on_hour: 6,
            photoperiod_hours: 18,
        }
    }
}

/// A cultivation zone: the leaf of the containment tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone id.
    pub id: ZoneId,
    /// Display name.
    pub name: String,
    /// Floor area.
    pub floor_area_m2: f64,
    /// Ceiling height.
    pub height_m: f64,
    /// Current air state.
    pub environment: ZoneEnvironment,
    /// Lighting window.
    #[serde(default)]
    pub light_schedule: LightSchedule,
    /// Photoperiod regime.
    pub photoperiod_phase: PhotoperiodPhase,
    /// Plants, in insertion order.
    #[serde(default)]
    pub plants: Vec<Plant>,
    /// Zone-scoped devices, in insertion order.
    #[serde(default)]
    pub devices: Vec<DeviceInstance>,
    /// Per-nutrient mass held in the substrate, mg.
    #[serde(default)]
    pub nutrient_buffer_mg: BTreeMap<String, f64>,
    /// Per-nutrient buffer capacity, mg.
    pub nutrient_capacity_mg: f64,
    /// Water held in the substrate, litres.
    #[serde(default)]
    pub substrate_water_l: f64,
    /// Substrate water capacity, litres.
    pub substrate_capacity_l: f64,
}

impl Zone {
    /// Air volume, m³.
    pub fn air_volume_m3(&self) -> f64 {
        self.floor_area_m2 * self.height_m
    }

    /// Air mass, kg.
    pub fn air_mass_kg(&self) -> f64 {
        AIR_DENSITY_KG_PER_M3 * self.air_volume_m3()
    }

    /// Total plant biomass, grams.
    pub fn canopy_biomass_g(&self) -> f64 {
        self.plants.iter().map(|p| p.biomass_g).sum()
    }
}

// ---------------------------------------------------------------------------
// Devices / Plants / Lots
// ---------------------------------------------------------------------------

/// An installed device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInstance {
    /// Device id.
    pub id: DeviceId,
    /// Display name.
    pub name: String,
    /// Node kind this device is installed on.
    pub placement: DevicePlacement,
    /// Build quality, [0, 1].
    pub quality01: f64,
    /// Wear state, [0, 1]; 1 is new.
    pub condition01: f64,
    /// Nameplate electrical draw, W.
    pub power_draw_w: f64,
    /// Fraction of each tick the device runs, [0, 1].
    pub duty_cycle01: f64,
    /// Fraction of electrical power converted to useful work, [0, 1].
    pub efficiency01: f64,
    /// Floor area the device can influence, m².
    #[serde(default)]
    pub coverage_m2: f64,
    /// Air moved at full duty, m³/h.
    #[serde(default)]
    pub airflow_m3_per_h: f64,
    /// Upkeep cost at full condition, currency per operating hour.
    #[serde(default)]
    pub maintenance_cost_per_hour: Decimal,
    /// Effect-kind → config map.
    #[serde(default)]
    pub effects: EffectConfigs,
}

impl DeviceInstance {
    /// A device is active when it runs for some part of the tick.
    pub fn is_active(&self) -> bool {
        self.duty_cycle01 > 0.0
    }
}

/// A single plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    /// Plant id.
    pub id: PlantId,
    /// Strain key into the configured strain catalog.
    pub strain_id: String,
    /// Current lifecycle stage.
    pub stage: LifecycleStage,
    /// Cumulative age, hours.
    pub age_hours: f64,
    /// Hours spent in the current stage.
    #[serde(default)]
    pub stage_age_hours: f64,
    /// Vitality, [0, 1].
    pub health01: f64,
    /// Fresh biomass, grams.
    pub biomass_g: f64,
}

/// An immutable record created when plants are harvested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestLot {
    /// Lot id.
    pub id: HarvestLotId,
    /// Zone the plant was harvested from.
    pub zone_id: ZoneId,
    /// Strain of the harvested plant.
    pub strain_id: String,
    /// Harvested fresh weight, kg.
    pub fresh_weight_kg: f64,
    /// Moisture fraction at harvest, [0, 1].
    pub moisture01: f64,
    /// Quality grade, [0, 1].
    pub quality01: f64,
    /// World tick at which the lot was created.
    pub created_at_tick: u64,
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Index path from the company root to a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZonePath {
    /// Index into `company.structures`.
    pub structure: usize,
    /// Index into `structure.rooms`.
    pub room: usize,
    /// Index into `room.zones`.
    pub zone: usize,
}

impl World {
    /// All zones with their paths, in structure → room → zone order.
    pub fn zones(&self) -> Vec<(ZonePath, &Zone)> {
        let mut out = Vec::new();
        for (s_idx, structure) in self.company.structures.iter().enumerate() {
            for (r_idx, room) in structure.rooms.iter().enumerate() {
                for (z_idx, zone) in room.zones.iter().enumerate() {
                    let path = ZonePath {
                        structure: s_idx,
                        room: r_idx,
                        zone: z_idx,
                    };
                    out.push((path, zone.as_ref()));
                }
            }
        }
        out
    }

    /// Look up a zone by path.
    pub fn zone_at(&self, path: ZonePath) -> Option<&Zone> {
        self.company
            .structures
            .get(path.structure)?
            .rooms
            .get(path.room)?
            .zones
            .get(path.zone)
            .map(AsRef::as_ref)
    }

    /// Find the path of a zone by id.
    pub fn find_zone(&self, id: ZoneId) -> Option<ZonePath> {
        self.zones()
            .into_iter()
            .find_map(|(path, zone)| (zone.id == id).then_some(path))
    }

    /// Find the path of the zone containing a plant.
    pub fn find_plant_zone(&self, id: PlantId) -> Option<ZonePath> {
        self.zones().into_iter().find_map(|(path, zone)| {
            zone.plants.iter().any(|p| p.id == id).then_some(path)
        })
    }

    /// Replace the zone at `path`, copying only the nodes along the path
    /// that are still shared with other snapshots.
    ///
    /// Returns `false` if the path does not exist.
    pub fn replace_zone(&mut self, path: ZonePath, zone: Zone) -> bool {
        let Some(structure) = self.company.structures.get_mut(path.structure) else {
            return false;
        };
        let structure = Arc::make_mut(structure);
        let Some(room) = structure.rooms.get_mut(path.room) else {
            return false;
        };
        let room = Arc::make_mut(room);
        let Some(slot) = room.zones.get_mut(path.zone) else {
            return false;
        };
        *slot = Arc::new(zone);
        true
    }

    /// Mutable access to the structure-scoped devices of one structure.
    pub fn structure_devices_mut(&mut self, structure: usize) -> Option<&mut Vec<DeviceInstance>> {
        let node = self.company.structures.get_mut(structure)?;
        Some(&mut Arc::make_mut(node).devices)
    }

    /// Mutable access to the room-scoped devices of one room.
    pub fn room_devices_mut(
        &mut self,
        structure: usize,
        room: usize,
    ) -> Option<&mut Vec<DeviceInstance>> {
        let node = self.company.structures.get_mut(structure)?;
        let node = Arc::make_mut(node).rooms.get_mut(room)?;
        Some(&mut Arc::make_mut(node).devices)
    }

    /// Number of plants across all zones.
    pub fn plant_count(&self) -> usize {
        self.zones().iter().map(|(_, z)| z.plants.len()).sum()
    }

    /// Number of installed devices at every level.
    pub fn device_count(&self) -> usize {
        self.company
            .structures
            .iter()
            .map(|s| {
                s.devices.len()
                    + s.rooms
                        .iter()
                        .map(|r| r.devices.len() + r.zones.iter().map(|z| z.devices.len()).sum::<usize>())
                        .sum::<usize>()
            })
            .sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn zone(name: &str) -> Zone {
        Zone {
            id: ZoneId::new(),
            name: name.to_owned(),
            floor_area_m2: 20.0,
            height_m: 3.0,
            environment: ZoneEnvironment::default(),
            light_schedule: LightSchedule::default(),
            photoperiod_phase: PhotoperiodPhase::Vegetative,
            plants: Vec::new(),
            devices: Vec::new(),
            nutrient_buffer_mg: BTreeMap::new(),
            nutrient_capacity_mg: 10_000.0,
            substrate_water_l: 0.0,
            substrate_capacity_l: 100.0,
        }
    }

    fn world_with_two_zones() -> World {
        let room = Room {
            id: RoomId::new(),
            name: "Flower A".to_owned(),
            purpose: RoomPurpose::GrowRoom,
            floor_area_m2: 40.0,
            height_m: 3.0,
            zones: vec![Arc::new(zone("a")), Arc::new(zone("b"))],
            devices: Vec::new(),
        };
        let structure = Structure {
            id: StructureId::new(),
            name: "Warehouse".to_owned(),
            floor_area_m2: 100.0,
            height_m: 4.0,
            rooms: vec![Arc::new(room)],
            devices: Vec::new(),
        };
        World {
            seed: "test".to_owned(),
            tick: 0,
            sim_time_hours: 0.0,
            company: Company {
                id: CompanyId::new(),
                name: "Test Co".to_owned(),
                structures: vec![Arc::new(structure)],
                harvest_lots: Vec::new(),
            },
        }
    }

    #[test]
    fn air_mass_uses_density_and_volume() {
        let z = zone("a");
        assert!((z.air_volume_m3() - 60.0).abs() < 1e-9);
        assert!((z.air_mass_kg() - 72.0).abs() < 1e-9);
    }

    #[test]
    fn light_schedule_wraps_midnight() {
        let schedule = LightSchedule {
            on_hour: 20,
            photoperiod_hours: 12,
        };
        assert!(schedule.is_on(20));
        assert!(schedule.is_on(23));
        assert!(schedule.is_on(7));
        assert!(!schedule.is_on(8));
        assert!(!schedule.is_on(19));
    }

    #[test]
    fn replace_zone_shares_untouched_siblings() {
        let world = world_with_two_zones();
        let mut next = world.clone();
        let path = ZonePath {
            structure: 0,
            room: 0,
            zone: 1,
        };
        let mut changed = next.zone_at(path).unwrap().clone();
        changed.environment.air_temperature_c = 30.0;
        assert!(next.replace_zone(path, changed));

        let old_room = &world.company.structures[0].rooms[0];
        let new_room = &next.company.structures[0].rooms[0];
        assert!(!Arc::ptr_eq(old_room, new_room));
        assert!(Arc::ptr_eq(&old_room.zones[0], &new_room.zones[0]));
        assert!(!Arc::ptr_eq(&old_room.zones[1], &new_room.zones[1]));
        assert!((world.zone_at(path).unwrap().environment.air_temperature_c - 22.0).abs() < 1e-9);
    }

    #[test]
    fn find_zone_and_plant() {
        let mut world = world_with_two_zones();
        let path = ZonePath {
            structure: 0,
            room: 0,
            zone: 0,
        };
        let mut z = world.zone_at(path).unwrap().clone();
        let plant_id = PlantId::new();
        z.plants.push(Plant {
            id: plant_id,
            strain_id: "og".to_owned(),
            stage: LifecycleStage::Seedling,
            age_hours: 0.0,
            stage_age_hours: 0.0,
            health01: 1.0,
            biomass_g: 5.0,
        });
        let zone_id = z.id;
        world.replace_zone(path, z);
        assert_eq!(world.find_zone(zone_id), Some(path));
        assert_eq!(world.find_plant_zone(plant_id), Some(path));
        assert_eq!(world.plant_count(), 1);
        assert!(world.find_zone(ZoneId::new()).is_none());
    }
}
