//! The seeded demo facility used by the CLI, the replay harness, and tests.
//!
//! Every id is drawn from the `fixture:ids` stream and every per-plant jitter
//! from `fixture:plants`, so the same seed always builds the same world,
//! byte for byte.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use growsim_physics::{create_rng, SimRng};
use growsim_types::{
    AirflowConfig, Co2Config, Company, CompanyId, DeviceId, DeviceInstance, DevicePlacement,
    EffectConfigs, HumidityConfig, HumidityMode, LifecycleStage, LightSchedule, LightingConfig,
    NutrientConfig, PhotoperiodPhase, Plant, PlantId, Room, RoomId, RoomPurpose, SensorConfig,
    SensorMeasurement, Structure, StructureId, ThermalConfig, World, Zone, ZoneEnvironment, ZoneId,
};

struct Seeded {
    ids: SimRng,
    plants: SimRng,
}

impl Seeded {
    fn new(seed: &str) -> Self {
        Self {
            ids: create_rng(seed, "fixture:ids"),
            plants: create_rng(seed, "fixture:plants"),
        }
    }

    fn bytes(&mut self) -> [u8; 16] {
        self.ids.next_bytes16()
    }

    fn jitter(&mut self) -> f64 {
        self.plants.next_f64()
    }
}

fn nutrients(k: f64, n: f64, p: f64) -> BTreeMap<String, f64> {
    BTreeMap::from([("k".to_owned(), k), ("n".to_owned(), n), ("p".to_owned(), p)])
}

fn device(seeded: &mut Seeded, name: &str, placement: DevicePlacement, power_draw_w: f64) -> DeviceInstance {
    DeviceInstance {
        id: DeviceId::from_random_bytes(seeded.bytes()),
        name: name.to_owned(),
        placement,
        quality01: 0.9,
        condition01: 1.0,
        power_draw_w,
        duty_cycle01: 1.0,
        efficiency01: 0.9,
        coverage_m2: 0.0,
        airflow_m3_per_h: 0.0,
        maintenance_cost_per_hour: Decimal::new(2, 2),
        effects: EffectConfigs::default(),
    }
}

fn led(seeded: &mut Seeded, name: &str, coverage_m2: f64) -> DeviceInstance {
    DeviceInstance {
        efficiency01: 0.5,
        coverage_m2,
        maintenance_cost_per_hour: Decimal::new(5, 2),
        effects: EffectConfigs {
            lighting: Some(LightingConfig { ppfd_umol_m2s: 900.0 }),
            thermal: Some(ThermalConfig::default()),
            ..EffectConfigs::default()
        },
        ..device(seeded, name, DevicePlacement::Zone, 600.0)
    }
}

fn fan(seeded: &mut Seeded, name: &str, airflow_m3_per_h: f64, exchanges_with_ambient: bool) -> DeviceInstance {
    DeviceInstance {
        airflow_m3_per_h,
        effects: EffectConfigs {
            airflow: Some(AirflowConfig { exchanges_with_ambient }),
            ..EffectConfigs::default()
        },
        ..device(seeded, name, DevicePlacement::Zone, 40.0)
    }
}

fn sensor(seeded: &mut Seeded, name: &str, measurement: SensorMeasurement) -> DeviceInstance {
    DeviceInstance {
        maintenance_cost_per_hour: Decimal::ZERO,
        effects: EffectConfigs {
            sensor: Some(SensorConfig {
                measurement,
                noise01: 0.02,
            }),
            ..EffectConfigs::default()
        },
        ..device(seeded, name, DevicePlacement::Zone, 2.0)
    }
}

fn plants(
    seeded: &mut Seeded,
    count: usize,
    strains: &[&str],
    stage: LifecycleStage,
    stage_age_hours: f64,
    prior_hours: f64,
    biomass_g: f64,
) -> Vec<Plant> {
    strains
        .iter()
        .cycle()
        .take(count)
        .map(|strain| {
            let age_jitter = seeded.jitter() * 96.0;
            let mass_jitter = seeded.jitter();
            let health_jitter = seeded.jitter();
            Plant {
                id: PlantId::from_random_bytes(seeded.bytes()),
                strain_id: (*strain).to_owned(),
                stage,
                age_hours: prior_hours + stage_age_hours + age_jitter,
                stage_age_hours: stage_age_hours + age_jitter,
                health01: 0.9 + 0.1 * health_jitter,
                biomass_g: biomass_g * (0.9 + 0.2 * mass_jitter),
            }
        })
        .collect()
}

fn flower_zone(seeded: &mut Seeded) -> Zone {
    let id = ZoneId::from_random_bytes(seeded.bytes());
    let devices = vec![
        led(seeded, "LED bar A1", 20.0),
        led(seeded, "LED bar A2", 20.0),
        DeviceInstance {
            coverage_m2: 40.0,
            maintenance_cost_per_hour: Decimal::new(12, 2),
            effects: EffectConfigs {
                thermal: Some(ThermalConfig {
                    setpoint_c: Some(24.0),
                    heating_capacity_w: 3000.0,
                    cooling_capacity_w: 5000.0,
                }),
                ..EffectConfigs::default()
            },
            ..device(seeded, "Split HVAC", DevicePlacement::Zone, 1500.0)
        },
        DeviceInstance {
            coverage_m2: 40.0,
            duty_cycle01: 0.8,
            effects: EffectConfigs {
                humidity: Some(HumidityConfig {
                    mode: HumidityMode::Dehumidify,
                    capacity_g_per_h: 800.0,
                    target_rh01: 0.55,
                }),
                ..EffectConfigs::default()
            },
            ..device(seeded, "Dehumidifier", DevicePlacement::Zone, 450.0)
        },
        fan(seeded, "Exhaust fan", 60.0, true),
        fan(seeded, "Circulation fan", 360.0, false),
        DeviceInstance {
            effects: EffectConfigs {
                co2: Some(Co2Config {
                    target_ppm: 900.0,
                    pulse_ppm_per_tick: 300.0,
                    safety_max_ppm: 1500.0,
                    hysteresis_ppm: 20.0,
                }),
                ..EffectConfigs::default()
            },
            ..device(seeded, "CO2 injector", DevicePlacement::Zone, 100.0)
        },
        sensor(seeded, "Temperature probe", SensorMeasurement::Temperature),
        sensor(seeded, "Humidity probe", SensorMeasurement::Humidity),
    ];
    let plants = plants(
        seeded,
        8,
        &["northern-lights", "og-kush"],
        LifecycleStage::Flowering,
        1000.0,
        700.0,
        320.0,
    );
    Zone {
        id,
        name: "Flower A".to_owned(),
        floor_area_m2: 40.0,
        height_m: 3.0,
        environment: ZoneEnvironment {
            air_temperature_c: 24.0,
            relative_humidity01: 0.55,
            co2_ppm: 800.0,
            ppfd_umol_m2s: 0.0,
            dli_mol_m2: 0.0,
        },
        light_schedule: LightSchedule {
            on_hour: 6,
            photoperiod_hours: 12,
        },
        photoperiod_phase: PhotoperiodPhase::Flowering,
        plants,
        devices,
        nutrient_buffer_mg: nutrients(2000.0, 3000.0, 800.0),
        nutrient_capacity_mg: 50_000.0,
        substrate_water_l: 200.0,
        substrate_capacity_l: 400.0,
    }
}

fn veg_zone(seeded: &mut Seeded) -> Zone {
    let id = ZoneId::from_random_bytes(seeded.bytes());
    let devices = vec![
        // Deliberately undersized for the floor.
        led(seeded, "LED panel B1", 16.0),
        fan(seeded, "Circulation fan", 240.0, true),
        DeviceInstance {
            duty_cycle01: 0.25,
            effects: EffectConfigs {
                nutrient: Some(NutrientConfig {
                    dosing_mg_per_h: nutrients(30.0, 40.0, 10.0),
                }),
                ..EffectConfigs::default()
            },
            ..device(seeded, "Dosing pump", DevicePlacement::Zone, 15.0)
        },
    ];
    let plants = plants(seeded, 6, &["og-kush"], LifecycleStage::Vegetative, 120.0, 168.0, 60.0);
    Zone {
        id,
        name: "Veg B".to_owned(),
        floor_area_m2: 24.0,
        height_m: 3.0,
        environment: ZoneEnvironment::default(),
        light_schedule: LightSchedule {
            on_hour: 4,
            photoperiod_hours: 18,
        },
        photoperiod_phase: PhotoperiodPhase::Vegetative,
        plants,
        devices,
        nutrient_buffer_mg: nutrients(500.0, 800.0, 200.0),
        nutrient_capacity_mg: 20_000.0,
        substrate_water_l: 80.0,
        substrate_capacity_l: 240.0,
    }
}

/// Build the demo facility for `seed`.
///
/// One structure with a flowering room, a vegetative room, and a storage
/// room. The flowering zone carries the full device set; the vegetative
/// zone's light is undersized on purpose and raises a coverage warning
/// every tick.
pub fn demo_world(seed: &str) -> World {
    let mut seeded = Seeded::new(seed);
    let company_id = CompanyId::from_random_bytes(seeded.bytes());
    let structure_id = StructureId::from_random_bytes(seeded.bytes());
    let security = device(&mut seeded, "Security system", DevicePlacement::Structure, 50.0);

    let flower_room_id = RoomId::from_random_bytes(seeded.bytes());
    let controller = device(&mut seeded, "Room controller", DevicePlacement::Room, 20.0);
    let flower = Room {
        id: flower_room_id,
        name: "Flower Room".to_owned(),
        purpose: RoomPurpose::GrowRoom,
        floor_area_m2: 120.0,
        height_m: 4.0,
        zones: vec![Arc::new(flower_zone(&mut seeded))],
        devices: vec![controller],
    };

    let veg = Room {
        id: RoomId::from_random_bytes(seeded.bytes()),
        name: "Veg Room".to_owned(),
        purpose: RoomPurpose::GrowRoom,
        floor_area_m2: 80.0,
        height_m: 4.0,
        zones: vec![Arc::new(veg_zone(&mut seeded))],
        devices: Vec::new(),
    };

    let storage = Room {
        id: RoomId::from_random_bytes(seeded.bytes()),
        name: "Storage".to_owned(),
        purpose: RoomPurpose::Storage,
        floor_area_m2: 60.0,
        height_m: 4.0,
        zones: Vec::new(),
        devices: Vec::new(),
    };

    World {
        seed: seed.to_owned(),
        tick: 0,
        sim_time_hours: 0.0,
        company: Company {
            id: company_id,
            name: "Demo Cultivation Co.".to_owned(),
            structures: vec![Arc::new(Structure {
                id: structure_id,
                name: "Main Facility".to_owned(),
                floor_area_m2: 400.0,
                height_m: 6.0,
                rooms: vec![Arc::new(flower), Arc::new(veg), Arc::new(storage)],
                devices: vec![security],
            })],
            harvest_lots: Vec::new(),
        },
    }
}
