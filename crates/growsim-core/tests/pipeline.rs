//! End-to-end tests of the tick pipeline through its public API.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::missing_panics_doc,
    clippy::arithmetic_side_effects
)]

use std::sync::Arc;

use growsim_core::config::SimulationConfig;
use growsim_core::fixture::demo_world;
use growsim_core::hashing::world_hash;
use growsim_core::sinks::{RecordingDiagnostics, RecordingStageHook, RecordingTelemetry};
use growsim_core::{RunContext, Simulation, Sinks, TickError, TickInputs, TickOutcome, TickPhase};
use growsim_types::{
    codes, topics, DeviceInstance, EffectConfigs, IrrigationEvent, IrrigationTarget,
    LifecycleStage, ThermalConfig, World, ZoneId,
};

#[derive(Default)]
struct Harness {
    telemetry: RecordingTelemetry,
    diagnostics: RecordingDiagnostics,
    hook: RecordingStageHook,
}

impl Harness {
    fn tick(
        &mut self,
        simulation: &mut Simulation,
        world: &Arc<World>,
        inputs: TickInputs,
    ) -> Result<TickOutcome, TickError> {
        let mut ctx = RunContext::new(
            inputs,
            Sinks {
                telemetry: &mut self.telemetry,
                diagnostics: &mut self.diagnostics,
                hook: &mut self.hook,
            },
        );
        simulation.run_tick(world, &mut ctx)
    }
}

fn simulation() -> Simulation {
    Simulation::new(SimulationConfig::default()).unwrap()
}

/// The demo facility with every plant removed and every device switched off.
fn idle_world(seed: &str) -> World {
    let mut world = demo_world(seed);
    for structure in &mut world.company.structures {
        let structure = Arc::make_mut(structure);
        for device in &mut structure.devices {
            device.duty_cycle01 = 0.0;
        }
        for room in &mut structure.rooms {
            let room = Arc::make_mut(room);
            for device in &mut room.devices {
                device.duty_cycle01 = 0.0;
            }
            for zone in &mut room.zones {
                let zone = Arc::make_mut(zone);
                zone.plants.clear();
                for device in &mut zone.devices {
                    device.duty_cycle01 = 0.0;
                }
            }
        }
    }
    world
}

fn first_zone_id(world: &World) -> ZoneId {
    world.zones()[0].1.id
}

fn edit_first_zone(world: &mut World, edit: impl FnOnce(&mut growsim_types::Zone)) {
    let structure = Arc::make_mut(&mut world.company.structures[0]);
    let room = Arc::make_mut(&mut structure.rooms[0]);
    edit(Arc::make_mut(&mut room.zones[0]));
}

#[test]
fn idle_tick_returns_the_same_snapshot() {
    let world = Arc::new(idle_world("idle"));
    let mut harness = Harness::default();

    let outcome = harness.tick(&mut simulation(), &world, TickInputs::default()).unwrap();

    assert!(Arc::ptr_eq(&outcome.world, &world));
    assert!(!outcome.mutated);
    assert_eq!(outcome.world.tick, 0);
    assert_eq!(outcome.world.sim_time_hours, 0.0);
    assert_eq!(outcome.summary.throughput.zones_updated, 0);

    let completed = harness.telemetry.on_topic(topics::TICK_COMPLETED);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["mutated"], serde_json::Value::Bool(false));
    assert!(harness.telemetry.on_topic(topics::ZONE_SNAPSHOT).is_empty());
    // Payroll accrues even when nothing in the world changed.
    assert!(outcome.summary.costs.payroll_cost > rust_decimal::Decimal::ZERO);
}

#[test]
fn running_device_without_wear_keeps_the_snapshot() {
    let mut world = idle_world("no-wear");
    Arc::make_mut(&mut world.company.structures[0]).devices[0].duty_cycle01 = 1.0;
    let world = Arc::new(world);

    let mut config = SimulationConfig::default();
    config.devices.wear_per_hour = 0.0;
    let mut harness = Harness::default();
    let outcome = harness
        .tick(&mut Simulation::new(config).unwrap(), &world, TickInputs::default())
        .unwrap();
    assert!(Arc::ptr_eq(&outcome.world, &world));
    assert!(!outcome.mutated);
    assert!(outcome.summary.costs.energy_kwh > 0.0);

    // The same device under the default wear rate does change the world.
    let mut harness = Harness::default();
    let worn = harness.tick(&mut simulation(), &world, TickInputs::default()).unwrap();
    assert!(worn.mutated);
    assert!(
        worn.world.company.structures[0].devices[0].condition01
            < world.company.structures[0].devices[0].condition01
    );
}

#[test]
fn irrigation_tick_advances_time_by_tick_duration() {
    let world = Arc::new(idle_world("irrigate"));
    let zone_id = first_zone_id(&world);
    let inputs = TickInputs {
        irrigation_events: vec![IrrigationEvent {
            target: IrrigationTarget::Zone(zone_id),
            water_l: 10.0,
            concentrations_mg_per_l: [("n".to_owned(), 100.0)].into_iter().collect(),
        }],
        ..TickInputs::with_duration(0.5)
    };
    let mut harness = Harness::default();

    let outcome = harness.tick(&mut simulation(), &world, inputs).unwrap();

    assert!(outcome.mutated);
    assert!(!Arc::ptr_eq(&outcome.world, &world));
    assert_eq!(outcome.world.tick, 1);
    assert_eq!(outcome.world.sim_time_hours, 0.5);
    assert_eq!(outcome.summary.throughput.irrigation_events, 1);
    assert!((outcome.summary.costs.water_m3 - 0.01).abs() < 1e-12);

    let zone = outcome.world.zones()[0].1;
    assert!(zone.substrate_water_l > world.zones()[0].1.substrate_water_l);
    // The input snapshot is untouched.
    assert_eq!(world.tick, 0);
    // Untouched rooms stay shared between snapshots.
    assert!(Arc::ptr_eq(
        &outcome.world.company.structures[0].rooms[1],
        &world.company.structures[0].rooms[1]
    ));
}

#[test]
fn phases_fire_in_order() {
    let world = Arc::new(demo_world("order"));
    let mut harness = Harness::default();

    harness.tick(&mut simulation(), &world, TickInputs::default()).unwrap();

    assert_eq!(harness.hook.phases, TickPhase::ALL.to_vec());
}

#[test]
fn failed_tick_publishes_nothing() {
    let mut world = demo_world("broken");
    let mut hvac_id = None;
    edit_first_zone(&mut world, |zone| {
        let hvac = zone
            .devices
            .iter_mut()
            .find(|d| d.effects.thermal.as_ref().is_some_and(|t| t.setpoint_c.is_some()))
            .unwrap();
        hvac.efficiency01 = 1.5;
        hvac_id = Some(hvac.id);
    });
    let world = Arc::new(world);
    let mut harness = Harness::default();

    let result = harness.tick(&mut simulation(), &world, TickInputs::default());

    match result {
        Err(TickError::Physics {
            zone_id, device_id, ..
        }) => {
            assert_eq!(zone_id, Some(first_zone_id(&world)));
            assert_eq!(device_id, hvac_id);
        }
        other => panic!("expected a physics error, got {other:?}"),
    }
    assert!(harness.telemetry.events.is_empty());
    assert!(harness.diagnostics.diagnostics.is_empty());
    assert_eq!(harness.hook.phases, vec![TickPhase::Initialization]);
}

#[test]
fn non_positive_duration_is_rejected() {
    let world = Arc::new(demo_world("zero"));
    let mut harness = Harness::default();

    let result = harness.tick(&mut simulation(), &world, TickInputs::with_duration(0.0));

    assert!(matches!(result, Err(TickError::InvalidTickDuration { .. })));
    assert!(harness.hook.phases.is_empty());
}

#[test]
fn unknown_strain_falls_back_with_diagnostic() {
    let mut world = demo_world("strain");
    edit_first_zone(&mut world, |zone| {
        zone.plants[0].strain_id = "mystery-kush".to_owned();
    });
    let plant_id = world.zones()[0].1.plants[0].id;
    let world = Arc::new(world);
    let mut harness = Harness::default();

    let outcome = harness.tick(&mut simulation(), &world, TickInputs::default()).unwrap();

    let missing: Vec<_> = harness
        .diagnostics
        .diagnostics
        .iter()
        .filter(|d| d.code == codes::STRAIN_MISSING)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].plant_id, Some(plant_id));
    // The plant still aged on the default profile.
    let plant = &outcome.world.zones()[0].1.plants[0];
    assert!(plant.age_hours > world.zones()[0].1.plants[0].age_hours);
}

#[test]
fn undersized_lighting_warns_and_reaches_the_snapshot() {
    let world = Arc::new(demo_world("coverage"));
    let veg_zone = world.zones()[1].1.id;
    let mut harness = Harness::default();

    harness.tick(&mut simulation(), &world, TickInputs::default()).unwrap();

    assert!(harness
        .diagnostics
        .diagnostics
        .iter()
        .any(|d| d.code == codes::COVERAGE_LOW && d.zone_id == Some(veg_zone)));
    let veg_id = serde_json::to_value(veg_zone).unwrap();
    let snapshot = harness
        .telemetry
        .on_topic(topics::ZONE_SNAPSHOT)
        .into_iter()
        .find(|s| s["zone_id"] == veg_id)
        .unwrap();
    let warnings = snapshot["warnings"].as_array().unwrap();
    assert!(warnings
        .iter()
        .any(|w| w["code"] == serde_json::Value::from(codes::COVERAGE_LOW)));
}

/// Temperature rise of the first zone when its only device is a plain heater
/// covering `coverage_m2`, with no air exchange and no airflow minimum.
fn heater_rise(coverage_m2: f64) -> (f64, RecordingDiagnostics) {
    let mut world = idle_world("derate");
    edit_first_zone(&mut world, |zone| {
        let base = zone.devices[0].clone();
        zone.devices = vec![DeviceInstance {
            power_draw_w: 1_000.0,
            efficiency01: 0.0,
            duty_cycle01: 1.0,
            coverage_m2,
            airflow_m3_per_h: 0.0,
            effects: EffectConfigs {
                thermal: Some(ThermalConfig::default()),
                ..EffectConfigs::default()
            },
            ..base
        }];
    });
    let before = world.zones()[0].1.environment.air_temperature_c;
    let world = Arc::new(world);

    let mut config = SimulationConfig::default();
    config.capacity.min_ach = 0.0;
    let mut harness = Harness::default();
    let outcome = harness
        .tick(&mut Simulation::new(config).unwrap(), &world, TickInputs::default())
        .unwrap();
    let after = outcome.world.zones()[0].1.environment.air_temperature_c;
    (after - before, harness.diagnostics)
}

#[test]
fn half_covered_zone_gets_half_the_heat() {
    let (full, full_diagnostics) = heater_rise(40.0);
    let (half, half_diagnostics) = heater_rise(20.0);

    assert!(full > 0.0);
    assert!((half / full - 0.5).abs() < 1e-9, "full {full}, half {half}");
    assert!(!full_diagnostics.contains(codes::COVERAGE_LOW));
    assert!(half_diagnostics.contains(codes::COVERAGE_LOW));
}

#[test]
fn missing_irrigation_target_is_skipped_with_diagnostic() {
    let world = Arc::new(idle_world("missing"));
    let inputs = TickInputs {
        irrigation_events: vec![IrrigationEvent {
            target: IrrigationTarget::Zone(ZoneId::new()),
            water_l: 5.0,
            concentrations_mg_per_l: std::collections::BTreeMap::new(),
        }],
        ..TickInputs::default()
    };
    let mut harness = Harness::default();

    let outcome = harness.tick(&mut simulation(), &world, inputs).unwrap();

    assert!(harness.diagnostics.contains(codes::IRRIGATION_TARGET_MISSING));
    assert!(!outcome.mutated);
    assert!(outcome.summary.costs.water_m3.abs() < f64::EPSILON);
}

#[test]
fn harvest_ready_plants_become_lots() {
    let mut world = demo_world("harvest");
    edit_first_zone(&mut world, |zone| {
        zone.plants[0].stage = LifecycleStage::HarvestReady;
    });
    let harvested = world.zones()[0].1.plants[0].id;
    let world = Arc::new(world);

    let mut first = Harness::default();
    let a = first.tick(&mut simulation(), &world, TickInputs::default()).unwrap();
    let mut second = Harness::default();
    let b = second.tick(&mut simulation(), &world, TickInputs::default()).unwrap();

    assert_eq!(a.world.company.harvest_lots.len(), 1);
    assert_eq!(a.world.plant_count(), world.plant_count() - 1);
    assert!(a.world.find_plant_zone(harvested).is_none());
    assert_eq!(a.summary.throughput.harvest_lots_created, 1);

    let lot = &a.world.company.harvest_lots[0];
    assert_eq!(lot.zone_id, first_zone_id(&world));
    assert_eq!(lot.created_at_tick, 0);
    assert!(lot.fresh_weight_kg > 0.0);
    assert_eq!(lot.id, b.world.company.harvest_lots[0].id);
}

#[test]
fn demo_tick_is_reproducible() {
    let world = Arc::new(demo_world("repeat"));
    let mut first = Harness::default();
    let a = first.tick(&mut simulation(), &world, TickInputs::default()).unwrap();
    let mut second = Harness::default();
    let b = second.tick(&mut simulation(), &world, TickInputs::default()).unwrap();

    assert_eq!(world_hash(&a.world).unwrap(), world_hash(&b.world).unwrap());
    assert_eq!(a.summary, b.summary);
    assert_eq!(first.telemetry.events, second.telemetry.events);
    assert_eq!(first.diagnostics.diagnostics, second.diagnostics.diagnostics);
}
