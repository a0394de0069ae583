//! `ApplyDeviceEffects`: sum per-device effects into zone deltas.
//!
//! Devices are evaluated in insertion order, except that devices with a
//! thermal setpoint go last so they condition against the temperature the
//! other devices already produced. Thermal and humidity contributions are
//! scaled by the zone's capacity derate. Nothing here touches the world;
//! deltas are handed to `UpdateEnvironment` through the run context.

use growsim_physics::effects::nutrient::merge_into;
use growsim_physics::effects::{
    co2_injection, dosing_inflow, humidity_effect, lighting_ppfd, thermal_effect, Co2Inputs,
    HumidityInputs, LightingInputs, NutrientMap, ThermalInputs,
};
use growsim_physics::{aggregate_zone, clamp01, ZoneDeltas};
use growsim_types::{DeviceInstance, World, Zone};

use crate::context::RunContext;
use crate::phases::TickScope;
use crate::tick::TickError;

pub(crate) fn run(scope: &TickScope<'_>, world: &World, ctx: &mut RunContext<'_>) -> Result<(), TickError> {
    for (_, zone) in world.zones() {
        apply_zone(scope, zone, ctx)?;
    }

    // Structure and room devices draw power and wear, but do not act on zone air.
    for structure in &world.company.structures {
        account_devices(scope, &structure.devices, ctx)?;
        for room in &structure.rooms {
            account_devices(scope, &room.devices, ctx)?;
        }
    }
    Ok(())
}

fn has_setpoint(device: &DeviceInstance) -> bool {
    device
        .effects
        .thermal
        .as_ref()
        .is_some_and(|t| t.setpoint_c.is_some())
}

fn apply_zone(scope: &TickScope<'_>, zone: &Zone, ctx: &mut RunContext<'_>) -> Result<(), TickError> {
    let hours = scope.hours;
    let capacity = aggregate_zone(zone, &scope.config.capacity, hours);
    let derate = capacity.derate();
    for diagnostic in &capacity.diagnostics {
        ctx.diagnose(diagnostic.clone());
    }

    let hour_of_day = scope.clock.hour_of_day(scope.sim_time_hours);
    let lights_on = zone.light_schedule.is_on(hour_of_day);
    let air_mass_kg = zone.air_mass_kg();
    let env = &zone.environment;

    let mut deltas = ZoneDeltas {
        ach: capacity.ach,
        exchange_ach: capacity.exchange_ach,
        ..ZoneDeltas::default()
    };
    let mut dosing = NutrientMap::new();

    let ordered = zone
        .devices
        .iter()
        .filter(|d| !has_setpoint(d))
        .chain(zone.devices.iter().filter(|d| has_setpoint(d)));

    for device in ordered.filter(|d| d.is_active()) {
        let effects = &device.effects;
        let mut duty = clamp01(device.duty_cycle01);
        let mut energy_kwh = None;

        if let Some(lighting) = &effects.lighting {
            if lights_on {
                deltas.ppfd_umol_m2s += lighting_ppfd(&LightingInputs {
                    ppfd_umol_m2s: lighting.ppfd_umol_m2s,
                    duty_cycle01: duty,
                    coverage_m2: device.coverage_m2,
                    zone_area_m2: zone.floor_area_m2,
                    lights_on,
                });
            } else {
                duty = 0.0;
            }
        }

        if let Some(co2) = &effects.co2 {
            let effect = co2_injection(&Co2Inputs {
                config: co2,
                current_ppm: env.co2_ppm + deltas.co2_ppm,
                max_duty01: duty,
                power_draw_w: device.power_draw_w,
                tick_hours: hours,
            });
            deltas.co2_ppm += effect.delta_ppm;
            duty = effect.effective_duty01;
            energy_kwh = Some(effect.energy_kwh);
        }

        if let Some(thermal) = &effects.thermal {
            let effect = thermal_effect(&ThermalInputs {
                config: thermal,
                power_draw_w: device.power_draw_w,
                efficiency01: device.efficiency01,
                duty_cycle01: duty,
                air_mass_kg,
                current_temperature_c: env.air_temperature_c + deltas.temperature_c,
                tick_hours: hours,
            })
            .map_err(|source| TickError::physics(Some(zone.id), Some(device.id), source))?;
            deltas.temperature_c += effect.total_delta_c() * derate;
        }

        if let Some(humidity) = &effects.humidity {
            let effect = humidity_effect(&HumidityInputs {
                config: humidity,
                duty_cycle01: duty,
                air_mass_kg,
                temperature_c: env.air_temperature_c + deltas.temperature_c,
                current_rh01: env.relative_humidity01 + deltas.humidity01,
                tick_hours: hours,
            });
            deltas.humidity01 += effect.delta_rh01 * derate;
        }

        if let Some(nutrient) = &effects.nutrient {
            merge_into(&mut dosing, &dosing_inflow(nutrient, duty, hours));
        }

        let kwh = energy_kwh.unwrap_or_else(|| device.power_draw_w.max(0.0) * duty * hours / 1000.0);
        ctx.record_energy(device.id, kwh)?;
        record_operation(ctx, device, duty * hours);
    }

    tracing::trace!(
        zone_id = %zone.id,
        lights_on,
        derate,
        d_temperature_c = deltas.temperature_c,
        d_co2_ppm = deltas.co2_ppm,
        "Zone deltas aggregated"
    );

    let runtime = &mut ctx.runtime;
    runtime.lights_on.insert(zone.id, lights_on);
    runtime.zone_deltas.insert(zone.id, deltas);
    runtime.capacities.insert(zone.id, capacity);
    if !dosing.is_empty() {
        runtime.dosing_mg.insert(zone.id, dosing);
    }
    Ok(())
}

fn account_devices(
    scope: &TickScope<'_>,
    devices: &[DeviceInstance],
    ctx: &mut RunContext<'_>,
) -> Result<(), TickError> {
    for device in devices.iter().filter(|d| d.is_active()) {
        let duty = clamp01(device.duty_cycle01);
        ctx.record_energy(device.id, device.power_draw_w.max(0.0) * duty * scope.hours / 1000.0)?;
        record_operation(ctx, device, duty * scope.hours);
    }
    Ok(())
}

fn record_operation(ctx: &mut RunContext<'_>, device: &DeviceInstance, operating_hours: f64) {
    let throughput = &mut ctx.runtime.throughput;
    throughput.devices_active = throughput.devices_active.saturating_add(1);
    if operating_hours > 0.0 {
        *ctx.runtime.operating_hours.entry(device.id).or_insert(0.0) += operating_hours;
    }
}
