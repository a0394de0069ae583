//! `UpdateEnvironment`: apply the aggregated deltas to each zone's air.
//!
//! A zone is replaced only when its air state actually changed. Each
//! replaced zone queues one `zone.snapshot` event.

use growsim_physics::{apply_zone_balance, vapor_pressure_deficit_kpa, BalanceInputs, CropLoad, PhysicsError};
use growsim_types::{topics, World, ZoneEnvironment, ZonePath, ZoneSnapshot};

use crate::context::RunContext;
use crate::phases::TickScope;
use crate::tick::TickError;

fn first_non_finite(env: &ZoneEnvironment) -> Option<&'static str> {
    [
        ("air_temperature_c", env.air_temperature_c),
        ("relative_humidity01", env.relative_humidity01),
        ("co2_ppm", env.co2_ppm),
        ("ppfd_umol_m2s", env.ppfd_umol_m2s),
        ("dli_mol_m2", env.dli_mol_m2),
    ]
    .into_iter()
    .find_map(|(field, value)| (!value.is_finite()).then_some(field))
}

pub(crate) fn run(scope: &TickScope<'_>, world: &mut World, ctx: &mut RunContext<'_>) -> Result<(), TickError> {
    let physiology = &scope.config.physiology;
    let reset_dli = scope.clock.is_day_start(scope.sim_time_hours, scope.hours);
    let paths: Vec<ZonePath> = world.zones().into_iter().map(|(path, _)| path).collect();

    for path in paths {
        let Some(zone) = world.zone_at(path) else {
            continue;
        };
        let deltas = ctx.runtime.zone_deltas.get(&zone.id).copied().unwrap_or_default();
        let crop = CropLoad {
            biomass_kg: zone.canopy_biomass_g() / 1000.0,
            lights_on: ctx.runtime.lights_on.get(&zone.id).copied().unwrap_or(false),
            co2_uptake_ppm_per_kg_h: physiology.co2_uptake_ppm_per_kg_h,
            transpiration_g_per_kg_h: physiology.transpiration_g_per_kg_h,
        };
        let env = apply_zone_balance(&BalanceInputs {
            environment: &zone.environment,
            deltas: &deltas,
            ambient: &scope.config.ambient,
            crop: &crop,
            air_mass_kg: zone.air_mass_kg(),
            tick_hours: scope.hours,
            reset_dli,
        });
        if let Some(field) = first_non_finite(&env) {
            return Err(TickError::physics(Some(zone.id), None, PhysicsError::NonFinite { field }));
        }
        if env == zone.environment {
            continue;
        }

        let zone_id = zone.id;
        let snapshot = ZoneSnapshot {
            zone_id,
            sim_time_hours: scope.end_time_hours(),
            temperature_c: env.air_temperature_c,
            relative_humidity01: env.relative_humidity01,
            co2_ppm: env.co2_ppm,
            vpd_kpa: vapor_pressure_deficit_kpa(env.air_temperature_c, env.relative_humidity01),
            ppfd_umol_m2s: env.ppfd_umol_m2s,
            dli_mol_m2: env.dli_mol_m2,
            ach: deltas.ach,
            sensor_readings: ctx.runtime.sensor_readings.get(&zone_id).cloned().unwrap_or_default(),
            warnings: ctx.runtime.zone_warnings.get(&zone_id).cloned().unwrap_or_default(),
        };

        let mut updated = zone.clone();
        updated.environment = env;
        world.replace_zone(path, updated);
        ctx.mark_zone_updated(zone_id);
        ctx.publish(topics::ZONE_SNAPSHOT, &snapshot)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_fields_are_named() {
        let mut env = ZoneEnvironment::default();
        assert_eq!(first_non_finite(&env), None);
        env.co2_ppm = f64::NAN;
        assert_eq!(first_non_finite(&env), Some("co2_ppm"));
    }
}
