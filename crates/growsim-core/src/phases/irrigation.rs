//! `ApplyIrrigationAndNutrients`: resolve events and dosing per zone.
//!
//! Events are grouped by the zone they reach; a plant target resolves to
//! the zone holding the plant. A zone runs its buffer only when it has
//! events, dosing, or plants drawing on it. Water is billed on the volume
//! requested, including what drains out of a full substrate.

use std::collections::BTreeMap;

use growsim_physics::effects::{resolve_zone_irrigation, IrrigationInputs, NutrientMap};
use growsim_types::{
    codes, Diagnostic, IrrigationEvent, IrrigationTarget, World, ZoneId, ZonePath,
};

use crate::context::RunContext;
use crate::phases::TickScope;
use crate::tick::TickError;

fn group_events(world: &World, events: &[IrrigationEvent], ctx: &mut RunContext<'_>) -> BTreeMap<ZoneId, Vec<IrrigationEvent>> {
    let mut grouped: BTreeMap<ZoneId, Vec<IrrigationEvent>> = BTreeMap::new();
    for event in events {
        let resolved = match event.target {
            IrrigationTarget::Zone(zone_id) => world.find_zone(zone_id).map(|_| zone_id),
            IrrigationTarget::Plant(plant_id) => world
                .find_plant_zone(plant_id)
                .and_then(|path| world.zone_at(path))
                .map(|zone| zone.id),
        };
        if let Some(zone_id) = resolved {
            grouped.entry(zone_id).or_default().push(event.clone());
        } else {
            let mut diagnostic = Diagnostic::warning(
                codes::IRRIGATION_TARGET_MISSING,
                format!("irrigation target {:?} does not exist; event skipped", event.target),
            );
            match event.target {
                IrrigationTarget::Zone(zone_id) => diagnostic.zone_id = Some(zone_id),
                IrrigationTarget::Plant(plant_id) => diagnostic.plant_id = Some(plant_id),
            }
            ctx.diagnose(diagnostic);
        }
    }
    grouped
}

pub(crate) fn run(scope: &TickScope<'_>, world: &mut World, ctx: &mut RunContext<'_>) -> Result<(), TickError> {
    let events = ctx.inputs().irrigation_events.clone();
    let grouped = group_events(world, &events, ctx);
    let irrigation = &scope.config.irrigation;
    let paths: Vec<ZonePath> = world.zones().into_iter().map(|(path, _)| path).collect();

    for path in paths {
        let Some(zone) = world.zone_at(path) else {
            continue;
        };
        let zone_events: Vec<&IrrigationEvent> = grouped.get(&zone.id).map(|v| v.iter().collect()).unwrap_or_default();
        let dosing = ctx.runtime.dosing_mg.get(&zone.id).cloned().unwrap_or_default();
        if zone_events.is_empty() && dosing.is_empty() && zone.plants.is_empty() {
            continue;
        }

        let biomass_g = zone.canopy_biomass_g();
        let demand: NutrientMap = irrigation
            .nutrient_demand_mg_per_g_h
            .iter()
            .map(|(key, rate)| (key.clone(), rate.max(0.0) * biomass_g * scope.hours))
            .collect();

        let outcome = resolve_zone_irrigation(&IrrigationInputs {
            events: &zone_events,
            dosing_mg: &dosing,
            demand_mg: &demand,
            buffer_mg: &zone.nutrient_buffer_mg,
            nutrient_capacity_mg: zone.nutrient_capacity_mg,
            substrate_water_l: zone.substrate_water_l,
            substrate_capacity_l: zone.substrate_capacity_l,
            leaching_fraction01: irrigation.leaching_fraction01,
            tick_hours: scope.hours,
        })
        .map_err(|source| TickError::physics(Some(zone.id), None, source))?;

        let zone_id = zone.id;
        ctx.record_water(zone_id, outcome.water_requested_l / 1000.0)?;
        ctx.runtime
            .nutrient_satisfaction
            .insert(zone_id, outcome.buffer.satisfaction01(&demand));

        let runoff = outcome.buffer.total_runoff_mg();
        if runoff > 0.0 {
            ctx.diagnose(Diagnostic::zone_warning(
                codes::NUTRIENT_RUNOFF,
                zone_id,
                format!("{runoff:.1} mg of nutrients overflowed the buffer"),
            ));
        }

        let changed = outcome.buffer.buffer_mg != zone.nutrient_buffer_mg
            || outcome.substrate_water_l.to_bits() != zone.substrate_water_l.to_bits();
        if changed {
            let mut updated = zone.clone();
            updated.nutrient_buffer_mg = outcome.buffer.buffer_mg;
            updated.substrate_water_l = outcome.substrate_water_l;
            world.replace_zone(path, updated);
            ctx.mark_zone_updated(zone_id);
        }

        if !zone_events.is_empty() {
            let count = u32::try_from(zone_events.len()).unwrap_or(u32::MAX);
            let throughput = &mut ctx.runtime.throughput;
            throughput.irrigation_events = throughput.irrigation_events.saturating_add(count);
            ctx.runtime.mutated = true;
            tracing::debug!(
                zone_id = %zone_id,
                events = count,
                water_l = outcome.water_requested_l,
                drained_l = outcome.water_drained_l,
                "Irrigation applied"
            );
        }
    }
    Ok(())
}
