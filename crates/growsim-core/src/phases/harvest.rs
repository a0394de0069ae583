//! `ApplyHarvestAndInventory`: turn harvest-ready plants into lots.

use std::sync::Arc;

use growsim_physics::{clamp01, create_rng};
use growsim_types::{HarvestLot, HarvestLotId, LifecycleStage, Plant, World, ZoneId, ZonePath};

use crate::context::RunContext;
use crate::phases::TickScope;

fn lot_for(scope: &TickScope<'_>, zone_id: ZoneId, plant: &Plant) -> HarvestLot {
    let (profile, _) = scope.config.strain(&plant.strain_id);
    let mut rng = create_rng(scope.seed, &format!("harvest:{}", plant.id));
    HarvestLot {
        id: HarvestLotId::from_random_bytes(rng.next_bytes16()),
        zone_id,
        strain_id: plant.strain_id.clone(),
        fresh_weight_kg: plant.biomass_g.max(0.0) / 1000.0 * clamp01(profile.harvest_index01),
        moisture01: clamp01(scope.config.harvest.moisture01),
        quality01: clamp01(plant.health01),
        created_at_tick: scope.tick,
    }
}

pub(crate) fn run(scope: &TickScope<'_>, world: &mut World, ctx: &mut RunContext<'_>) {
    if !scope.config.harvest.auto_harvest {
        return;
    }
    let paths: Vec<ZonePath> = world
        .zones()
        .into_iter()
        .filter(|(_, zone)| zone.plants.iter().any(|p| p.stage == LifecycleStage::HarvestReady))
        .map(|(path, _)| path)
        .collect();

    for path in paths {
        let Some(zone) = world.zone_at(path) else {
            continue;
        };
        let mut updated = zone.clone();
        let (ready, growing): (Vec<Plant>, Vec<Plant>) = std::mem::take(&mut updated.plants)
            .into_iter()
            .partition(|p| p.stage == LifecycleStage::HarvestReady);
        updated.plants = growing;

        let zone_id = updated.id;
        let lots: Vec<HarvestLot> = ready.iter().map(|plant| lot_for(scope, zone_id, plant)).collect();
        for lot in &lots {
            tracing::info!(
                lot_id = %lot.id,
                zone_id = %zone_id,
                strain = %lot.strain_id,
                fresh_weight_kg = lot.fresh_weight_kg,
                quality = lot.quality01,
                "Harvest lot created"
            );
        }

        let created = u32::try_from(lots.len()).unwrap_or(u32::MAX);
        world.company.harvest_lots.extend(lots.into_iter().map(Arc::new));
        world.replace_zone(path, updated);
        ctx.mark_zone_updated(zone_id);
        let throughput = &mut ctx.runtime.throughput;
        throughput.harvest_lots_created = throughput.harvest_lots_created.saturating_add(created);
    }
}
