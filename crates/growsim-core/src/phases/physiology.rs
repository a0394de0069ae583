//! `AdvancePhysiology`: age, grow, stress, and stage plants.
//!
//! Plants see the environment as it stands after this tick's balance and
//! irrigation. Growth is light-driven:
//!
//! `Δbiomass = LUE × DLI_tick × canopy × f(T) × health × stage × strain × water`
//!
//! where `canopy` is the floor area per plant capped at
//! `max_canopy_m2_per_plant`, and `water` is the share of the canopy's water
//! demand the substrate could supply. Stage transitions are forward-only and
//! take at most one step per tick.

use growsim_physics::effects::dli_increment_mol_m2;
use growsim_physics::{clamp01, vapor_pressure_deficit_kpa};
use growsim_types::{
    codes, Diagnostic, LifecycleStage, PhotoperiodPhase, Plant, World, Zone, ZonePath,
};

use crate::config::{PhysiologyConfig, StrainProfile};
use crate::context::RunContext;
use crate::phases::TickScope;

/// Temperature response: 1 inside the optimal band, falling linearly to 0
/// at the stress limits.
fn temperature_factor(config: &PhysiologyConfig, temperature_c: f64) -> f64 {
    if temperature_c < config.optimal_temperature_min_c {
        let span = config.optimal_temperature_min_c - config.stress_temperature_min_c;
        if span <= 0.0 {
            return 0.0;
        }
        clamp01((temperature_c - config.stress_temperature_min_c) / span)
    } else if temperature_c > config.optimal_temperature_max_c {
        let span = config.stress_temperature_max_c - config.optimal_temperature_max_c;
        if span <= 0.0 {
            return 0.0;
        }
        clamp01((config.stress_temperature_max_c - temperature_c) / span)
    } else {
        1.0
    }
}

const fn stage_factor(stage: LifecycleStage) -> f64 {
    match stage {
        LifecycleStage::Seedling => 0.2,
        LifecycleStage::Vegetative => 0.7,
        LifecycleStage::Flowering => 1.0,
        LifecycleStage::HarvestReady => 0.0,
    }
}

/// The stage a plant moves to this tick, if any.
fn next_stage(plant: &Plant, profile: &StrainProfile, photoperiod: PhotoperiodPhase) -> Option<LifecycleStage> {
    let due = match plant.stage {
        LifecycleStage::Seedling => plant.stage_age_hours >= profile.seedling_hours,
        LifecycleStage::Vegetative => {
            photoperiod == PhotoperiodPhase::Flowering
                && plant.stage_age_hours >= profile.vegetative_min_hours
        }
        LifecycleStage::Flowering => plant.stage_age_hours >= profile.flowering_hours,
        LifecycleStage::HarvestReady => false,
    };
    if due { plant.stage.next() } else { None }
}

/// Shared per-zone conditions for one tick.
struct ZoneConditions {
    temperature_factor: f64,
    stressed: bool,
    light_mol_m2: f64,
    canopy_m2: f64,
    water_factor: f64,
}

fn zone_conditions(scope: &TickScope<'_>, zone: &Zone, satisfaction01: f64) -> (ZoneConditions, f64) {
    let config = &scope.config.physiology;
    let env = &zone.environment;
    let temperature = env.air_temperature_c;
    let vpd = vapor_pressure_deficit_kpa(temperature, env.relative_humidity01);

    let temperature_stress = temperature < config.stress_temperature_min_c
        || temperature > config.stress_temperature_max_c;
    let vpd_stress = vpd < config.vpd_min_kpa || vpd > config.vpd_max_kpa;
    let nutrient_stress = satisfaction01 < config.nutrient_stress_threshold01;

    // Lossless for any realistic plant count.
    #[allow(clippy::cast_precision_loss)]
    let plants = zone.plants.len().max(1) as f64;
    let canopy_m2 = (zone.floor_area_m2 / plants).min(config.max_canopy_m2_per_plant).max(0.0);

    let water_need_l = zone.canopy_biomass_g() / 1000.0 * config.water_use_l_per_kg_h * scope.hours;
    let available_l = zone.substrate_water_l.max(0.0);
    let water_factor = if water_need_l > 0.0 {
        clamp01(available_l / water_need_l)
    } else {
        1.0
    };
    let remaining_l = (available_l - water_need_l).max(0.0);

    let conditions = ZoneConditions {
        temperature_factor: temperature_factor(config, temperature),
        stressed: temperature_stress || vpd_stress || nutrient_stress || water_factor < 1.0,
        light_mol_m2: dli_increment_mol_m2(env.ppfd_umol_m2s, scope.hours),
        canopy_m2,
        water_factor,
    };
    (conditions, remaining_l)
}

pub(crate) fn run(scope: &TickScope<'_>, world: &mut World, ctx: &mut RunContext<'_>) {
    let config = &scope.config.physiology;
    let hours = scope.hours;
    let paths: Vec<ZonePath> = world
        .zones()
        .into_iter()
        .filter(|(_, zone)| !zone.plants.is_empty())
        .map(|(path, _)| path)
        .collect();

    for path in paths {
        let Some(zone) = world.zone_at(path) else {
            continue;
        };
        let satisfaction = ctx.runtime.nutrient_satisfaction.get(&zone.id).copied().unwrap_or(1.0);
        let (conditions, remaining_water_l) = zone_conditions(scope, zone, satisfaction);

        let mut updated = zone.clone();
        updated.substrate_water_l = remaining_water_l;
        for plant in &mut updated.plants {
            let (profile, known) = scope.config.strain(&plant.strain_id);
            if !known {
                ctx.diagnose(
                    Diagnostic::zone_warning(
                        codes::STRAIN_MISSING,
                        updated.id,
                        format!("strain {:?} is not in the catalog; using the default profile", plant.strain_id),
                    )
                    .with_plant(plant.id),
                );
            }

            plant.age_hours += hours;
            plant.stage_age_hours += hours;

            let growth = config.light_use_efficiency_g_per_mol
                * conditions.light_mol_m2
                * conditions.canopy_m2
                * conditions.temperature_factor
                * plant.health01
                * stage_factor(plant.stage)
                * profile.growth_multiplier
                * conditions.water_factor;
            plant.biomass_g += growth.max(0.0);

            let health_delta = if conditions.stressed {
                -config.stress_per_hour * hours
            } else {
                config.recovery_per_hour * hours
            };
            plant.health01 = clamp01(plant.health01 + health_delta);

            if let Some(stage) = next_stage(plant, &profile, updated.photoperiod_phase) {
                tracing::debug!(
                    plant_id = %plant.id,
                    from = ?plant.stage,
                    to = ?stage,
                    age_hours = plant.age_hours,
                    "Plant advanced stage"
                );
                plant.stage = stage;
                plant.stage_age_hours = 0.0;
            }
        }

        let zone_id = updated.id;
        world.replace_zone(path, updated);
        ctx.mark_zone_updated(zone_id);
    }
}

#[cfg(test)]
mod tests {
    use growsim_types::PlantId;

    use super::*;

    fn plant(stage: LifecycleStage, stage_age_hours: f64) -> Plant {
        Plant {
            id: PlantId::new(),
            strain_id: "og-kush".to_owned(),
            stage,
            age_hours: stage_age_hours,
            stage_age_hours,
            health01: 1.0,
            biomass_g: 10.0,
        }
    }

    #[test]
    fn temperature_factor_is_one_in_band_and_zero_past_limits() {
        let config = PhysiologyConfig::default();
        assert!((temperature_factor(&config, 25.0) - 1.0).abs() < 1e-12);
        assert!((temperature_factor(&config, 20.0) - 0.5).abs() < 1e-12);
        assert!(temperature_factor(&config, 35.0).abs() < 1e-12);
        assert!(temperature_factor(&config, 10.0).abs() < 1e-12);
    }

    #[test]
    fn vegetative_plants_wait_for_flowering_photoperiod() {
        let profile = StrainProfile::default();
        let veg = plant(LifecycleStage::Vegetative, profile.vegetative_min_hours + 1.0);
        assert_eq!(next_stage(&veg, &profile, PhotoperiodPhase::Vegetative), None);
        assert_eq!(
            next_stage(&veg, &profile, PhotoperiodPhase::Flowering),
            Some(LifecycleStage::Flowering)
        );
    }

    #[test]
    fn stages_only_move_forward() {
        let profile = StrainProfile::default();
        let seedling = plant(LifecycleStage::Seedling, profile.seedling_hours);
        assert_eq!(
            next_stage(&seedling, &profile, PhotoperiodPhase::Flowering),
            Some(LifecycleStage::Vegetative)
        );
        let ready = plant(LifecycleStage::HarvestReady, 10_000.0);
        assert_eq!(next_stage(&ready, &profile, PhotoperiodPhase::Flowering), None);
    }
}
