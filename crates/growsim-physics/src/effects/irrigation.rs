//! Irrigation service: resolves this tick's events for one zone.

use growsim_types::IrrigationEvent;

use crate::effects::nutrient::{merge_into, update_buffer, BufferInputs, BufferUpdate, NutrientMap};
use crate::error::PhysicsError;

/// Zone state the irrigation service needs.
#[derive(Debug, Clone, Copy)]
pub struct IrrigationInputs<'a> {
    /// Events targeting this zone (directly or via one of its plants).
    pub events: &'a [&'a IrrigationEvent],
    /// Extra nutrient inflow from dosing pumps.
    pub dosing_mg: &'a NutrientMap,
    /// Plant nutrient demand.
    pub demand_mg: &'a NutrientMap,
    /// Nutrient buffer at tick start.
    pub buffer_mg: &'a NutrientMap,
    /// Per-key nutrient capacity, mg.
    pub nutrient_capacity_mg: f64,
    /// Substrate water at tick start, L.
    pub substrate_water_l: f64,
    /// Substrate water capacity, L.
    pub substrate_capacity_l: f64,
    /// Leaching fraction.
    pub leaching_fraction01: f64,
    /// Tick duration, hours.
    pub tick_hours: f64,
}

/// Resolved irrigation for one zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrrigationOutcome {
    /// Water requested by all events, L.
    pub water_requested_l: f64,
    /// Water retained by the substrate, L.
    pub water_retained_l: f64,
    /// Water that drained past a full substrate, L.
    pub water_drained_l: f64,
    /// Substrate water after irrigation, L.
    pub substrate_water_l: f64,
    /// Nutrient mass delivered by the events.
    pub delivered_mg: NutrientMap,
    /// Buffer dynamics.
    pub buffer: BufferUpdate,
}

/// Sum the events, fill the substrate, and run the nutrient buffer.
///
/// # Errors
///
/// Propagates [`PhysicsError::LeachingFractionOutOfRange`] from the buffer.
pub fn resolve_zone_irrigation(inputs: &IrrigationInputs<'_>) -> Result<IrrigationOutcome, PhysicsError> {
    let mut water_requested_l = 0.0;
    let mut delivered_mg = NutrientMap::new();
    for event in inputs.events {
        let litres = event.water_l.max(0.0);
        water_requested_l += litres;
        for (key, mg_per_l) in &event.concentrations_mg_per_l {
            *delivered_mg.entry(key.clone()).or_insert(0.0) += litres * mg_per_l.max(0.0);
        }
    }

    let capacity_l = inputs.substrate_capacity_l.max(0.0);
    let start_l = inputs.substrate_water_l.clamp(0.0, capacity_l);
    let water_retained_l = water_requested_l.min(capacity_l - start_l);

    let mut inflow = delivered_mg.clone();
    merge_into(&mut inflow, inputs.dosing_mg);

    let buffer = update_buffer(&BufferInputs {
        buffer_mg: inputs.buffer_mg,
        inflow_mg: &inflow,
        demand_mg: inputs.demand_mg,
        capacity_mg: inputs.nutrient_capacity_mg,
        leaching_fraction01: inputs.leaching_fraction01,
        tick_hours: inputs.tick_hours,
    })?;

    Ok(IrrigationOutcome {
        water_requested_l,
        water_retained_l,
        water_drained_l: water_requested_l - water_retained_l,
        substrate_water_l: start_l + water_retained_l,
        delivered_mg,
        buffer,
    })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use std::collections::BTreeMap;

    use growsim_types::{IrrigationTarget, ZoneId};

    use super::*;

    fn event(zone: ZoneId, litres: f64, n_mg_per_l: f64) -> IrrigationEvent {
        IrrigationEvent {
            target: IrrigationTarget::Zone(zone),
            water_l: litres,
            concentrations_mg_per_l: BTreeMap::from([("n".to_owned(), n_mg_per_l)]),
        }
    }

    fn inputs<'a>(events: &'a [&'a IrrigationEvent], empty: &'a NutrientMap) -> IrrigationInputs<'a> {
        IrrigationInputs {
            events,
            dosing_mg: empty,
            demand_mg: empty,
            buffer_mg: empty,
            nutrient_capacity_mg: 1_000_000.0,
            substrate_water_l: 10.0,
            substrate_capacity_l: 50.0,
            leaching_fraction01: 0.0,
            tick_hours: 1.0,
        }
    }

    #[test]
    fn events_are_summed() {
        let zone = ZoneId::new();
        let a = event(zone, 10.0, 100.0);
        let b = event(zone, 5.0, 200.0);
        let events = [&a, &b];
        let empty = NutrientMap::new();
        let outcome = resolve_zone_irrigation(&inputs(&events, &empty)).unwrap_or_default();
        assert_eq!(outcome.water_requested_l, 15.0);
        assert_eq!(outcome.delivered_mg.get("n"), Some(&2_000.0));
        assert_eq!(outcome.buffer.buffer_mg.get("n"), Some(&2_000.0));
        assert_eq!(outcome.substrate_water_l, 25.0);
    }

    #[test]
    fn substrate_overflow_drains() {
        let zone = ZoneId::new();
        let a = event(zone, 100.0, 0.0);
        let events = [&a];
        let empty = NutrientMap::new();
        let outcome = resolve_zone_irrigation(&inputs(&events, &empty)).unwrap_or_default();
        assert_eq!(outcome.water_retained_l, 40.0);
        assert_eq!(outcome.water_drained_l, 60.0);
        assert_eq!(outcome.substrate_water_l, 50.0);
    }

    #[test]
    fn no_events_still_runs_buffer() {
        let empty = NutrientMap::new();
        let outcome = resolve_zone_irrigation(&inputs(&[], &empty)).unwrap_or_default();
        assert_eq!(outcome.water_requested_l, 0.0);
        assert!(outcome.delivered_mg.is_empty());
        assert_eq!(outcome.substrate_water_l, 10.0);
    }

    #[test]
    fn bad_leaching_propagates() {
        let empty = NutrientMap::new();
        let case = IrrigationInputs {
            leaching_fraction01: 2.0,
            ..inputs(&[], &empty)
        };
        assert!(resolve_zone_irrigation(&case).is_err());
    }
}
