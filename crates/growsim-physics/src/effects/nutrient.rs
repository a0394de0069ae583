//! Per-nutrient buffer dynamics.
//!
//! Each nutrient key is an independent ledger. Plants take up what they
//! demand from buffer plus inflow, a fraction of the remainder leaches out
//! with drainage, and the rest is kept up to the zone capacity. Mass above
//! capacity leaves as runoff.

use std::collections::{BTreeMap, BTreeSet};

use growsim_types::NutrientConfig;

use crate::error::PhysicsError;
use crate::psychrometrics::clamp01;

/// Mass per nutrient key, mg.
pub type NutrientMap = BTreeMap<String, f64>;

/// Inputs for [`update_buffer`].
#[derive(Debug, Clone, Copy)]
pub struct BufferInputs<'a> {
    /// Buffer at tick start.
    pub buffer_mg: &'a NutrientMap,
    /// Mass entering this tick (irrigation and dosing).
    pub inflow_mg: &'a NutrientMap,
    /// Plant demand this tick.
    pub demand_mg: &'a NutrientMap,
    /// Per-key capacity of the buffer, mg.
    pub capacity_mg: f64,
    /// Share of the post-uptake mass lost to drainage.
    pub leaching_fraction01: f64,
    /// Tick duration, hours.
    pub tick_hours: f64,
}

/// Outcome of one buffer update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferUpdate {
    /// Buffer after the tick.
    pub buffer_mg: NutrientMap,
    /// Mass taken up by plants.
    pub uptake_mg: NutrientMap,
    /// Mass lost to leaching.
    pub leached_mg: NutrientMap,
    /// Mass discarded because the buffer was full.
    pub runoff_mg: NutrientMap,
}

impl BufferUpdate {
    /// Total runoff across keys.
    pub fn total_runoff_mg(&self) -> f64 {
        self.runoff_mg.values().sum()
    }

    /// Uptake as a share of demand, per key; keys with no demand count as satisfied.
    pub fn satisfaction01(&self, demand_mg: &NutrientMap) -> f64 {
        let mut worst: f64 = 1.0;
        for (key, demand) in demand_mg {
            if *demand <= 0.0 {
                continue;
            }
            let got = self.uptake_mg.get(key).copied().unwrap_or(0.0);
            worst = worst.min(clamp01(got / demand));
        }
        worst
    }
}

fn value(map: &NutrientMap, key: &str) -> f64 {
    map.get(key).copied().unwrap_or(0.0).max(0.0)
}

/// Advance the buffer by one tick.
///
/// # Errors
///
/// [`PhysicsError::LeachingFractionOutOfRange`] if the leaching fraction
/// lies outside [0, 1].
pub fn update_buffer(inputs: &BufferInputs<'_>) -> Result<BufferUpdate, PhysicsError> {
    if !(0.0..=1.0).contains(&inputs.leaching_fraction01) {
        return Err(PhysicsError::LeachingFractionOutOfRange {
            value: inputs.leaching_fraction01,
        });
    }

    let keys: BTreeSet<&String> = inputs
        .buffer_mg
        .keys()
        .chain(inputs.inflow_mg.keys())
        .chain(inputs.demand_mg.keys())
        .collect();

    if inputs.tick_hours <= 0.0 {
        let zeros: NutrientMap = keys.iter().map(|k| ((*k).clone(), 0.0)).collect();
        return Ok(BufferUpdate {
            buffer_mg: inputs.buffer_mg.clone(),
            uptake_mg: zeros.clone(),
            leached_mg: zeros.clone(),
            runoff_mg: zeros,
        });
    }

    let capacity = inputs.capacity_mg.max(0.0);
    let mut update = BufferUpdate::default();
    for key in keys {
        let available = value(inputs.buffer_mg, key) + value(inputs.inflow_mg, key);
        let uptake = value(inputs.demand_mg, key).min(available);
        let remaining = available - uptake;
        let leached = remaining * inputs.leaching_fraction01;
        let kept = remaining - leached;
        let new = kept.clamp(0.0, capacity);

        update.buffer_mg.insert(key.clone(), new);
        update.uptake_mg.insert(key.clone(), uptake);
        update.leached_mg.insert(key.clone(), leached);
        update.runoff_mg.insert(key.clone(), (kept - new).max(0.0));
    }
    Ok(update)
}

/// Mass a dosing pump adds over a tick.
pub fn dosing_inflow(config: &NutrientConfig, duty_cycle01: f64, tick_hours: f64) -> NutrientMap {
    let duty = clamp01(duty_cycle01);
    if duty <= 0.0 || tick_hours <= 0.0 {
        return NutrientMap::new();
    }
    config
        .dosing_mg_per_h
        .iter()
        .map(|(key, rate)| (key.clone(), rate.max(0.0) * duty * tick_hours))
        .collect()
}

/// Add `other` into `into`, key by key.
pub fn merge_into(into: &mut NutrientMap, other: &NutrientMap) {
    for (key, mg) in other {
        *into.entry(key.clone()).or_insert(0.0) += mg;
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> NutrientMap {
        entries.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    fn run(
        buffer: &NutrientMap,
        inflow: &NutrientMap,
        demand: &NutrientMap,
        leach: f64,
        tick_hours: f64,
    ) -> Result<BufferUpdate, PhysicsError> {
        update_buffer(&BufferInputs {
            buffer_mg: buffer,
            inflow_mg: inflow,
            demand_mg: demand,
            capacity_mg: 1_000.0,
            leaching_fraction01: leach,
            tick_hours,
        })
    }

    #[test]
    fn uptake_is_bounded_by_availability() {
        let buffer = map(&[("n", 10.0)]);
        let inflow = map(&[("n", 5.0)]);
        let demand = map(&[("n", 100.0)]);
        let update = run(&buffer, &inflow, &demand, 0.1, 1.0).unwrap_or_default();
        assert_eq!(update.uptake_mg.get("n"), Some(&15.0));
        assert_eq!(update.buffer_mg.get("n"), Some(&0.0));
        assert!(update.satisfaction01(&demand) < 0.2);
    }

    #[test]
    fn leaching_and_balance_per_key() {
        let buffer = map(&[("n", 100.0), ("p", 50.0)]);
        let inflow = map(&[("n", 100.0), ("k", 20.0)]);
        let demand = map(&[("n", 50.0)]);
        let update = run(&buffer, &inflow, &demand, 0.25, 1.0).unwrap_or_default();

        // n: 200 available, 50 uptake, 150 left, 37.5 leached, 112.5 kept.
        assert_eq!(update.uptake_mg.get("n"), Some(&50.0));
        assert_eq!(update.leached_mg.get("n"), Some(&37.5));
        assert_eq!(update.buffer_mg.get("n"), Some(&112.5));
        // p and k are independent of n.
        assert_eq!(update.buffer_mg.get("p"), Some(&37.5));
        assert_eq!(update.buffer_mg.get("k"), Some(&15.0));
        assert_eq!(update.satisfaction01(&demand), 1.0);
    }

    #[test]
    fn buffer_is_clamped_to_capacity() {
        let buffer = map(&[("n", 900.0)]);
        let inflow = map(&[("n", 500.0)]);
        let update = run(&buffer, &inflow, &NutrientMap::new(), 0.0, 1.0).unwrap_or_default();
        assert_eq!(update.buffer_mg.get("n"), Some(&1_000.0));
        assert_eq!(update.total_runoff_mg(), 400.0);
    }

    #[test]
    fn leaching_out_of_range_is_an_error() {
        let empty = NutrientMap::new();
        for bad in [-0.01, 1.01, f64::NAN] {
            assert!(matches!(
                run(&empty, &empty, &empty, bad, 1.0),
                Err(PhysicsError::LeachingFractionOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn non_positive_tick_returns_zero_maps() {
        let buffer = map(&[("n", 10.0)]);
        let inflow = map(&[("n", 5.0)]);
        let demand = map(&[("n", 3.0)]);
        let update = run(&buffer, &inflow, &demand, 0.5, 0.0).unwrap_or_default();
        assert_eq!(update.buffer_mg, buffer);
        assert!(update.uptake_mg.values().all(|v| *v == 0.0));
        assert!(update.leached_mg.values().all(|v| *v == 0.0));
        assert!(update.runoff_mg.values().all(|v| *v == 0.0));
    }

    #[test]
    fn dosing_scales_with_duty_and_tick() {
        let config = NutrientConfig {
            dosing_mg_per_h: map(&[("n", 100.0)]),
        };
        let dose = dosing_inflow(&config, 0.5, 2.0);
        assert_eq!(dose.get("n"), Some(&100.0));
        assert!(dosing_inflow(&config, 0.0, 1.0).is_empty());
    }
}
