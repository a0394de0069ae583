//! `CommitAndTelemetry`: wear devices, advance time, publish.
//!
//! Devices lose `wear_per_hour` condition per operating hour. Time and the
//! tick counter advance only when something in the world changed; otherwise
//! the input snapshot is handed back untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use growsim_types::{
    codes, topics, CostBreakdown, DeviceId, DeviceInstance, Diagnostic, TickCompleted, World,
    ZoneId, ZonePath,
};

use crate::clock::SimClock;
use crate::context::RunContext;
use crate::phases::TickScope;
use crate::tick::{TickError, TickOutcome};

/// The condition a device wears down to this tick, if it changes at all.
fn worn_condition(device: &DeviceInstance, hours: &BTreeMap<DeviceId, f64>, wear_per_hour: f64) -> Option<f64> {
    let operated = hours.get(&device.id).copied()?;
    let next = (device.condition01 - wear_per_hour.max(0.0) * operated).max(0.0);
    (next.to_bits() != device.condition01.to_bits()).then_some(next)
}

/// Wear one device; returns a diagnostic if it just crossed the warning level.
fn wear(
    device: &mut DeviceInstance,
    hours: &BTreeMap<DeviceId, f64>,
    scope: &TickScope<'_>,
    zone_id: Option<ZoneId>,
) -> Option<Diagnostic> {
    let wear = &scope.config.devices;
    let next = worn_condition(device, hours, wear.wear_per_hour)?;
    let before = device.condition01;
    device.condition01 = next;

    let threshold = wear.low_condition_warn01;
    (before >= threshold && device.condition01 < threshold).then(|| {
        let message = format!(
            "device {:?} condition {:.3} is below {threshold:.2}",
            device.name, device.condition01
        );
        match zone_id {
            Some(zone_id) => Diagnostic::zone_warning(codes::DEVICE_CONDITION_LOW, zone_id, message),
            None => Diagnostic::warning(codes::DEVICE_CONDITION_LOW, message),
        }
        .with_device(device.id)
    })
}

fn wear_all(
    devices: &mut [DeviceInstance],
    hours: &BTreeMap<DeviceId, f64>,
    scope: &TickScope<'_>,
    zone_id: Option<ZoneId>,
) -> Vec<Diagnostic> {
    devices
        .iter_mut()
        .filter_map(|device| wear(device, hours, scope, zone_id))
        .collect()
}

fn wears(devices: &[DeviceInstance], hours: &BTreeMap<DeviceId, f64>, wear_per_hour: f64) -> bool {
    devices
        .iter()
        .any(|d| worn_condition(d, hours, wear_per_hour).is_some())
}

/// Apply wear everywhere; returns whether any device condition changed.
fn apply_wear(scope: &TickScope<'_>, world: &mut World, ctx: &mut RunContext<'_>) -> bool {
    let hours = std::mem::take(&mut ctx.runtime.operating_hours);
    if hours.is_empty() {
        return false;
    }
    let rate = scope.config.devices.wear_per_hour;
    let mut diagnostics = Vec::new();

    let zone_paths: Vec<ZonePath> = world
        .zones()
        .into_iter()
        .filter(|(_, zone)| wears(&zone.devices, &hours, rate))
        .map(|(path, _)| path)
        .collect();
    let mut changed = !zone_paths.is_empty();
    for path in zone_paths {
        let Some(zone) = world.zone_at(path) else {
            continue;
        };
        let mut updated = zone.clone();
        diagnostics.extend(wear_all(&mut updated.devices, &hours, scope, Some(updated.id)));
        world.replace_zone(path, updated);
    }

    let mut room_paths = Vec::new();
    let mut structure_paths = Vec::new();
    for (s_idx, structure) in world.company.structures.iter().enumerate() {
        if wears(&structure.devices, &hours, rate) {
            structure_paths.push(s_idx);
        }
        for (r_idx, room) in structure.rooms.iter().enumerate() {
            if wears(&room.devices, &hours, rate) {
                room_paths.push((s_idx, r_idx));
            }
        }
    }
    changed = changed || !structure_paths.is_empty() || !room_paths.is_empty();
    for s_idx in structure_paths {
        if let Some(devices) = world.structure_devices_mut(s_idx) {
            diagnostics.extend(wear_all(devices, &hours, scope, None));
        }
    }
    for (s_idx, r_idx) in room_paths {
        if let Some(devices) = world.room_devices_mut(s_idx, r_idx) {
            diagnostics.extend(wear_all(devices, &hours, scope, None));
        }
    }

    for diagnostic in diagnostics {
        ctx.diagnose(diagnostic);
    }
    changed
}

pub(crate) fn run(
    scope: &TickScope<'_>,
    world: &Arc<World>,
    mut next: World,
    costs: CostBreakdown,
    ctx: &mut RunContext<'_>,
) -> Result<TickOutcome, TickError> {
    if apply_wear(scope, &mut next, ctx) {
        ctx.runtime.mutated = true;
    }

    let mutated = ctx.runtime.mutated;
    let committed = if mutated {
        next.tick = SimClock::next_tick(world.tick)?;
        next.sim_time_hours = scope.end_time_hours();
        Arc::new(next)
    } else {
        Arc::clone(world)
    };

    ctx.runtime.throughput.plants = u32::try_from(committed.plant_count()).unwrap_or(u32::MAX);
    let summary = TickCompleted {
        tick: committed.tick,
        sim_time_hours: committed.sim_time_hours,
        mutated,
        throughput: ctx.runtime.throughput,
        costs: costs.clone(),
    };
    ctx.publish(topics::TICK_COMPLETED, &summary)?;
    ctx.flush(costs);

    Ok(TickOutcome {
        world: committed,
        mutated,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    #[test]
    fn wear_warns_once_when_crossing_threshold() {
        let config = SimulationConfig::default();
        let clock = SimClock::default();
        let scope = TickScope {
            config: &config,
            clock: &clock,
            seed: "wear",
            tick: 0,
            sim_time_hours: 0.0,
            hours: 1.0,
        };
        let world = crate::fixture::demo_world("wear");
        let Some((_, zone)) = world.zones().into_iter().next() else {
            panic!("demo world has zones");
        };
        let Some(mut device) = zone.devices.first().cloned() else {
            panic!("demo zone has devices");
        };
        let threshold = config.devices.low_condition_warn01;
        device.condition01 = threshold + config.devices.wear_per_hour * 0.5;

        let mut hours = BTreeMap::new();
        hours.insert(device.id, 1.0);
        let first = wear(&mut device, &hours, &scope, Some(zone.id));
        assert!(first.is_some_and(|d| d.code == codes::DEVICE_CONDITION_LOW));
        assert!(device.condition01 < threshold);

        let second = wear(&mut device, &hours, &scope, Some(zone.id));
        assert!(second.is_none());
    }

    #[test]
    fn idle_devices_do_not_wear() {
        let config = SimulationConfig::default();
        let clock = SimClock::default();
        let scope = TickScope {
            config: &config,
            clock: &clock,
            seed: "wear",
            tick: 0,
            sim_time_hours: 0.0,
            hours: 1.0,
        };
        let world = crate::fixture::demo_world("wear");
        let Some(mut device) = world.zones().first().and_then(|(_, z)| z.devices.first().cloned()) else {
            panic!("demo zone has devices");
        };
        let before = device.condition01;
        assert!(wear(&mut device, &BTreeMap::new(), &scope, None).is_none());
        assert!((device.condition01 - before).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_wear_rate_changes_nothing() {
        let world = crate::fixture::demo_world("wear");
        let Some(device) = world.zones().first().and_then(|(_, z)| z.devices.first().cloned()) else {
            panic!("demo zone has devices");
        };
        let mut hours = BTreeMap::new();
        hours.insert(device.id, 1.0);
        assert!(worn_condition(&device, &hours, 0.0).is_none());
        assert!(!wears(std::slice::from_ref(&device), &hours, 0.0));
        assert!(wears(std::slice::from_ref(&device), &hours, 0.001));
    }
}
