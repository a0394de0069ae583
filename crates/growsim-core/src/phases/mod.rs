//! The phases of the tick pipeline.
//!
//! Each phase is a free function over the tick's [`TickScope`], the working
//! copy of the world, and the run context. Phases communicate only through
//! the run context.

pub(crate) mod commit;
pub(crate) mod device_effects;
pub(crate) mod economy;
pub(crate) mod environment;
pub(crate) mod harvest;
pub(crate) mod irrigation;
pub(crate) mod physiology;
pub(crate) mod sensors;

use growsim_types::{DeviceInstance, World};

use crate::clock::SimClock;
use crate::config::SimulationConfig;

/// Read-only facts about the tick being executed.
pub(crate) struct TickScope<'a> {
    /// Active configuration.
    pub(crate) config: &'a SimulationConfig,
    /// Calendar.
    pub(crate) clock: &'a SimClock,
    /// World seed; every RNG stream derives from it.
    pub(crate) seed: &'a str,
    /// Tick counter of the input world.
    pub(crate) tick: u64,
    /// Simulated hours at the start of the tick.
    pub(crate) sim_time_hours: f64,
    /// Tick duration, hours.
    pub(crate) hours: f64,
}

impl TickScope<'_> {
    /// Simulated hours once this tick commits as a mutating tick.
    pub(crate) fn end_time_hours(&self) -> f64 {
        self.sim_time_hours + self.hours
    }
}

/// Every installed device, structure level first, then rooms, then zones.
pub(crate) fn all_devices(world: &World) -> Vec<&DeviceInstance> {
    let mut out = Vec::new();
    for structure in &world.company.structures {
        out.extend(structure.devices.iter());
        for room in &structure.rooms {
            out.extend(room.devices.iter());
            for zone in &room.zones {
                out.extend(zone.devices.iter());
            }
        }
    }
    out
}
