//! `ApplySensors`: read zone state before any actuator has changed it.
//!
//! Every sensor draws from its own stream, `sensor:{device_id}:{tick}`, so a
//! reading never depends on how many other sensors ran this tick.

use growsim_physics::effects::{measure, SensorInputs};
use growsim_physics::create_rng;
use growsim_types::{SensorMeasurement, SensorReading, World, ZoneEnvironment};

use crate::context::RunContext;
use crate::phases::TickScope;
use crate::tick::TickError;

const fn true_value(env: &ZoneEnvironment, measurement: SensorMeasurement) -> f64 {
    match measurement {
        SensorMeasurement::Temperature => env.air_temperature_c,
        SensorMeasurement::Humidity => env.relative_humidity01,
        SensorMeasurement::Co2 => env.co2_ppm,
        SensorMeasurement::Ppfd => env.ppfd_umol_m2s,
    }
}

pub(crate) fn run(scope: &TickScope<'_>, world: &World, ctx: &mut RunContext<'_>) -> Result<(), TickError> {
    for (_, zone) in world.zones() {
        for device in zone.devices.iter().filter(|d| d.is_active()) {
            let Some(sensor) = &device.effects.sensor else {
                continue;
            };
            let value = true_value(&zone.environment, sensor.measurement);
            let mut rng = create_rng(scope.seed, &format!("sensor:{}:{}", device.id, scope.tick));
            let measured = measure(
                &SensorInputs {
                    config: sensor,
                    true_value: value,
                    condition01: device.condition01,
                },
                Some(&mut rng),
            )
            .map_err(|source| TickError::physics(Some(zone.id), Some(device.id), source))?;

            ctx.runtime
                .sensor_readings
                .entry(zone.id)
                .or_default()
                .push(SensorReading {
                    device_id: device.id,
                    measurement: sensor.measurement,
                    measured_value: measured,
                    true_value: value,
                });
        }
    }
    Ok(())
}
