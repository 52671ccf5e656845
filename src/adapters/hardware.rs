//! Hardware adapter: bridges peripherals to domain port traits.
//!
//! Owns the sensor side (normally a [`SensorHub`](crate::sensors::SensorHub))
//! and all actuator drivers, exposing them through [`SensorPort`] and
//! [`ActuatorPort`].  Whether the lines underneath are real GPIO or the
//! simulated greenhouse is decided by whoever builds the adapter.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::control::context::AmbientLight;
use crate::drivers::relay::RelayDriver;
use crate::drivers::valve::ValveDriver;
use crate::error::{ActuatorError, SensorError};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S, L, F, V, D> {
    sensors: S,
    lamp: RelayDriver<L>,
    fans: RelayDriver<F>,
    valve: ValveDriver<V, D>,
}

impl<S, L, F, V, D> HardwareAdapter<S, L, F, V, D>
where
    S: SensorPort,
    L: OutputPin,
    F: OutputPin,
    V: OutputPin,
    D: DelayNs,
{
    pub fn new(
        sensors: S,
        lamp: RelayDriver<L>,
        fans: RelayDriver<F>,
        valve: ValveDriver<V, D>,
    ) -> Self {
        Self {
            sensors,
            lamp,
            fans,
            valve,
        }
    }

    pub fn valve_pulses(&self) -> u32 {
        self.valve.pulse_count()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<S, L, F, V, D> SensorPort for HardwareAdapter<S, L, F, V, D>
where
    S: SensorPort,
{
    fn read_external_temperature(&mut self) -> Result<f32, SensorError> {
        self.sensors.read_external_temperature()
    }

    fn read_internal_temperature(&mut self) -> Result<f32, SensorError> {
        self.sensors.read_internal_temperature()
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.sensors.read_humidity()
    }

    fn read_co2(&mut self) -> Result<u16, SensorError> {
        self.sensors.read_co2()
    }

    fn read_ambient_light(&mut self) -> Result<AmbientLight, SensorError> {
        self.sensors.read_ambient_light()
    }

    fn read_soil_moisture(&mut self) -> f32 {
        self.sensors.read_soil_moisture()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<S, L, F, V, D> ActuatorPort for HardwareAdapter<S, L, F, V, D>
where
    L: OutputPin,
    F: OutputPin,
    V: OutputPin,
    D: DelayNs,
{
    fn turn_lamp_on(&mut self) -> Result<(), ActuatorError> {
        self.lamp.on()
    }

    fn turn_lamp_off(&mut self) -> Result<(), ActuatorError> {
        self.lamp.off()
    }

    fn turn_fans_on(&mut self) -> Result<(), ActuatorError> {
        self.fans.on()
    }

    fn turn_fans_off(&mut self) -> Result<(), ActuatorError> {
        self.fans.off()
    }

    fn pulse_valve(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        self.valve.pulse(duration)
    }

    fn lamp_state(&self) -> bool {
        self.lamp.is_on()
    }

    fn fan_state(&self) -> bool {
        self.fans.is_on()
    }
}
