//! Digital ambient-light input (LDR behind a comparator).

use embedded_hal::digital::InputPin;

use crate::control::context::AmbientLight;
use crate::error::SensorError;

pub struct LightSensor<P> {
    pin: P,
}

impl<P: InputPin> LightSensor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// LOW is dark, HIGH is bright.
    pub fn read(&mut self) -> Result<AmbientLight, SensorError> {
        let high = self.pin.is_high().map_err(|_| SensorError::GpioReadFailed)?;
        Ok(AmbientLight::from_line(high))
    }
}
