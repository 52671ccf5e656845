//! Solenoid water valve driver.
//!
//! The valve is momentary: it is opened, held for a fixed time, and
//! closed again.  The pulse blocks the caller for its whole length.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::drivers::Actuator;
use crate::error::ActuatorError;

pub struct ValveDriver<P, D> {
    pin: P,
    delay: D,
    pulses: u32,
}

impl<P: OutputPin, D: DelayNs> ValveDriver<P, D> {
    /// Wrap the valve line and drive it low, so the valve starts closed.
    pub fn new(mut pin: P, delay: D) -> Result<Self, ActuatorError> {
        pin.set_low()
            .map_err(|_| ActuatorError::GpioWriteFailed(Actuator::Valve))?;
        Ok(Self {
            pin,
            delay,
            pulses: 0,
        })
    }

    /// Open, hold for `duration`, close.
    ///
    /// If the open command fails the valve is left alone.  If the close
    /// command fails the error is returned and the valve may still be
    /// open.
    pub fn pulse(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        self.pin
            .set_high()
            .map_err(|_| ActuatorError::GpioWriteFailed(Actuator::Valve))?;
        info!("valve open for {} ms", duration.as_millis());

        let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        self.delay.delay_ms(ms);

        if self.pin.set_low().is_err() {
            warn!("valve close failed; valve may still be open");
            return Err(ActuatorError::GpioWriteFailed(Actuator::Valve));
        }
        self.pulses = self.pulses.wrapping_add(1);
        Ok(())
    }

    /// Completed pulses since start-up.
    pub fn pulse_count(&self) -> u32 {
        self.pulses
    }
}
