//! On/off relay driver for the grow lamp and the exhaust fans.
//!
//! The output line is driven on *every* call, even when the remembered
//! state already matches.  A relay that dropped out on its own (brown-out,
//! loose wire) is therefore re-asserted on the next control tick.
//!
//! The stored state is the last *successfully* commanded level.  There is
//! no readback from the relay contacts.

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::drivers::Actuator;
use crate::error::ActuatorError;

pub struct RelayDriver<P> {
    which: Actuator,
    pin: P,
    on: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Wrap an output line and drive it low, so the relay starts off.
    pub fn new(which: Actuator, mut pin: P) -> Result<Self, ActuatorError> {
        pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed(which))?;
        Ok(Self {
            which,
            pin,
            on: false,
        })
    }

    pub fn on(&mut self) -> Result<(), ActuatorError> {
        self.drive(true)
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.drive(false)
    }

    fn drive(&mut self, on: bool) -> Result<(), ActuatorError> {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if res.is_err() {
            warn!("{}: GPIO write failed, keeping state {}", self.which, self.on);
            return Err(ActuatorError::GpioWriteFailed(self.which));
        }
        if self.on != on {
            debug!("{} -> {}", self.which, if on { "ON" } else { "OFF" });
        }
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
