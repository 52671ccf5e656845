//! Actuator drivers.
//!
//! Each driver wraps one `embedded-hal` output line and remembers the last
//! level it commanded.  Nothing here decides *when* to switch; that is
//! the control policy's job.

use core::fmt;

pub mod relay;
pub mod valve;

/// The three controlled outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuator {
    Lamp,
    Fans,
    Valve,
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lamp => f.write_str("lamp"),
            Self::Fans => f.write_str("fans"),
            Self::Valve => f.write_str("valve"),
        }
    }
}
