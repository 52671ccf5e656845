//! Application core: pure domain logic, zero I/O.
//!
//! The greenhouse rules live in [`crate::control`]; this layer sequences
//! them into ticks and reports what happened.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
