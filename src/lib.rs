//! Greenhouse controller library.
//!
//! Exposes the control core, the hardware abstraction and the operating
//! modes for the binary and for integration testing.  Real boards plug in
//! through the `embedded-hal` traits and the probe/ADC/CO2 traits in
//! [`sensors`]; host builds use [`adapters::sim`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod runner;
pub mod scheduler;
pub mod sensors;
