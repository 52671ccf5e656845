//! Unified error types for the greenhouse controller.
//!
//! A single `Error` enum that every subsystem converts into, so the outer
//! control loop handles every failure the same way.  Variants are `Copy`
//! so they can be handed to event sinks and fault policies without
//! allocation.
//!
//! Transient probe faults never appear here: they are absorbed by the
//! retry loop in [`crate::sensors::probe`].

use core::fmt;

use crate::app::ports::ConfigError;
use crate::drivers::Actuator;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.  Always fatal for the current tick.
    Sensor(SensorError),
    /// An actuator output line could not be driven.
    Actuator(ActuatorError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// A sample log could not be written.
    Record(RecordError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Record(e) => write!(f, "record: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Physical temperature/humidity probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeId {
    /// Outside the enclosure.
    External,
    /// First probe inside the enclosure.
    Internal1,
    /// Second probe inside the enclosure.
    Internal2,
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External => write!(f, "external probe"),
            Self::Internal1 => write!(f, "internal probe 1"),
            Self::Internal2 => write!(f, "internal probe 2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Non-transient probe failure.  The probe has been released.
    ProbeFault { probe: ProbeId, reason: &'static str },
    /// Transient faults kept coming past the configured retry bound.
    RetriesExhausted { probe: ProbeId, attempts: u32 },
    /// CO2 bus read failed (line-level retries already happened below us).
    Co2ReadFailed(&'static str),
    /// Digital input line could not be read.
    GpioReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbeFault { probe, reason } => write!(f, "{probe} failed: {reason}"),
            Self::RetriesExhausted { probe, attempts } => {
                write!(f, "{probe} still faulting after {attempts} attempts")
            }
            Self::Co2ReadFailed(reason) => write!(f, "CO2 read failed: {reason}"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed(Actuator),
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed(which) => write!(f, "{which} GPIO write failed"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Record errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Log file could not be created or truncated.
    Create(std::io::ErrorKind),
    /// A row could not be appended.
    Write(std::io::ErrorKind),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(kind) => write!(f, "cannot create log: {kind}"),
            Self::Write(kind) => write!(f, "cannot append to log: {kind}"),
        }
    }
}

impl std::error::Error for RecordError {}

impl From<RecordError> for Error {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
