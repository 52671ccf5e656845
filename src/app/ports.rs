//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService / ControlPolicy (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, event sinks, clocks, sample logs)
//! implement these traits.  The domain consumes them via generics, so the
//! decision logic never touches hardware directly and every operating mode
//! can run against fakes.

use core::fmt;
use core::time::Duration;

use crate::config::SystemConfig;
use crate::control::context::AmbientLight;
use crate::error::{ActuatorError, RecordError, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one operation per measured quantity.
///
/// Transient faults are retried inside the implementation and never reach
/// the caller.  Any `Err` returned here is fatal for the current tick.
pub trait SensorPort {
    /// Outside air temperature (Celsius).
    fn read_external_temperature(&mut self) -> Result<f32, SensorError>;

    /// Mean of the two internal probes (Celsius), rounded to 2 decimals.
    fn read_internal_temperature(&mut self) -> Result<f32, SensorError>;

    /// Mean of the two internal probes (%RH), rounded to 2 decimals.
    fn read_humidity(&mut self) -> Result<f32, SensorError>;

    /// CO2 concentration (ppm).  No retry at this layer.
    fn read_co2(&mut self) -> Result<u16, SensorError>;

    /// Whether the enclosure is dark enough to need the lamp.
    fn read_ambient_light(&mut self) -> Result<AmbientLight, SensorError>;

    /// Soil moisture as a fraction of ADC full scale.  The analog front end
    /// has no fault signalling, so this read cannot fail.
    fn read_soil_moisture(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port.  Every on/off call drives the output line, even when
/// the stored state already matches.
pub trait ActuatorPort {
    fn turn_lamp_on(&mut self) -> Result<(), ActuatorError>;

    fn turn_lamp_off(&mut self) -> Result<(), ActuatorError>;

    fn turn_fans_on(&mut self) -> Result<(), ActuatorError>;

    fn turn_fans_off(&mut self) -> Result<(), ActuatorError>;

    /// Open the valve, block for `duration`, close it.
    fn pulse_valve(&mut self, duration: Duration) -> Result<(), ActuatorError>;

    /// Last commanded lamp state (no hardware readback exists).
    fn lamp_state(&self) -> bool;

    /// Last commanded fan state.
    fn fan_state(&self) -> bool;

    /// Lamp and fans off, for shutdown and standby.
    fn all_off(&mut self) -> Result<(), ActuatorError> {
        self.turn_lamp_off()?;
        self.turn_fans_off()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / display)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ config file)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before handing a config out or writing
/// one.  Invalid ranges are rejected with
/// [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`SystemConfig::default()`] if no
    /// stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock / fake clock)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source plus the inter-tick sleep.
pub trait ClockPort {
    /// Time elapsed since the clock was created.
    fn elapsed(&self) -> Duration;

    /// Block the control loop.
    fn sleep(&mut self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Record port (driven adapter: domain → flat sample logs)
// ───────────────────────────────────────────────────────────────

/// Destination for per-sample test data.
pub trait RecordSink {
    /// Start a fresh log named `name`, discarding previous contents, and
    /// write the header row.
    fn begin(&mut self, name: &str, header: &[&str]) -> Result<(), RecordError>;

    /// Append one row to the log opened by the last `begin`.
    fn append(&mut self, fields: &[String]) -> Result<(), RecordError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config could not be deserialised.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
