//! System configuration parameters
//!
//! All tunable parameters for the greenhouse controller.  Values can be
//! overridden from a JSON file through [`ConfigPort`](crate::app::ports::ConfigPort);
//! anything missing from the file keeps its default.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins;

/// Threshold set consulted by the control policy.  Never mutated after
/// startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Raw ADC code of the retired analog light design.  The live light
    /// input is a digital comparator and does not consult this value.
    pub light: u16,
    /// Soil moisture, as a fraction of ADC full scale, at or above which
    /// the valve is pulsed.
    pub moisture: f32,
    /// Relative humidity (%) at or above which the fans run.
    pub humidity_pct: f32,
    /// Internal temperature (Celsius) at which venting starts.  The lamp
    /// is cut at this value plus [`Thresholds::LAMP_MARGIN_C`].
    pub temperature_c: f32,
}

impl Thresholds {
    /// Margin above `temperature_c` the lamp may keep heating up to.
    pub const LAMP_MARGIN_C: f32 = 2.0;

    /// Highest internal temperature at which the lamp may be on.
    pub fn lamp_cutoff_c(&self) -> f32 {
        self.temperature_c + Self::LAMP_MARGIN_C
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            light: 512,
            moisture: 512.0 / pins::ADC_FULL_SCALE as f32,
            humidity_pct: 70.0,
            temperature_c: 24.0,
        }
    }
}

/// Retry discipline for transient probe faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Wait between a transient fault and the next attempt.
    pub backoff_ms: u32,
    /// Total attempts allowed per probe read.  `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry forever with the given backoff.
    pub const fn unbounded(backoff_ms: u32) -> Self {
        Self {
            backoff_ms,
            max_attempts: None,
        }
    }

    /// Give up after `max_attempts` attempts.
    pub const fn bounded(backoff_ms: u32, max_attempts: u32) -> Self {
        Self {
            backoff_ms,
            max_attempts: Some(max_attempts),
        }
    }

    /// Whether another attempt may follow `attempts` failed ones.
    pub fn allows_another(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(2000)
    }
}

/// What the outer loop does when a tick ends in a fatal fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Stop the run and return the error to the caller.
    #[default]
    Abort,
    /// Log the error, report it, and carry on with the next tick.
    SkipTick,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Control ---
    pub thresholds: Thresholds,
    pub retry: RetryPolicy,
    pub fault_policy: FaultPolicy,
    /// Run the watering decision each tick.  Off by default: the valve
    /// does not open at the supply pressure of the current install.
    pub watering_enabled: bool,
    /// Valve pulse length for an automatic watering (milliseconds).
    pub watering_pulse_ms: u32,

    // --- Timing ---
    /// Sleep between control ticks in run and control-test modes.
    pub control_interval_ms: u32,
    /// Sleep between samples in the heating and ventilation tests.
    pub test_interval_ms: u32,
    /// Length of the active phase in run mode (seconds).
    pub active_period_secs: u32,
    /// Length of the standby phase in run mode (seconds).
    pub standby_period_secs: u32,
    /// Length of each test mode (seconds).
    pub test_duration_secs: u32,
    /// Print a sensor snapshot every N control ticks in run mode.
    pub display_every_ticks: u32,

    // --- Manual operation ---
    /// How long a manual lamp/fan toggle keeps the actuator on (seconds).
    pub manual_toggle_secs: u32,
    /// Manual valve pulse length (milliseconds).
    pub manual_valve_ms: u32,

    // --- Output ---
    /// Directory the test-mode CSV logs are written to.
    pub log_dir: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            retry: RetryPolicy::default(),
            fault_policy: FaultPolicy::Abort,
            watering_enabled: false,
            watering_pulse_ms: 3000,

            control_interval_ms: 5000,
            test_interval_ms: 2000,
            active_period_secs: 12 * 60 * 60,
            standby_period_secs: 12 * 60 * 60,
            test_duration_secs: 30 * 60,
            display_every_ticks: 10,

            manual_toggle_secs: 10,
            manual_valve_ms: 2000,

            log_dir: String::from("."),
        }
    }
}

impl SystemConfig {
    /// Reject values that would make the controller misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !(0.0..=1.0).contains(&t.moisture) {
            return Err(ConfigError::ValidationFailed(
                "thresholds.moisture must be a fraction in [0, 1]",
            ));
        }
        if !(0.0..=100.0).contains(&t.humidity_pct) {
            return Err(ConfigError::ValidationFailed(
                "thresholds.humidity_pct must be in [0, 100]",
            ));
        }
        if !(-40.0..=80.0).contains(&t.temperature_c) {
            return Err(ConfigError::ValidationFailed(
                "thresholds.temperature_c must be in [-40, 80]",
            ));
        }
        if t.light >= pins::ADC_FULL_SCALE {
            return Err(ConfigError::ValidationFailed(
                "thresholds.light exceeds the ADC range",
            ));
        }
        if self.retry.backoff_ms == 0 {
            return Err(ConfigError::ValidationFailed("retry.backoff_ms must be > 0"));
        }
        if self.retry.max_attempts == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "retry.max_attempts must allow at least one attempt",
            ));
        }
        if self.control_interval_ms == 0 || self.test_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("loop intervals must be > 0"));
        }
        if self.active_period_secs == 0 || self.test_duration_secs == 0 {
            return Err(ConfigError::ValidationFailed("run durations must be > 0"));
        }
        if self.display_every_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "display_every_ticks must be > 0",
            ));
        }
        if self.watering_pulse_ms == 0 || self.manual_valve_ms == 0 {
            return Err(ConfigError::ValidationFailed("valve pulses must be > 0"));
        }
        Ok(())
    }

    pub fn control_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.control_interval_ms))
    }

    pub fn test_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.test_interval_ms))
    }

    pub fn watering_pulse(&self) -> Duration {
        Duration::from_millis(u64::from(self.watering_pulse_ms))
    }

    pub fn active_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.active_period_secs))
    }

    pub fn standby_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.standby_period_secs))
    }

    pub fn test_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.test_duration_secs))
    }
}
