//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) and the mode runner emit
//! these through the [`EventSink`](super::ports::EventSink) port.  Adapters
//! on the other side decide what to do with them.

use core::time::Duration;

use crate::control::context::ControlContext;
use crate::drivers::Actuator;
use crate::error::Error;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Full sensor snapshot for display.
    Telemetry(TelemetryData),

    /// A control tick completed.
    TickCompleted(ControlContext),

    /// A control tick was abandoned because of a fatal fault.
    TickFailed { tick: u64, error: Error },

    /// A mode's sample (telemetry snapshot or log row) was lost to a
    /// fault.  `sample` is the mode's 0-based sample index.
    SampleFailed { sample: u64, error: Error },

    /// An actuator changed logical state.
    ActuatorChanged { actuator: Actuator, on: bool },

    /// The valve was pulsed.
    ValvePulsed(Duration),

    /// Run mode entered its active phase.
    ActivePhaseStarted { cycle: u32 },

    /// Run mode entered standby; actuators are off.
    StandbyStarted { cycle: u32 },

    /// An operating mode started.
    ModeStarted(&'static str),

    /// An operating mode finished.
    ModeFinished { mode: &'static str, samples: u32 },

    /// Manual toggle countdown, seconds remaining.
    Countdown(u32),
}

/// A point-in-time snapshot of every quantity, suitable for display or a
/// sample log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub external_temp_c: f32,
    pub internal_temp_c: f32,
    pub humidity_pct: f32,
    pub co2_ppm: u16,
    /// 1 = dark, 0 = bright.
    pub light_state: u8,
    /// Soil moisture as a percentage of ADC full scale.
    pub soil_moisture_pct: f32,
    pub lamp_on: bool,
    pub fans_on: bool,
}
