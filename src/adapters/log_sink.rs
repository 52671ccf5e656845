//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade.  The binary routes those records to the
//! terminal; a display panel or network uplink would implement the same
//! trait.

use log::{debug, info, warn};

use crate::app::events::{AppEvent, TelemetryData};
use crate::app::ports::EventSink;
use crate::control::context::ControlContext;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => info!("{}", format_telemetry(t)),
            AppEvent::TickCompleted(ctx) => debug!("{}", format_tick(ctx)),
            AppEvent::TickFailed { tick, error } => {
                warn!("TICK  | #{} failed: {}", tick, error);
            }
            AppEvent::SampleFailed { sample, error } => {
                warn!("SAMPLE| #{} skipped: {}", sample, error);
            }
            AppEvent::ActuatorChanged { actuator, on } => {
                info!("ACT   | {} -> {}", actuator, on_off(*on));
            }
            AppEvent::ValvePulsed(d) => {
                info!("ACT   | valve pulsed {} ms", d.as_millis());
            }
            AppEvent::ActivePhaseStarted { cycle } => {
                info!("RUN   | cycle {} active phase", cycle);
            }
            AppEvent::StandbyStarted { cycle } => {
                info!("RUN   | cycle {} standby, actuators off", cycle);
            }
            AppEvent::ModeStarted(mode) => info!("MODE  | {} started", mode),
            AppEvent::ModeFinished { mode, samples } => {
                info!("MODE  | {} finished after {} samples", mode, samples);
            }
            AppEvent::Countdown(secs) => info!("MODE  | {} s remaining", secs),
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

/// One-line tick summary with every reading the decisions took.
pub fn format_tick(ctx: &ControlContext) -> String {
    let readings: Vec<String> = ctx.readings.iter().map(ToString::to_string).collect();
    format!(
        "TICK  | #{} | lamp={} fans={} watered={} | {}",
        ctx.tick,
        on_off(ctx.actuators.lamp_on),
        on_off(ctx.actuators.fans_on),
        ctx.watered,
        readings.join(", "),
    )
}

/// One-line sensor snapshot.
pub fn format_telemetry(t: &TelemetryData) -> String {
    format!(
        "TELEM | ext={:.2}\u{00b0}C int={:.2}\u{00b0}C RH={:.2}% CO2={}ppm \
         dark={} soil={:.1}% | lamp={} fans={}",
        t.external_temp_c,
        t.internal_temp_c,
        t.humidity_pct,
        t.co2_ppm,
        t.light_state,
        t.soil_moisture_pct,
        on_off(t.lamp_on),
        on_off(t.fans_on),
    )
}
