//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the control policy and the tick counter.  It
//! exposes a hardware-agnostic API; all I/O flows through port traits
//! injected at call sites.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService        │
//! ActuatorPort ◀──│  lighting · vent · water│
//!                 └────────────────────────┘
//! ```

use log::{debug, warn};

use crate::config::SystemConfig;
use crate::control::context::{ActuatorState, ControlContext};
use crate::control::policy::ControlPolicy;
use crate::drivers::Actuator;
use crate::error::Result;

use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    policy: ControlPolicy,
    watering_enabled: bool,
    tick_count: u64,
}

impl AppService {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            policy: ControlPolicy::new(config.thresholds, config.watering_pulse()),
            watering_enabled: config.watering_enabled,
            tick_count: 0,
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: lighting, then ventilation, then (if
    /// enabled) watering.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    ///
    /// A fatal fault stops the tick where it happened.  Commands already
    /// issued stay in effect, and the error is reported to `sink` and
    /// returned.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> Result<ControlContext> {
        self.tick_count += 1;
        let mut ctx = ControlContext::new(self.tick_count);
        let before = actuator_state(hw);

        let outcome = self.run_decisions(hw, &mut ctx);

        ctx.actuators = actuator_state(hw);
        emit_changes(before, ctx.actuators, sink);
        if ctx.watered {
            sink.emit(&AppEvent::ValvePulsed(self.policy.watering_pulse()));
        }

        match outcome {
            Ok(()) => {
                debug!("tick {} complete: {:?}", ctx.tick, ctx.actuators);
                sink.emit(&AppEvent::TickCompleted(ctx.clone()));
                Ok(ctx)
            }
            Err(error) => {
                warn!("tick {} aborted: {}", ctx.tick, error);
                sink.emit(&AppEvent::TickFailed {
                    tick: ctx.tick,
                    error,
                });
                Err(error)
            }
        }
    }

    fn run_decisions(
        &self,
        hw: &mut (impl SensorPort + ActuatorPort),
        ctx: &mut ControlContext,
    ) -> Result<()> {
        self.policy.control_lighting(hw, ctx)?;
        self.policy.control_ventilation(hw, ctx)?;
        if self.watering_enabled {
            self.policy.control_watering(hw, ctx)?;
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Read every quantity once and combine with the actuator states.
    pub fn telemetry(&self, hw: &mut (impl SensorPort + ActuatorPort)) -> Result<TelemetryData> {
        Ok(TelemetryData {
            external_temp_c: hw.read_external_temperature()?,
            internal_temp_c: hw.read_internal_temperature()?,
            humidity_pct: hw.read_humidity()?,
            co2_ppm: hw.read_co2()?,
            light_state: hw.read_ambient_light()?.code(),
            soil_moisture_pct: hw.read_soil_moisture() * 100.0,
            lamp_on: hw.lamp_state(),
            fans_on: hw.fan_state(),
        })
    }

    /// Total control ticks attempted since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

// ── Internal ──────────────────────────────────────────────────

fn actuator_state(hw: &impl ActuatorPort) -> ActuatorState {
    ActuatorState {
        lamp_on: hw.lamp_state(),
        fans_on: hw.fan_state(),
    }
}

fn emit_changes(before: ActuatorState, after: ActuatorState, sink: &mut impl EventSink) {
    if before.lamp_on != after.lamp_on {
        sink.emit(&AppEvent::ActuatorChanged {
            actuator: Actuator::Lamp,
            on: after.lamp_on,
        });
    }
    if before.fans_on != after.fans_on {
        sink.emit(&AppEvent::ActuatorChanged {
            actuator: Actuator::Fans,
            on: after.fans_on,
        });
    }
}
