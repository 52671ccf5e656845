//! Mock adapters for integration tests.
//!
//! `MockHardware` records every actuator call and every sensor read so
//! tests can assert on the full history without any GPIO.  The rest are
//! fakes for the clock, the sample log, the event sink and the
//! `embedded-hal` lines under the real drivers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};

use greenhouse::app::events::AppEvent;
use greenhouse::app::ports::{ActuatorPort, ClockPort, EventSink, RecordSink, SensorPort};
use greenhouse::control::context::{AmbientLight, SensorKind};
use greenhouse::drivers::Actuator;
use greenhouse::error::{ActuatorError, RecordError, SensorError};
use greenhouse::sensors::probe::{ClimateProbe, ProbeFault};
use greenhouse::sensors::soil::AdcReader;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    LampOn,
    LampOff,
    FansOn,
    FansOff,
    PulseValve(Duration),
}

// ── MockHardware ──────────────────────────────────────────────

/// Environment the mock reports.
#[derive(Debug, Clone, Copy)]
pub struct MockEnv {
    pub external_c: f32,
    pub internal_c: f32,
    pub humidity_pct: f32,
    pub co2_ppm: u16,
    pub light: AmbientLight,
    pub soil: f32,
}

impl Default for MockEnv {
    fn default() -> Self {
        Self {
            external_c: 18.0,
            internal_c: 21.0,
            humidity_pct: 55.0,
            co2_ppm: 480,
            light: AmbientLight::Bright,
            soil: 0.25,
        }
    }
}

pub struct MockHardware {
    pub env: MockEnv,
    pub calls: Vec<ActuatorCall>,
    pub reads: Vec<SensorKind>,
    /// Reads of this kind succeed `skip` more times, then fail with this
    /// error `remaining` more times.
    fail: Option<(SensorKind, SensorError, u32, u32)>,
    /// Writes to this actuator fail.
    pub broken: Option<Actuator>,
    lamp: bool,
    fans: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(env: MockEnv) -> Self {
        Self {
            env,
            calls: Vec::new(),
            reads: Vec::new(),
            fail: None,
            broken: None,
            lamp: false,
            fans: false,
        }
    }

    pub fn fail_reads(&mut self, kind: SensorKind, err: SensorError, times: u32) {
        self.fail_reads_after(kind, err, 0, times);
    }

    pub fn fail_reads_after(&mut self, kind: SensorKind, err: SensorError, skip: u32, times: u32) {
        self.fail = Some((kind, err, skip, times));
    }

    pub fn last_call(&self) -> Option<&ActuatorCall> {
        self.calls.last()
    }

    pub fn count(&self, call: &ActuatorCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    fn read(&mut self, kind: SensorKind) -> Result<(), SensorError> {
        self.reads.push(kind);
        if let Some((k, err, skip, remaining)) = self.fail.as_mut() {
            if *k == kind {
                if *skip > 0 {
                    *skip -= 1;
                } else if *remaining > 0 {
                    *remaining -= 1;
                    return Err(*err);
                }
            }
        }
        Ok(())
    }

    fn write(&mut self, which: Actuator, call: ActuatorCall) -> Result<(), ActuatorError> {
        if self.broken == Some(which) {
            return Err(ActuatorError::GpioWriteFailed(which));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl SensorPort for MockHardware {
    fn read_external_temperature(&mut self) -> Result<f32, SensorError> {
        self.read(SensorKind::ExternalTemperature)?;
        Ok(self.env.external_c)
    }

    fn read_internal_temperature(&mut self) -> Result<f32, SensorError> {
        self.read(SensorKind::InternalTemperature)?;
        Ok(self.env.internal_c)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.read(SensorKind::Humidity)?;
        Ok(self.env.humidity_pct)
    }

    fn read_co2(&mut self) -> Result<u16, SensorError> {
        self.read(SensorKind::Co2)?;
        Ok(self.env.co2_ppm)
    }

    fn read_ambient_light(&mut self) -> Result<AmbientLight, SensorError> {
        self.read(SensorKind::AmbientLight)?;
        Ok(self.env.light)
    }

    fn read_soil_moisture(&mut self) -> f32 {
        self.reads.push(SensorKind::SoilMoisture);
        self.env.soil
    }
}

impl ActuatorPort for MockHardware {
    fn turn_lamp_on(&mut self) -> Result<(), ActuatorError> {
        self.write(Actuator::Lamp, ActuatorCall::LampOn)?;
        self.lamp = true;
        Ok(())
    }

    fn turn_lamp_off(&mut self) -> Result<(), ActuatorError> {
        self.write(Actuator::Lamp, ActuatorCall::LampOff)?;
        self.lamp = false;
        Ok(())
    }

    fn turn_fans_on(&mut self) -> Result<(), ActuatorError> {
        self.write(Actuator::Fans, ActuatorCall::FansOn)?;
        self.fans = true;
        Ok(())
    }

    fn turn_fans_off(&mut self) -> Result<(), ActuatorError> {
        self.write(Actuator::Fans, ActuatorCall::FansOff)?;
        self.fans = false;
        Ok(())
    }

    fn pulse_valve(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        self.write(Actuator::Valve, ActuatorCall::PulseValve(duration))
    }

    fn lamp_state(&self) -> bool {
        self.lamp
    }

    fn fan_state(&self) -> bool {
        self.fans
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Time only moves when the code under test sleeps.
#[derive(Default)]
pub struct FakeClock {
    pub now: Duration,
    pub sleeps: Vec<Duration>,
}

impl ClockPort for FakeClock {
    fn elapsed(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
        self.sleeps.push(duration);
    }
}

// ── Sample logs ───────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryLog {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Default)]
pub struct MemoryRecords {
    pub logs: Vec<MemoryLog>,
}

#[allow(dead_code)]
impl MemoryRecords {
    pub fn log(&self, name: &str) -> Option<&MemoryLog> {
        self.logs.iter().find(|l| l.name == name)
    }
}

impl RecordSink for MemoryRecords {
    fn begin(&mut self, name: &str, header: &[&str]) -> Result<(), RecordError> {
        self.logs.push(MemoryLog {
            name: name.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        });
        Ok(())
    }

    fn append(&mut self, fields: &[String]) -> Result<(), RecordError> {
        let log = self
            .logs
            .last_mut()
            .ok_or(RecordError::Write(std::io::ErrorKind::NotFound))?;
        log.rows.push(fields.to_vec());
        Ok(())
    }
}

// ── Probe / ADC / line fakes ──────────────────────────────────

#[derive(Debug, Default)]
pub struct ProbeStats {
    pub reads: u32,
    pub released: bool,
}

/// Probe answering from a script, then repeating the last entry.  The
/// stats handle stays with the test after the hub takes the probe.
pub struct ScriptedProbe {
    script: VecDeque<Result<f32, ProbeFault>>,
    pub stats: Rc<RefCell<ProbeStats>>,
}

#[allow(dead_code)]
impl ScriptedProbe {
    pub fn new(script: Vec<Result<f32, ProbeFault>>) -> Self {
        Self {
            script: script.into(),
            stats: Rc::default(),
        }
    }

    pub fn steady(value: f32) -> Self {
        Self::new(vec![Ok(value)])
    }

    fn next(&mut self) -> Result<f32, ProbeFault> {
        self.stats.borrow_mut().reads += 1;
        if self.script.len() > 1 {
            self.script
                .pop_front()
                .unwrap_or(Err(ProbeFault::Fatal("empty")))
        } else {
            self.script
                .front()
                .copied()
                .unwrap_or(Err(ProbeFault::Fatal("empty")))
        }
    }
}

impl ClimateProbe for ScriptedProbe {
    fn read_temperature(&mut self) -> Result<f32, ProbeFault> {
        self.next()
    }

    fn read_humidity(&mut self) -> Result<f32, ProbeFault> {
        self.next()
    }

    fn release(&mut self) {
        self.stats.borrow_mut().released = true;
    }
}

/// Records every backoff instead of sleeping.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    pub waits_ms: Rc<RefCell<Vec<u32>>>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.borrow_mut().push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.borrow_mut().push(ms);
    }
}

/// ADC returning a fixed sequence of conversions, cycling.
pub struct SequenceAdc {
    pub samples: Vec<u16>,
    pub next: usize,
}

impl AdcReader for SequenceAdc {
    fn read(&mut self, _channel: u8) -> u16 {
        let v = self.samples[self.next % self.samples.len()];
        self.next += 1;
        v
    }

    fn full_scale(&self) -> u16 {
        1024
    }
}

/// Input line stuck at one level.
pub struct FixedLine(pub bool);

impl ErrorType for FixedLine {
    type Error = ErrorKind;
}

impl InputPin for FixedLine {
    fn is_high(&mut self) -> Result<bool, ErrorKind> {
        Ok(self.0)
    }

    fn is_low(&mut self) -> Result<bool, ErrorKind> {
        Ok(!self.0)
    }
}

/// Output line counting writes, shared so tests can inspect it after the
/// driver took ownership.
#[derive(Clone, Default)]
pub struct CountingLine {
    pub writes: Rc<RefCell<Vec<bool>>>,
}

impl ErrorType for CountingLine {
    type Error = ErrorKind;
}

impl OutputPin for CountingLine {
    fn set_low(&mut self) -> Result<(), ErrorKind> {
        self.writes.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), ErrorKind> {
        self.writes.borrow_mut().push(true);
        Ok(())
    }
}
