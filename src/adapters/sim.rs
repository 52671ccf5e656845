//! Simulated greenhouse backend.
//!
//! Stands in for the real board on a development host.  Every simulated
//! line shares one [`SimGreenhouse`] world, so switching the simulated
//! lamp relay really does warm the simulated probes.
//!
//! ```text
//!   SimRelayPin ──▶ ┌──────────── World ────────────┐ ──▶ SimProbe
//!   (lamp, fans,    │ lamp heats · fans mix with    │     SimPwmCapture
//!    valve)         │ outside air · leak to outside │     SimLightPin
//!                   └───────────────────────────────┘     SimAdc
//! ```
//!
//! The world advances on wall-clock time (optionally sped up) whenever a
//! probe is read, or explicitly through [`SimGreenhouse::advance`].

use core::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use log::{debug, info};

use crate::adapters::hardware::HardwareAdapter;
use crate::config::SystemConfig;
use crate::drivers::Actuator;
use crate::drivers::relay::RelayDriver;
use crate::drivers::valve::ValveDriver;
use crate::error::{ActuatorError, ProbeId};
use crate::pins;
use crate::sensors::SensorHub;
use crate::sensors::co2::{PulseCapture, PwmCo2Sensor};
use crate::sensors::light::LightSensor;
use crate::sensors::probe::{ClimateProbe, ProbeFault, round2};
use crate::sensors::soil::{AdcReader, SoilMoistureSensor};

// Model rates, per simulated second.
const LAMP_HEAT_C_PER_S: f32 = 0.004;
const FAN_MIX_PER_S: f32 = 0.01;
const LEAK_PER_S: f32 = 0.0005;
const HUMIDITY_RISE_PER_S: f32 = 0.002;
const HUMIDITY_VENT_PER_S: f32 = 0.01;
const CO2_RISE_PPM_PER_S: f32 = 0.05;
const OUTSIDE_CO2_PPM: f32 = 420.0;
const SOIL_DRY_PER_S: f32 = 0.002;
const SOIL_WET_PER_PULSE: f32 = 40.0;

// ═══════════════════════════════════════════════════════════════
//  World
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldState {
    pub external_c: f32,
    pub internal_c: f32,
    pub humidity_pct: f32,
    pub co2_ppm: f32,
    pub dark: bool,
    /// Raw soil-moisture ADC code.
    pub soil_raw: f32,
    pub lamp_on: bool,
    pub fans_on: bool,
    pub valve_open: bool,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            external_c: 18.0,
            internal_c: 21.0,
            humidity_pct: 60.0,
            co2_ppm: 450.0,
            dark: true,
            soil_raw: 300.0,
            lamp_on: false,
            fans_on: false,
            valve_open: false,
        }
    }
}

impl WorldState {
    fn step(&mut self, dt: Duration) {
        let s = dt.as_secs_f32();
        if s <= 0.0 {
            return;
        }
        let diff = self.external_c - self.internal_c;
        let mix = if self.fans_on { FAN_MIX_PER_S } else { LEAK_PER_S };
        self.internal_c += diff * (mix * s).min(1.0);
        if self.lamp_on {
            self.internal_c += LAMP_HEAT_C_PER_S * s;
        }

        if self.fans_on {
            self.humidity_pct -= (self.humidity_pct - 50.0) * (HUMIDITY_VENT_PER_S * s).min(1.0);
            self.co2_ppm -= (self.co2_ppm - OUTSIDE_CO2_PPM) * (FAN_MIX_PER_S * s).min(1.0);
        } else {
            self.humidity_pct = (self.humidity_pct + HUMIDITY_RISE_PER_S * s).min(95.0);
            self.co2_ppm = (self.co2_ppm + CO2_RISE_PPM_PER_S * s).min(2000.0);
        }
        self.soil_raw = (self.soil_raw - SOIL_DRY_PER_S * s).max(0.0);
    }
}

struct World {
    state: WorldState,
    last_sync: Instant,
    time_scale: f32,
    probe_reads: u32,
    transient_every: Option<u32>,
    failed: Option<ProbeId>,
}

/// Handle to the shared simulated world.  Cheap to clone.
#[derive(Clone)]
pub struct SimGreenhouse {
    world: Arc<Mutex<World>>,
}

impl SimGreenhouse {
    /// World that follows wall-clock time sped up by `time_scale`.
    pub fn new(initial: WorldState, time_scale: f32) -> Self {
        info!("sim: greenhouse model running at {time_scale}x");
        Self {
            world: Arc::new(Mutex::new(World {
                state: initial,
                last_sync: Instant::now(),
                time_scale,
                probe_reads: 0,
                transient_every: None,
                failed: None,
            })),
        }
    }

    /// World that only moves through [`advance`](Self::advance).
    pub fn frozen(initial: WorldState) -> Self {
        Self::new(initial, 0.0)
    }

    /// Make every `n`th probe read fail transiently, like a real
    /// single-wire probe on a long cable.
    pub fn inject_transients(&self, every: Option<u32>) {
        self.lock().transient_every = every.filter(|n| *n > 0);
    }

    /// Make all reads of `probe` fail fatally from now on.
    pub fn fail_probe(&self, probe: Option<ProbeId>) {
        self.lock().failed = probe;
    }

    pub fn advance(&self, dt: Duration) {
        self.lock().state.step(dt);
    }

    pub fn snapshot(&self) -> WorldState {
        self.lock().state
    }

    pub fn set(&self, f: impl FnOnce(&mut WorldState)) {
        f(&mut self.lock().state);
    }

    /// Build a full hardware adapter on top of this world.  Every relay
    /// line is driven low on the way.
    pub fn hardware<D>(
        &self,
        config: &SystemConfig,
        delay: D,
    ) -> Result<SimHardware<D>, ActuatorError>
    where
        D: DelayNs + Clone,
    {
        debug!(
            "sim wiring: probes ext=GPIO{} int=GPIO{}/GPIO{} light=GPIO{} co2=GPIO{} \
             lamp=GPIO{} fans=GPIO{} valve=GPIO{}",
            pins::PROBE_EXTERNAL_GPIO,
            pins::PROBE_INTERNAL_1_GPIO,
            pins::PROBE_INTERNAL_2_GPIO,
            pins::LIGHT_SENSE_GPIO,
            pins::CO2_PWM_GPIO,
            pins::LAMP_GPIO,
            pins::FANS_GPIO,
            pins::WATER_VALVE_GPIO,
        );
        let probe = |id| SimProbe {
            world: self.clone(),
            id,
        };
        let hub = SensorHub::new(
            probe(ProbeId::External),
            [probe(ProbeId::Internal1), probe(ProbeId::Internal2)],
            PwmCo2Sensor::new(
                SimPwmCapture {
                    world: self.clone(),
                },
                pins::CO2_RANGE_PPM,
            ),
            LightSensor::new(SimLightPin {
                world: self.clone(),
            }),
            SoilMoistureSensor::new(
                SimAdc {
                    world: self.clone(),
                },
                pins::ADC_CH_SOIL,
            ),
            delay.clone(),
            config.retry,
        );
        let pin = |which| SimRelayPin {
            world: self.clone(),
            which,
        };
        Ok(HardwareAdapter::new(
            hub,
            RelayDriver::new(Actuator::Lamp, pin(Actuator::Lamp))?,
            RelayDriver::new(Actuator::Fans, pin(Actuator::Fans))?,
            ValveDriver::new(pin(Actuator::Valve), delay)?,
        ))
    }

    fn lock(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bring the model up to wall-clock time and return the state.
    fn sync(&self) -> WorldState {
        let mut w = self.lock();
        let now = Instant::now();
        let real = now.duration_since(w.last_sync);
        w.last_sync = now;
        if w.time_scale > 0.0 {
            let dt = real.mul_f32(w.time_scale);
            w.state.step(dt);
        }
        w.state
    }
}

/// Hardware adapter built entirely from simulated lines.
pub type SimHardware<D> = HardwareAdapter<
    SensorHub<SimProbe, PwmCo2Sensor<SimPwmCapture>, SimLightPin, SimAdc, D>,
    SimRelayPin,
    SimRelayPin,
    SimRelayPin,
    D,
>;

// ═══════════════════════════════════════════════════════════════
//  Simulated peripherals
// ═══════════════════════════════════════════════════════════════

pub struct SimProbe {
    world: SimGreenhouse,
    id: ProbeId,
}

impl SimProbe {
    fn offset_c(&self) -> f32 {
        match self.id {
            ProbeId::External | ProbeId::Internal1 => 0.0,
            ProbeId::Internal2 => 0.2,
        }
    }

    fn check_fault(&self) -> Result<WorldState, ProbeFault> {
        let state = self.world.sync();
        let mut w = self.world.lock();
        if w.failed == Some(self.id) {
            return Err(ProbeFault::Fatal("simulated probe failure"));
        }
        w.probe_reads = w.probe_reads.wrapping_add(1);
        if let Some(n) = w.transient_every {
            if w.probe_reads % n == 0 {
                return Err(ProbeFault::Transient);
            }
        }
        Ok(state)
    }
}

impl ClimateProbe for SimProbe {
    fn read_temperature(&mut self) -> Result<f32, ProbeFault> {
        let s = self.check_fault()?;
        let base = match self.id {
            ProbeId::External => s.external_c,
            ProbeId::Internal1 | ProbeId::Internal2 => s.internal_c,
        };
        Ok(round2(base + self.offset_c()))
    }

    fn read_humidity(&mut self) -> Result<f32, ProbeFault> {
        let s = self.check_fault()?;
        Ok(round2(s.humidity_pct))
    }

    fn release(&mut self) {
        debug!("sim: {} released", self.id);
    }
}

/// Full PWM frame of the CO2 sensor: 2 ms lead-in, 1000 ms of duty, 2 ms tail.
const CO2_FRAME_US: u32 = 1_004_000;
const CO2_EDGE_US: u32 = 2_000;

/// Encodes the world's CO2 level as the frame the sensor would emit.
pub struct SimPwmCapture {
    world: SimGreenhouse,
}

impl PulseCapture for SimPwmCapture {
    fn capture_frame(&mut self) -> Result<(u32, u32), &'static str> {
        let range = u32::from(pins::CO2_RANGE_PPM);
        let ppm = (self.world.snapshot().co2_ppm.round().max(0.0) as u32).min(range);
        let span = CO2_FRAME_US - 2 * CO2_EDGE_US;
        let high = CO2_EDGE_US + ppm * (span / range);
        Ok((high, CO2_FRAME_US - high))
    }
}

pub struct SimLightPin {
    world: SimGreenhouse,
}

impl ErrorType for SimLightPin {
    type Error = Infallible;
}

impl InputPin for SimLightPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.world.snapshot().dark)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.world.snapshot().dark)
    }
}

pub struct SimAdc {
    world: SimGreenhouse,
}

impl AdcReader for SimAdc {
    fn read(&mut self, channel: u8) -> u16 {
        let s = self.world.snapshot();
        let raw = match channel {
            pins::ADC_CH_SOIL => s.soil_raw,
            _ => 0.0,
        };
        (raw as u16).min(pins::ADC_FULL_SCALE - 1)
    }

    fn full_scale(&self) -> u16 {
        pins::ADC_FULL_SCALE
    }
}

pub struct SimRelayPin {
    world: SimGreenhouse,
    which: Actuator,
}

impl ErrorType for SimRelayPin {
    type Error = Infallible;
}

impl SimRelayPin {
    fn write(&mut self, high: bool) {
        self.world.sync();
        let mut w = self.world.lock();
        match self.which {
            Actuator::Lamp => w.state.lamp_on = high,
            Actuator::Fans => w.state.fans_on = high,
            Actuator::Valve => {
                if w.state.valve_open && !high {
                    w.state.soil_raw = (w.state.soil_raw + SOIL_WET_PER_PULSE)
                        .min(f32::from(pins::ADC_FULL_SCALE - 1));
                }
                w.state.valve_open = high;
            }
        }
    }
}

impl OutputPin for SimRelayPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.write(true);
        Ok(())
    }
}
