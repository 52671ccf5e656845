//! Per-tick data model.
//!
//! `ControlContext` is the snapshot one control tick produces: every
//! reading the decisions took plus the actuator states they left behind.
//! It is handed to display and logging, then dropped; nothing in it
//! survives into the next tick.

use core::fmt;

// ---------------------------------------------------------------------------
// Ambient light
// ---------------------------------------------------------------------------

/// Binary light classification from the LDR comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmbientLight {
    /// Too dark for the plants; the lamp may help.
    Dark,
    /// Enough natural light.
    Bright,
}

impl AmbientLight {
    /// Map the comparator line level: LOW is dark, HIGH is bright.
    pub fn from_line(high: bool) -> Self {
        if high { Self::Bright } else { Self::Dark }
    }

    /// Numeric code used in displays and logs: dark = 1, bright = 0.
    pub fn code(self) -> u8 {
        match self {
            Self::Dark => 1,
            Self::Bright => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor readings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    ExternalTemperature,
    InternalTemperature,
    Humidity,
    Co2,
    AmbientLight,
    SoilMoisture,
}

impl SensorKind {
    pub fn unit(self) -> &'static str {
        match self {
            Self::ExternalTemperature | Self::InternalTemperature => "\u{00b0}C",
            Self::Humidity => "%RH",
            Self::Co2 => "ppm",
            Self::AmbientLight => "dark",
            Self::SoilMoisture => "of full scale",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ExternalTemperature => "external temperature",
            Self::InternalTemperature => "internal temperature",
            Self::Humidity => "relative humidity",
            Self::Co2 => "CO2 concentration",
            Self::AmbientLight => "ambient light",
            Self::SoilMoisture => "soil moisture",
        };
        f.write_str(name)
    }
}

/// A tagged scalar reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub kind: SensorKind,
    pub value: f32,
}

impl SensorReading {
    pub fn new(kind: SensorKind, value: f32) -> Self {
        Self { kind, value }
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} {}", self.kind, self.value, self.kind.unit())
    }
}

// ---------------------------------------------------------------------------
// Actuator state
// ---------------------------------------------------------------------------

/// Last commanded lamp and fan state.  The valve is momentary and has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorState {
    pub lamp_on: bool,
    pub fans_on: bool,
}

// ---------------------------------------------------------------------------
// ControlContext
// ---------------------------------------------------------------------------

/// Upper bound on reads in one tick: lighting takes 2, ventilation 3,
/// watering 1.
pub const MAX_READINGS_PER_TICK: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct ControlContext {
    /// 1-based tick number.
    pub tick: u64,
    /// Every sample taken this tick, in read order.  A quantity read by
    /// two decisions appears twice.
    pub readings: heapless::Vec<SensorReading, MAX_READINGS_PER_TICK>,
    /// Actuator states after the decisions ran.
    pub actuators: ActuatorState,
    /// Whether the watering decision pulsed the valve.
    pub watered: bool,
}

impl ControlContext {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            readings: heapless::Vec::new(),
            actuators: ActuatorState::default(),
            watered: false,
        }
    }

    /// Record a sample.  Samples past capacity are dropped.
    pub fn record(&mut self, kind: SensorKind, value: f32) {
        if self.readings.push(SensorReading::new(kind, value)).is_err() {
            log::warn!("tick {}: reading buffer full, dropped {}", self.tick, kind);
        }
    }

    /// Most recent sample of `kind` taken this tick.
    pub fn latest(&self, kind: SensorKind) -> Option<f32> {
        self.readings
            .iter()
            .rev()
            .find(|r| r.kind == kind)
            .map(|r| r.value)
    }

    /// How many times `kind` was sampled this tick.
    pub fn sample_count(&self, kind: SensorKind) -> usize {
        self.readings.iter().filter(|r| r.kind == kind).count()
    }
}
