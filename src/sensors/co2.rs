//! CO2 sensor (NDIR, PWM output).
//!
//! The sensor reports concentration as the duty of a ~1 s PWM frame:
//!
//! ```text
//!   ppm = range * (t_high - 2 ms) / (t_high + t_low - 4 ms)
//! ```
//!
//! There is no retry here.  A failed capture is returned as-is and the
//! caller decides what to do with the tick.

use crate::error::SensorError;

/// Anything that yields a CO2 concentration.
pub trait Co2Sensor {
    fn read_ppm(&mut self) -> Result<u16, SensorError>;
}

/// Measures one PWM frame on the sensor output line.
pub trait PulseCapture {
    /// High and low times of one full frame, in microseconds.
    fn capture_frame(&mut self) -> Result<(u32, u32), &'static str>;
}

/// Convert a captured frame to ppm for a sensor configured to `range_ppm`.
///
/// Returns `None` for frames that cannot come from a healthy sensor.
pub fn pwm_to_ppm(high_us: u32, low_us: u32, range_ppm: u16) -> Option<u16> {
    const EDGE_US: u32 = 2_000;
    let period = high_us.checked_add(low_us)?;
    let span = period.checked_sub(2 * EDGE_US)?;
    if span == 0 {
        return None;
    }
    let active = high_us.saturating_sub(EDGE_US).min(span);
    let ppm = u64::from(range_ppm) * u64::from(active) / u64::from(span);
    u16::try_from(ppm).ok()
}

/// PWM-mode CO2 sensor on a captured input line.
pub struct PwmCo2Sensor<C> {
    capture: C,
    range_ppm: u16,
}

impl<C: PulseCapture> PwmCo2Sensor<C> {
    pub fn new(capture: C, range_ppm: u16) -> Self {
        Self { capture, range_ppm }
    }
}

impl<C: PulseCapture> Co2Sensor for PwmCo2Sensor<C> {
    fn read_ppm(&mut self) -> Result<u16, SensorError> {
        let (high, low) = self
            .capture
            .capture_frame()
            .map_err(SensorError::Co2ReadFailed)?;
        pwm_to_ppm(high, low, self.range_ppm)
            .ok_or(SensorError::Co2ReadFailed("implausible PWM frame"))
    }
}
