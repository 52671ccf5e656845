//! Temperature/humidity probes and the transient-fault retry loop.
//!
//! The single-wire probes in the enclosure routinely fail a read (bad
//! checksum, missed start pulse).  Those failures are *transient*: wait
//! and try again.  Anything else is *fatal*: release the probe and give
//! up on the tick.
//!
//! ```text
//!   read ─ ok ─────────────────────────────▶ value
//!     │
//!     ├─ transient ─▶ backoff ─▶ read ...    (until ok or bound reached)
//!     │
//!     └─ fatal ─────▶ release ─▶ ProbeFault
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, error, warn};

use crate::config::RetryPolicy;
use crate::error::{ProbeId, SensorError};

/// Outcome of a failed probe read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFault {
    /// Worth retrying after a pause.
    Transient,
    /// The probe is gone; retrying will not help.
    Fatal(&'static str),
}

/// Which quantity to read from a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Temperature,
    Humidity,
}

/// A combined temperature/humidity probe.
pub trait ClimateProbe {
    /// Degrees Celsius.
    fn read_temperature(&mut self) -> Result<f32, ProbeFault>;

    /// Relative humidity, percent.
    fn read_humidity(&mut self) -> Result<f32, ProbeFault>;

    /// Free the probe's bus resources after a fatal fault.
    fn release(&mut self);

    fn read(&mut self, quantity: Quantity) -> Result<f32, ProbeFault> {
        match quantity {
            Quantity::Temperature => self.read_temperature(),
            Quantity::Humidity => self.read_humidity(),
        }
    }
}

/// Read `quantity` from `probe`, sleeping `policy.backoff_ms` after every
/// transient fault.
///
/// With an unbounded policy this only returns once the probe answers or
/// fails fatally.
pub fn read_with_retry<P, D>(
    probe: &mut P,
    id: ProbeId,
    quantity: Quantity,
    policy: &RetryPolicy,
    delay: &mut D,
) -> Result<f32, SensorError>
where
    P: ClimateProbe + ?Sized,
    D: DelayNs,
{
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        match probe.read(quantity) {
            Ok(value) => return Ok(value),
            Err(ProbeFault::Transient) => {
                if !policy.allows_another(attempts) {
                    warn!("{id}: giving up after {attempts} attempts");
                    probe.release();
                    return Err(SensorError::RetriesExhausted { probe: id, attempts });
                }
                debug!(
                    "{id}: transient fault on attempt {attempts}, retrying in {} ms",
                    policy.backoff_ms
                );
                delay.delay_ms(policy.backoff_ms);
            }
            Err(ProbeFault::Fatal(reason)) => {
                error!("{id}: {reason}, releasing probe");
                probe.release();
                return Err(SensorError::ProbeFault { probe: id, reason });
            }
        }
    }
}

/// Round to two decimal places.  Exact ties go to the even digit, so
/// 21.125 becomes 21.12 and 21.375 becomes 21.38.
pub fn round2(x: f32) -> f32 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Mean of the two internal probes as reported to the policy.
pub fn mean2(a: f32, b: f32) -> f32 {
    round2((a + b) / 2.0)
}
