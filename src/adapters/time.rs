//! Wall-clock time adapters.
//!
//! - [`SystemClock`] implements [`ClockPort`] on `std::time::Instant`.
//! - [`StdDelay`] implements `embedded-hal`'s `DelayNs` with
//!   `std::thread::sleep`, for probe backoff and valve pulses.

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

use crate::app::ports::ClockPort;

/// Monotonic clock started at construction.
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl ClockPort for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Blocking delay on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
