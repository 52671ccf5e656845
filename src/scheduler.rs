//! Active/standby duty cycle for run mode.
//!
//! ```text
//!   0 ──── active ────▶ A ──── standby ────▶ A+S ──── active ────▶ ...
//!          cycle 1            cycle 1               cycle 2
//! ```
//!
//! The schedule is stateless: it maps time since start to a phase, so the
//! run loop only has to ask "where am I now?" after every tick or sleep.

use core::time::Duration;

use crate::config::SystemConfig;

// ═══════════════════════════════════════════════════════════════
//  Phase
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Control ticks run.  `remaining` is time left in this phase.
    Active { cycle: u32, remaining: Duration },
    /// Actuators are off and nothing is sampled.
    Standby { cycle: u32, remaining: Duration },
}

impl Phase {
    /// 1-based cycle number.
    pub fn cycle(&self) -> u32 {
        match *self {
            Self::Active { cycle, .. } | Self::Standby { cycle, .. } => cycle,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

// ═══════════════════════════════════════════════════════════════
//  DutySchedule
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutySchedule {
    active: Duration,
    standby: Duration,
}

impl DutySchedule {
    /// `active` must be non-zero.  A zero `standby` gives back-to-back
    /// active phases.
    pub fn new(active: Duration, standby: Duration) -> Self {
        Self { active, standby }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.active_period(), config.standby_period())
    }

    pub fn period(&self) -> Duration {
        self.active + self.standby
    }

    /// Phase in effect `elapsed` after the schedule started.
    pub fn phase_at(&self, elapsed: Duration) -> Phase {
        let period = self.period().as_millis().max(1);
        let ms = elapsed.as_millis();
        let index = ms / period;
        let cycle = u32::try_from(index).unwrap_or(u32::MAX - 1) + 1;
        let into = Duration::from_millis((ms % period) as u64);

        if into < self.active {
            Phase::Active {
                cycle,
                remaining: self.active - into,
            }
        } else {
            Phase::Standby {
                cycle,
                remaining: self.period() - into,
            }
        }
    }
}
