//! Operating modes.
//!
//! Each mode is a blocking loop over the ports: the hardware adapter, a
//! clock, a sample-log sink and an event sink.  Modes never touch the
//! terminal or the filesystem directly, so each one runs unchanged against
//! the simulated backend, the real board, or test fakes.
//!
//! | Mode          | Actuators            | Log file                       |
//! |---------------|----------------------|--------------------------------|
//! | `Run`         | policy, 12 h on/off  | none                           |
//! | `ControlTest` | policy               | `environmental_control_log.csv`|
//! | `HeatingTest` | lamp forced on       | `lamp_heating_log.csv`         |
//! | `VentTest`    | fans forced on       | `ventilation_log.csv`          |
//! | `Display`     | untouched            | none                           |
//! | `Lamp`/`Fans` | on for a countdown   | none                           |
//! | `Water`       | one valve pulse      | none                           |

use core::fmt;
use core::time::Duration;

use log::{error, info};

use crate::app::events::{AppEvent, TelemetryData};
use crate::app::ports::{ActuatorPort, ClockPort, EventSink, RecordSink, SensorPort};
use crate::app::service::AppService;
use crate::config::{FaultPolicy, SystemConfig};
use crate::drivers::Actuator;
use crate::error::{Error, Result};
use crate::scheduler::{DutySchedule, Phase};

pub const CONTROL_LOG: &str = "environmental_control_log.csv";
pub const HEATING_LOG: &str = "lamp_heating_log.csv";
pub const VENTILATION_LOG: &str = "ventilation_log.csv";

const CONTROL_HEADER: &[&str] = &[
    "Sample #",
    "External Temperature",
    "Internal Temperature",
    "Relative Humidity",
    "CO2 Concentration",
    "Lighting",
    "Soil Moisture",
    "Lighting State",
    "Fan State",
];
const HEATING_HEADER: &[&str] = &["Sample #", "Temperature"];
const VENTILATION_HEADER: &[&str] = &[
    "Sample #",
    "External Temperature",
    "Internal Temperature",
    "Relative Humidity",
    "CO2 Concentration",
];

/// Control test prints every Nth sample; the forced-actuator tests every Mth.
const CONTROL_PRINT_EVERY: u32 = 5;
const FORCED_PRINT_EVERY: u32 = 10;

// ═══════════════════════════════════════════════════════════════
//  Mode
// ═══════════════════════════════════════════════════════════════

/// Listed in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    Run,
    ControlTest,
    HeatingTest,
    VentilationTest,
    Display,
    Lamp,
    Water,
    Fans,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::ControlTest => "control test",
            Self::HeatingTest => "heating test",
            Self::VentilationTest => "ventilation test",
            Self::Display => "display",
            Self::Lamp => "manual lamp",
            Self::Water => "manual water",
            Self::Fans => "manual fans",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a finished mode did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeReport {
    pub mode: Mode,
    /// Rows written to the sample log, or snapshots taken.
    pub samples: u32,
    /// Control ticks attempted.
    pub ticks: u32,
    /// Ticks or samples lost to a skipped fault.
    pub failed: u32,
}

impl ModeReport {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            samples: 0,
            ticks: 0,
            failed: 0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Runner
// ═══════════════════════════════════════════════════════════════

pub struct Runner<H, C, R, E> {
    config: SystemConfig,
    service: AppService,
    hw: H,
    clock: C,
    records: R,
    sink: E,
    max_cycles: Option<u32>,
}

impl<H, C, R, E> Runner<H, C, R, E>
where
    H: SensorPort + ActuatorPort,
    C: ClockPort,
    R: RecordSink,
    E: EventSink,
{
    pub fn new(config: SystemConfig, hw: H, clock: C, records: R, sink: E) -> Self {
        let service = AppService::new(&config);
        Self {
            config,
            service,
            hw,
            clock,
            records,
            sink,
            max_cycles: None,
        }
    }

    /// Stop run mode after `cycles` active/standby cycles instead of
    /// looping forever.
    pub fn with_max_cycles(mut self, cycles: Option<u32>) -> Self {
        self.max_cycles = cycles;
        self
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Execute one mode to completion.
    pub fn execute(&mut self, mode: Mode) -> Result<ModeReport> {
        info!("starting {mode}");
        self.sink.emit(&AppEvent::ModeStarted(mode.name()));
        let report = match mode {
            Mode::Run => self.run(),
            Mode::ControlTest => self.control_test(),
            Mode::HeatingTest => self.forced_test(Mode::HeatingTest),
            Mode::VentilationTest => self.forced_test(Mode::VentilationTest),
            Mode::Display => self.display(),
            Mode::Lamp => self.manual_toggle(Mode::Lamp),
            Mode::Fans => self.manual_toggle(Mode::Fans),
            Mode::Water => self.manual_water(),
        }?;
        self.sink.emit(&AppEvent::ModeFinished {
            mode: mode.name(),
            samples: report.samples,
        });
        Ok(report)
    }

    // ── Run ───────────────────────────────────────────────────

    fn run(&mut self) -> Result<ModeReport> {
        let mut report = ModeReport::new(Mode::Run);
        let schedule = DutySchedule::from_config(&self.config);
        let start = self.clock.elapsed();
        let mut active_cycle = 0;
        let mut standby_cycle = 0;
        let mut since_display = 0;

        loop {
            let elapsed = self.clock.elapsed().saturating_sub(start);
            match schedule.phase_at(elapsed) {
                Phase::Active { cycle, .. } => {
                    if cycle != active_cycle {
                        if self.max_cycles.is_some_and(|max| cycle > max) {
                            break;
                        }
                        active_cycle = cycle;
                        since_display = 0;
                        self.sink.emit(&AppEvent::ActivePhaseStarted { cycle });
                    }

                    if since_display == self.config.display_every_ticks {
                        since_display = 0;
                        match self.service.telemetry(&mut self.hw) {
                            Ok(t) => {
                                report.samples += 1;
                                self.sink.emit(&AppEvent::Telemetry(t));
                            }
                            Err(e) => {
                                self.handle_fault(Some(u64::from(report.samples)), e, &mut report)?;
                            }
                        }
                    }

                    report.ticks += 1;
                    if let Err(e) = self.service.tick(&mut self.hw, &mut self.sink) {
                        self.handle_fault(None, e, &mut report)?;
                    }
                    since_display += 1;
                    self.clock.sleep(self.config.control_interval());
                }
                Phase::Standby { cycle, remaining } => {
                    if cycle != standby_cycle {
                        standby_cycle = cycle;
                        self.hw.all_off()?;
                        self.sink.emit(&AppEvent::StandbyStarted { cycle });
                    }
                    self.clock.sleep(remaining);
                }
            }
        }
        Ok(report)
    }

    // ── Control test ──────────────────────────────────────────

    fn control_test(&mut self) -> Result<ModeReport> {
        let mut report = ModeReport::new(Mode::ControlTest);
        self.records.begin(CONTROL_LOG, CONTROL_HEADER)?;
        let deadline = self.clock.elapsed() + self.config.test_duration();

        while self.clock.elapsed() < deadline {
            match self.service.telemetry(&mut self.hw) {
                Ok(t) => {
                    self.records.append(&control_row(report.samples, &t))?;
                    report.samples += 1;
                    if report.samples % CONTROL_PRINT_EVERY == 0 {
                        self.sink.emit(&AppEvent::Telemetry(t));
                    }
                }
                Err(e) => {
                    self.handle_fault(Some(u64::from(report.samples)), e, &mut report)?;
                }
            }

            report.ticks += 1;
            if let Err(e) = self.service.tick(&mut self.hw, &mut self.sink) {
                self.handle_fault(None, e, &mut report)?;
            }
            self.clock.sleep(self.config.control_interval());
        }

        self.hw.turn_fans_off()?;
        self.hw.turn_lamp_off()?;
        Ok(report)
    }

    // ── Heating / ventilation tests ───────────────────────────

    fn forced_test(&mut self, mode: Mode) -> Result<ModeReport> {
        let mut report = ModeReport::new(mode);
        let (name, header) = if mode == Mode::HeatingTest {
            (HEATING_LOG, HEATING_HEADER)
        } else {
            (VENTILATION_LOG, VENTILATION_HEADER)
        };
        self.records.begin(name, header)?;
        let deadline = self.clock.elapsed() + self.config.test_duration();

        if mode == Mode::HeatingTest {
            self.switch(Actuator::Lamp, true)?;
        } else {
            self.switch(Actuator::Fans, true)?;
        }

        while self.clock.elapsed() < deadline {
            match self.forced_sample(mode, report.samples) {
                Ok(row) => {
                    self.records.append(&row)?;
                    report.samples += 1;
                    if report.samples % FORCED_PRINT_EVERY == 0 {
                        info!("{}: {}", mode, row.join(","));
                    }
                }
                Err(e) => self.handle_fault(Some(u64::from(report.samples)), e, &mut report)?,
            }
            self.clock.sleep(self.config.test_interval());
        }

        if mode == Mode::HeatingTest {
            self.switch(Actuator::Lamp, false)?;
        } else {
            self.switch(Actuator::Fans, false)?;
        }
        Ok(report)
    }

    fn forced_sample(&mut self, mode: Mode, index: u32) -> Result<Vec<String>> {
        if mode == Mode::HeatingTest {
            let t = self.hw.read_internal_temperature()?;
            return Ok(vec![index.to_string(), t.to_string()]);
        }
        let external = self.hw.read_external_temperature()?;
        let internal = self.hw.read_internal_temperature()?;
        let humidity = self.hw.read_humidity()?;
        let co2 = self.hw.read_co2()?;
        Ok(vec![
            index.to_string(),
            external.to_string(),
            internal.to_string(),
            humidity.to_string(),
            co2.to_string(),
        ])
    }

    // ── Display / manual ──────────────────────────────────────

    fn display(&mut self) -> Result<ModeReport> {
        let t = self.service.telemetry(&mut self.hw)?;
        self.sink.emit(&AppEvent::Telemetry(t));
        Ok(ModeReport {
            samples: 1,
            ..ModeReport::new(Mode::Display)
        })
    }

    fn manual_toggle(&mut self, mode: Mode) -> Result<ModeReport> {
        let which = if mode == Mode::Lamp {
            Actuator::Lamp
        } else {
            Actuator::Fans
        };
        self.switch(which, true)?;
        for remaining in (1..=self.config.manual_toggle_secs).rev() {
            self.sink.emit(&AppEvent::Countdown(remaining));
            self.clock.sleep(Duration::from_secs(1));
        }
        self.switch(which, false)?;
        Ok(ModeReport::new(mode))
    }

    fn manual_water(&mut self) -> Result<ModeReport> {
        let pulse = Duration::from_millis(u64::from(self.config.manual_valve_ms));
        self.hw.pulse_valve(pulse)?;
        self.sink.emit(&AppEvent::ValvePulsed(pulse));
        Ok(ModeReport::new(Mode::Water))
    }

    // ── Internal ──────────────────────────────────────────────

    fn switch(&mut self, which: Actuator, on: bool) -> Result<()> {
        let before = match which {
            Actuator::Lamp => self.hw.lamp_state(),
            _ => self.hw.fan_state(),
        };
        match (which, on) {
            (Actuator::Lamp, true) => self.hw.turn_lamp_on()?,
            (Actuator::Lamp, false) => self.hw.turn_lamp_off()?,
            (_, true) => self.hw.turn_fans_on()?,
            (_, false) => self.hw.turn_fans_off()?,
        }
        if before != on {
            self.sink.emit(&AppEvent::ActuatorChanged { actuator: which, on });
        }
        Ok(())
    }

    /// Apply the configured fault policy.  `Ok` means carry on.
    ///
    /// `sample` is the mode's sample index for faults outside a control
    /// tick.  Tick faults pass `None`; the service already reported them.
    fn handle_fault(
        &mut self,
        sample: Option<u64>,
        err: Error,
        report: &mut ModeReport,
    ) -> Result<()> {
        report.failed += 1;
        match self.config.fault_policy {
            FaultPolicy::SkipTick => {
                if let Some(sample) = sample {
                    self.sink.emit(&AppEvent::SampleFailed { sample, error: err });
                }
                Ok(())
            }
            FaultPolicy::Abort => {
                error!("{}: aborting on {}", report.mode, err);
                if let Err(off) = self.hw.all_off() {
                    error!("could not switch actuators off: {off}");
                }
                Err(err)
            }
        }
    }
}

fn control_row(index: u32, t: &TelemetryData) -> Vec<String> {
    vec![
        index.to_string(),
        t.external_temp_c.to_string(),
        t.internal_temp_c.to_string(),
        t.humidity_pct.to_string(),
        t.co2_ppm.to_string(),
        t.light_state.to_string(),
        t.soil_moisture_pct.to_string(),
        u8::from(t.lamp_on).to_string(),
        u8::from(t.fans_on).to_string(),
    ]
}
