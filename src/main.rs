//! Greenhouse controller: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   JsonConfigFile  SystemClock  │
//! │  (Sensor+Actuator) (EventSink)    (ConfigPort)    (ClockPort)  │
//! │  CsvRecorder (RecordSink)                                      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   Runner ─▶ AppService ─▶ ControlPolicy (pure logic)    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On a host the hardware adapter is built on the simulated greenhouse.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use greenhouse::adapters::config_file::JsonConfigFile;
use greenhouse::adapters::csv_log::CsvRecorder;
use greenhouse::adapters::log_sink::LogEventSink;
use greenhouse::adapters::sim::{SimGreenhouse, WorldState};
use greenhouse::adapters::time::{StdDelay, SystemClock};
use greenhouse::app::ports::ConfigPort;
use greenhouse::cli;
use greenhouse::runner::Runner;

const DEFAULT_CONFIG: &str = "greenhouse.json";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cmd = cli::parse(std::env::args().skip(1))?;
    if cmd.help {
        print!("{}", cli::USAGE);
        return Ok(());
    }

    // ── Config ───────────────────────────────────────────────────
    let path = cmd
        .config_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = JsonConfigFile::new(&path)
        .load()
        .with_context(|| format!("loading {}", path.display()))?;
    info!(
        "thresholds: humidity {:.1}%, temperature {:.1}\u{00b0}C, watering {}",
        config.thresholds.humidity_pct,
        config.thresholds.temperature_c,
        if config.watering_enabled { "on" } else { "off" }
    );

    // ── Hardware ─────────────────────────────────────────────────
    let world = SimGreenhouse::new(WorldState::default(), 1.0);
    let hw = world
        .hardware(&config, StdDelay)
        .context("initialising actuators")?;

    // ── Modes ────────────────────────────────────────────────────
    let records = CsvRecorder::new(&config.log_dir);
    let mut runner = Runner::new(config, hw, SystemClock::new(), records, LogEventSink::new());
    for mode in cmd.modes {
        let report = runner
            .execute(mode)
            .with_context(|| format!("{mode} failed"))?;
        info!(
            "{}: {} samples, {} ticks, {} failed",
            mode, report.samples, report.ticks, report.failed
        );
    }
    Ok(())
}
