//! Integration tests for the operating modes, driven by a fake clock so
//! half-hour tests and 12 h duty cycles finish instantly.

use std::time::Duration;

use greenhouse::app::events::AppEvent;
use greenhouse::config::{FaultPolicy, SystemConfig};
use greenhouse::control::context::{AmbientLight, SensorKind};
use greenhouse::error::{Error, SensorError};
use greenhouse::runner::{CONTROL_LOG, HEATING_LOG, Mode, Runner, VENTILATION_LOG};

use crate::mock_hw::{ActuatorCall, FakeClock, MemoryRecords, MockEnv, MockHardware, RecordingSink};

type TestRunner = Runner<MockHardware, FakeClock, MemoryRecords, RecordingSink>;

fn short_config() -> SystemConfig {
    SystemConfig {
        test_duration_secs: 20,
        control_interval_ms: 5_000,
        test_interval_ms: 2_000,
        active_period_secs: 20,
        standby_period_secs: 30,
        display_every_ticks: 2,
        manual_toggle_secs: 3,
        ..SystemConfig::default()
    }
}

fn runner(config: SystemConfig, env: MockEnv) -> TestRunner {
    Runner::new(
        config,
        MockHardware::new(env),
        FakeClock::default(),
        MemoryRecords::default(),
        RecordingSink::default(),
    )
}

// ── Control test ──────────────────────────────────────────────

#[test]
fn control_test_logs_one_row_per_tick() {
    let env = MockEnv {
        light: AmbientLight::Dark,
        ..MockEnv::default()
    };
    let mut r = runner(short_config(), env);
    let report = r.execute(Mode::ControlTest).unwrap();

    assert_eq!(report.samples, 4);
    assert_eq!(report.ticks, 4);
    let log = r.records().log(CONTROL_LOG).unwrap();
    assert_eq!(log.header.len(), 9);
    assert_eq!(log.header[0], "Sample #");
    assert_eq!(log.rows.len(), 4);
    assert_eq!(log.rows[0][0], "0");
    assert_eq!(log.rows[3][0], "3");

    // The first row is sampled before the first decision ran.
    assert_eq!(log.rows[0][7], "0");
    assert_eq!(log.rows[1][7], "1");
    // Soil is logged as a percentage.
    assert_eq!(log.rows[0][6], "25");
}

#[test]
fn control_test_switches_everything_off_at_the_end() {
    let env = MockEnv {
        light: AmbientLight::Dark,
        internal_c: 25.0,
        external_c: 10.0,
        ..MockEnv::default()
    };
    let mut r = runner(short_config(), env);
    r.execute(Mode::ControlTest).unwrap();

    let tail = &r.hw().calls[r.hw().calls.len() - 2..];
    assert_eq!(tail, &[ActuatorCall::FansOff, ActuatorCall::LampOff]);
    assert_eq!(r.clock().now, Duration::from_secs(20));
}

// ── Forced-actuator tests ─────────────────────────────────────

#[test]
fn heating_test_holds_lamp_on_and_logs_temperature() {
    let mut r = runner(short_config(), MockEnv::default());
    let report = r.execute(Mode::HeatingTest).unwrap();

    assert_eq!(report.samples, 10);
    let log = r.records().log(HEATING_LOG).unwrap();
    assert_eq!(log.header, vec!["Sample #", "Temperature"]);
    assert_eq!(log.rows[9], vec!["9".to_string(), "21".to_string()]);
    assert_eq!(r.hw().calls.first(), Some(&ActuatorCall::LampOn));
    assert_eq!(r.hw().last_call(), Some(&ActuatorCall::LampOff));
    assert!(r.hw().reads.iter().all(|k| *k == SensorKind::InternalTemperature));
}

#[test]
fn ventilation_test_holds_fans_on_and_logs_climate() {
    let mut r = runner(short_config(), MockEnv::default());
    let report = r.execute(Mode::VentilationTest).unwrap();

    assert_eq!(report.samples, 10);
    let log = r.records().log(VENTILATION_LOG).unwrap();
    assert_eq!(log.header.len(), 5);
    assert_eq!(
        log.rows[0],
        vec!["0", "18", "21", "55", "480"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
    assert_eq!(r.hw().calls, vec![ActuatorCall::FansOn, ActuatorCall::FansOff]);
}

// ── Run mode ──────────────────────────────────────────────────

#[test]
fn run_mode_cycles_active_then_standby() {
    let mut r = runner(short_config(), MockEnv::default()).with_max_cycles(Some(1));
    let report = r.execute(Mode::Run).unwrap();

    assert_eq!(report.ticks, 4);
    assert_eq!(report.samples, 1, "one display after every second tick");
    assert_eq!(
        r.sink().count(|e| matches!(e, AppEvent::StandbyStarted { cycle: 1 })),
        1
    );
    assert_eq!(
        r.sink().count(|e| matches!(e, AppEvent::ActivePhaseStarted { .. })),
        1
    );
    // 4 ticks of 5 s, then the whole standby in one sleep.
    assert_eq!(r.clock().now, Duration::from_secs(50));
    assert_eq!(r.clock().sleeps.last(), Some(&Duration::from_secs(30)));
    assert_eq!(
        &r.hw().calls[r.hw().calls.len() - 2..],
        &[ActuatorCall::LampOff, ActuatorCall::FansOff]
    );
}

#[test]
fn run_mode_runs_several_cycles() {
    let mut r = runner(short_config(), MockEnv::default()).with_max_cycles(Some(3));
    let report = r.execute(Mode::Run).unwrap();
    assert_eq!(report.ticks, 12);
    assert_eq!(
        r.sink().count(|e| matches!(e, AppEvent::StandbyStarted { .. })),
        3
    );
}

// ── Fault policy ──────────────────────────────────────────────

#[test]
fn abort_policy_stops_the_mode_and_switches_off() {
    let mut r = runner(short_config(), MockEnv::default());
    let fault = SensorError::GpioReadFailed;
    r.hw_mut().fail_reads(SensorKind::AmbientLight, fault, 1);

    let err = r.execute(Mode::ControlTest).unwrap_err();
    assert_eq!(err, Error::Sensor(fault));
    assert_eq!(r.hw().last_call(), Some(&ActuatorCall::FansOff));
    assert!(r.records().log(CONTROL_LOG).unwrap().rows.is_empty());
}

#[test]
fn skip_policy_carries_on_after_a_fault() {
    let config = SystemConfig {
        fault_policy: FaultPolicy::SkipTick,
        ..short_config()
    };
    let mut r = runner(config, MockEnv::default());
    r.hw_mut()
        .fail_reads(SensorKind::AmbientLight, SensorError::GpioReadFailed, 2);

    let report = r.execute(Mode::ControlTest).unwrap();
    assert_eq!(report.ticks, 4);
    assert_eq!(report.failed, 2);
    // The snapshot fault is reported as sample 0, the tick fault as tick 1.
    assert_eq!(
        r.sink().count(|e| matches!(e, AppEvent::SampleFailed { sample: 0, .. })),
        1
    );
    assert_eq!(
        r.sink().count(|e| matches!(e, AppEvent::TickFailed { tick: 1, .. })),
        1
    );
}

#[test]
fn run_mode_snapshot_fault_is_not_reported_as_a_tick() {
    let config = SystemConfig {
        fault_policy: FaultPolicy::SkipTick,
        ..short_config()
    };
    let mut r = runner(config, MockEnv::default()).with_max_cycles(Some(1));
    // Ticks 1 and 2 read the light once each; the third read is the
    // first snapshot's.
    r.hw_mut()
        .fail_reads_after(SensorKind::AmbientLight, SensorError::GpioReadFailed, 2, 1);

    let report = r.execute(Mode::Run).unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(
        r.sink().count(|e| matches!(e, AppEvent::SampleFailed { sample: 0, .. })),
        1
    );
    assert_eq!(
        r.sink().count(|e| matches!(e, AppEvent::TickFailed { .. })),
        0
    );
}

// ── Display and manual modes ──────────────────────────────────

#[test]
fn display_reports_soil_as_percent() {
    let mut r = runner(short_config(), MockEnv::default());
    r.execute(Mode::Display).unwrap();
    let telemetry = r.sink().events.iter().find_map(|e| match e {
        AppEvent::Telemetry(t) => Some(*t),
        _ => None,
    });
    let t = telemetry.unwrap();
    assert!((t.soil_moisture_pct - 25.0).abs() < 1e-4);
    assert_eq!(t.light_state, 0);
    assert_eq!(t.co2_ppm, 480);
    assert!(r.hw().calls.is_empty());
}

#[test]
fn manual_lamp_counts_down_then_switches_off() {
    let mut r = runner(short_config(), MockEnv::default());
    r.execute(Mode::Lamp).unwrap();

    assert_eq!(r.hw().calls, vec![ActuatorCall::LampOn, ActuatorCall::LampOff]);
    let countdown: Vec<u32> = r
        .sink()
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Countdown(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(countdown, vec![3, 2, 1]);
    assert_eq!(r.clock().now, Duration::from_secs(3));
}

#[test]
fn manual_fans_mirror_manual_lamp() {
    let mut r = runner(short_config(), MockEnv::default());
    r.execute(Mode::Fans).unwrap();
    assert_eq!(r.hw().calls, vec![ActuatorCall::FansOn, ActuatorCall::FansOff]);
}

#[test]
fn manual_water_pulses_configured_length() {
    let mut r = runner(short_config(), MockEnv::default());
    r.execute(Mode::Water).unwrap();
    assert_eq!(
        r.hw().calls,
        vec![ActuatorCall::PulseValve(Duration::from_millis(2000))]
    );
}
