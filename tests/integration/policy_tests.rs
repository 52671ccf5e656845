//! Integration tests for the AppService → ControlPolicy → actuators
//! pipeline against the recording mock hardware.

use std::time::Duration;

use greenhouse::app::events::AppEvent;
use greenhouse::app::ports::ActuatorPort;
use greenhouse::app::service::AppService;
use greenhouse::config::SystemConfig;
use greenhouse::control::context::{AmbientLight, ControlContext, SensorKind};
use greenhouse::control::policy::{ControlPolicy, VentilationDecision, WateringDecision};
use greenhouse::drivers::Actuator;
use greenhouse::error::{ActuatorError, Error, ProbeId, SensorError};

use crate::mock_hw::{ActuatorCall, MockEnv, MockHardware, RecordingSink};

fn make_app(config: &SystemConfig, env: MockEnv) -> (AppService, MockHardware, RecordingSink) {
    (
        AppService::new(config),
        MockHardware::new(env),
        RecordingSink::default(),
    )
}

// ── Lighting ──────────────────────────────────────────────────

#[test]
fn dark_and_cool_turns_lamp_on() {
    let env = MockEnv {
        light: AmbientLight::Dark,
        internal_c: 20.0,
        ..MockEnv::default()
    };
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), env);

    let ctx = app.tick(&mut hw, &mut sink).unwrap();
    assert!(ctx.actuators.lamp_on);
    assert!(hw.lamp_state());
    assert_eq!(hw.calls.first(), Some(&ActuatorCall::LampOn));
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::ActuatorChanged {
                actuator: Actuator::Lamp,
                on: true
            }
        )),
        1
    );
}

#[test]
fn lamp_stays_on_at_exactly_two_degrees_over() {
    let env = MockEnv {
        light: AmbientLight::Dark,
        internal_c: 26.0,
        ..MockEnv::default()
    };
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), env);
    app.tick(&mut hw, &mut sink).unwrap();
    assert!(hw.lamp_state());

    hw.env.internal_c = 26.01;
    app.tick(&mut hw, &mut sink).unwrap();
    assert!(!hw.lamp_state());
}

#[test]
fn repeated_ticks_rewrite_but_do_not_re_announce() {
    let env = MockEnv {
        light: AmbientLight::Dark,
        ..MockEnv::default()
    };
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), env);
    for _ in 0..3 {
        app.tick(&mut hw, &mut sink).unwrap();
    }
    assert_eq!(hw.count(&ActuatorCall::LampOn), 3);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ActuatorChanged { .. })),
        1
    );
    assert_eq!(app.tick_count(), 3);
}

// ── Ventilation ───────────────────────────────────────────────

#[test]
fn humidity_wins_even_when_outside_is_warmer() {
    let env = MockEnv {
        humidity_pct: 70.0,
        internal_c: 18.0,
        external_c: 25.0,
        ..MockEnv::default()
    };
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), env);
    let ctx = app.tick(&mut hw, &mut sink).unwrap();
    assert!(ctx.actuators.fans_on);
}

#[test]
fn warm_inside_vents_only_to_cooler_outside() {
    let env = MockEnv {
        internal_c: 25.0,
        external_c: 20.0,
        ..MockEnv::default()
    };
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), env);
    app.tick(&mut hw, &mut sink).unwrap();
    assert!(hw.fan_state());

    hw.env.external_c = 25.0;
    app.tick(&mut hw, &mut sink).unwrap();
    assert!(!hw.fan_state());
    assert_eq!(hw.last_call(), Some(&ActuatorCall::FansOff));
}

#[test]
fn each_decision_reads_its_own_sensors() {
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), MockEnv::default());
    let ctx = app.tick(&mut hw, &mut sink).unwrap();
    assert_eq!(
        hw.reads,
        vec![
            SensorKind::AmbientLight,
            SensorKind::InternalTemperature,
            SensorKind::Humidity,
            SensorKind::InternalTemperature,
            SensorKind::ExternalTemperature,
        ]
    );
    assert_eq!(ctx.sample_count(SensorKind::InternalTemperature), 2);
    assert_eq!(ctx.latest(SensorKind::SoilMoisture), None);
}

// ── Watering ──────────────────────────────────────────────────

#[test]
fn watering_is_off_by_default() {
    let env = MockEnv {
        soil: 0.9,
        ..MockEnv::default()
    };
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), env);
    let ctx = app.tick(&mut hw, &mut sink).unwrap();
    assert!(!ctx.watered);
    assert!(!hw.reads.contains(&SensorKind::SoilMoisture));
}

#[test]
fn watering_fires_at_exactly_the_threshold() {
    let mut config = SystemConfig::default();
    config.watering_enabled = true;
    let env = MockEnv {
        soil: config.thresholds.moisture,
        ..MockEnv::default()
    };
    let (mut app, mut hw, mut sink) = make_app(&config, env);

    let ctx = app.tick(&mut hw, &mut sink).unwrap();
    assert!(ctx.watered);
    assert_eq!(
        hw.last_call(),
        Some(&ActuatorCall::PulseValve(Duration::from_secs(3)))
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ValvePulsed(_))),
        1
    );
}

#[test]
fn policy_watering_skips_below_threshold() {
    let config = SystemConfig::default();
    let policy = ControlPolicy::new(config.thresholds, config.watering_pulse());
    let mut hw = MockHardware::new(MockEnv {
        soil: 0.49,
        ..MockEnv::default()
    });
    let mut ctx = ControlContext::new(1);
    assert_eq!(
        policy.control_watering(&mut hw, &mut ctx).unwrap(),
        WateringDecision::Skip
    );
    assert!(hw.calls.is_empty());
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn fatal_fault_aborts_the_rest_of_the_tick() {
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), MockEnv::default());
    let fault = SensorError::ProbeFault {
        probe: ProbeId::Internal1,
        reason: "no response",
    };
    hw.fail_reads(SensorKind::InternalTemperature, fault, 1);

    let err = app.tick(&mut hw, &mut sink).unwrap_err();
    assert_eq!(err, Error::Sensor(fault));
    assert!(hw.calls.is_empty(), "no actuator command after the fault");
    assert!(!hw.reads.contains(&SensorKind::Humidity));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::TickFailed { tick: 1, .. })),
        1
    );

    // The next tick starts from scratch.
    assert!(app.tick(&mut hw, &mut sink).is_ok());
}

#[test]
fn fault_in_ventilation_keeps_lighting_command() {
    let env = MockEnv {
        light: AmbientLight::Dark,
        ..MockEnv::default()
    };
    let (mut app, mut hw, mut sink) = make_app(&SystemConfig::default(), env);
    hw.fail_reads(SensorKind::Humidity, SensorError::GpioReadFailed, 1);

    assert!(app.tick(&mut hw, &mut sink).is_err());
    assert!(hw.lamp_state());
    assert_eq!(hw.calls, vec![ActuatorCall::LampOn]);
}

#[test]
fn failed_actuator_write_surfaces_and_keeps_state() {
    let env = MockEnv {
        internal_c: 25.0,
        external_c: 10.0,
        ..MockEnv::default()
    };
    let config = SystemConfig::default();
    let policy = ControlPolicy::new(config.thresholds, config.watering_pulse());
    let mut hw = MockHardware::new(env);
    hw.broken = Some(Actuator::Fans);
    let mut ctx = ControlContext::new(1);

    let err = policy.control_ventilation(&mut hw, &mut ctx).unwrap_err();
    assert_eq!(
        err,
        Error::Actuator(ActuatorError::GpioWriteFailed(Actuator::Fans))
    );
    assert!(!hw.fan_state());

    hw.broken = None;
    assert_eq!(
        policy.control_ventilation(&mut hw, &mut ctx).unwrap(),
        VentilationDecision::FansOnHeat
    );
}
