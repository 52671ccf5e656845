//! Threshold control policy.
//!
//! Three independent decisions, each run once per tick:
//!
//! ```text
//!  LIGHTING     Dark && T_in <= T_thr + 2   ──▶ lamp on
//!               otherwise                   ──▶ lamp off
//!
//!  VENTILATION  RH >= RH_thr                ──▶ fans on   (condensation)
//!               T_in >= T_thr && T_in > T_ext ──▶ fans on (outside is cooler)
//!               otherwise                   ──▶ fans off
//!
//!  WATERING     soil >= soil_thr            ──▶ pulse valve
//! ```
//!
//! There is no hysteresis.  A reading sitting on a boundary may toggle the
//! lamp every tick, and that is accepted.
//!
//! Each decision samples the quantities it needs itself, so one tick may
//! read the internal temperature twice.  Faults are never caught here;
//! they abort the tick and surface to the caller.

use core::time::Duration;

use log::debug;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::config::Thresholds;
use crate::error::Result;

use super::context::{AmbientLight, ControlContext, SensorKind};

// ═══════════════════════════════════════════════════════════════
//  Decisions (pure)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightingDecision {
    LampOn,
    LampOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentilationDecision {
    /// Humidity at or over threshold.
    FansOnHumidity,
    /// Too warm inside and the outside air is cooler.
    FansOnHeat,
    FansOff,
}

impl VentilationDecision {
    pub fn fans_on(self) -> bool {
        !matches!(self, Self::FansOff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WateringDecision {
    Water,
    Skip,
}

pub fn decide_lighting(
    ambient: AmbientLight,
    internal_temp_c: f32,
    thresholds: &Thresholds,
) -> LightingDecision {
    if ambient == AmbientLight::Dark && internal_temp_c <= thresholds.lamp_cutoff_c() {
        LightingDecision::LampOn
    } else {
        LightingDecision::LampOff
    }
}

pub fn decide_ventilation(
    humidity_pct: f32,
    internal_temp_c: f32,
    external_temp_c: f32,
    thresholds: &Thresholds,
) -> VentilationDecision {
    if humidity_pct >= thresholds.humidity_pct {
        VentilationDecision::FansOnHumidity
    } else if internal_temp_c >= thresholds.temperature_c && internal_temp_c > external_temp_c {
        VentilationDecision::FansOnHeat
    } else {
        VentilationDecision::FansOff
    }
}

/// Fires when the soil reads *at or above* the threshold.  This is the
/// rule as calibrated on the board; it has never been validated in the
/// field (the valve does not open at the current supply pressure).
pub fn decide_watering(soil_fraction: f32, thresholds: &Thresholds) -> WateringDecision {
    if soil_fraction >= thresholds.moisture {
        WateringDecision::Water
    } else {
        WateringDecision::Skip
    }
}

// ═══════════════════════════════════════════════════════════════
//  ControlPolicy (read → decide → act)
// ═══════════════════════════════════════════════════════════════

pub struct ControlPolicy {
    thresholds: Thresholds,
    watering_pulse: Duration,
}

impl ControlPolicy {
    pub fn new(thresholds: Thresholds, watering_pulse: Duration) -> Self {
        Self {
            thresholds,
            watering_pulse,
        }
    }

    pub fn watering_pulse(&self) -> Duration {
        self.watering_pulse
    }

    /// Read light and internal temperature, then switch the lamp.
    pub fn control_lighting(
        &self,
        hw: &mut (impl SensorPort + ActuatorPort),
        ctx: &mut ControlContext,
    ) -> Result<LightingDecision> {
        let ambient = hw.read_ambient_light()?;
        ctx.record(SensorKind::AmbientLight, f32::from(ambient.code()));
        let internal = hw.read_internal_temperature()?;
        ctx.record(SensorKind::InternalTemperature, internal);

        let decision = decide_lighting(ambient, internal, &self.thresholds);
        debug!(
            "lighting: {:?} at {:.2}\u{00b0}C (cutoff {:.1}) -> {:?}",
            ambient,
            internal,
            self.thresholds.lamp_cutoff_c(),
            decision
        );

        match decision {
            LightingDecision::LampOn => hw.turn_lamp_on()?,
            LightingDecision::LampOff => hw.turn_lamp_off()?,
        }
        Ok(decision)
    }

    /// Read humidity, internal and external temperature, then switch the fans.
    pub fn control_ventilation(
        &self,
        hw: &mut (impl SensorPort + ActuatorPort),
        ctx: &mut ControlContext,
    ) -> Result<VentilationDecision> {
        let humidity = hw.read_humidity()?;
        ctx.record(SensorKind::Humidity, humidity);
        let internal = hw.read_internal_temperature()?;
        ctx.record(SensorKind::InternalTemperature, internal);
        let external = hw.read_external_temperature()?;
        ctx.record(SensorKind::ExternalTemperature, external);

        let decision = decide_ventilation(humidity, internal, external, &self.thresholds);
        debug!(
            "ventilation: RH={:.2}% in={:.2} out={:.2} -> {:?}",
            humidity, internal, external, decision
        );

        if decision.fans_on() {
            hw.turn_fans_on()?;
        } else {
            hw.turn_fans_off()?;
        }
        Ok(decision)
    }

    /// Read soil moisture and pulse the valve when the rule fires.
    pub fn control_watering(
        &self,
        hw: &mut (impl SensorPort + ActuatorPort),
        ctx: &mut ControlContext,
    ) -> Result<WateringDecision> {
        let soil = hw.read_soil_moisture();
        ctx.record(SensorKind::SoilMoisture, soil);

        let decision = decide_watering(soil, &self.thresholds);
        debug!(
            "watering: soil={:.3} (threshold {:.3}) -> {:?}",
            soil, self.thresholds.moisture, decision
        );

        if decision == WateringDecision::Water {
            hw.pulse_valve(self.watering_pulse)?;
            ctx.watered = true;
        }
        Ok(decision)
    }
}
