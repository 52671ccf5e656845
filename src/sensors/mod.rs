//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor and implements [`SensorPort`], so the control
//! policy sees one read operation per quantity and never deals with
//! retries, probe pairs, or ADC channels itself.

pub mod co2;
pub mod light;
pub mod probe;
pub mod soil;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use log::trace;

use crate::app::ports::SensorPort;
use crate::config::RetryPolicy;
use crate::control::context::AmbientLight;
use crate::error::{ProbeId, SensorError};
use co2::Co2Sensor;
use light::LightSensor;
use probe::{ClimateProbe, Quantity, mean2, read_with_retry};
use soil::{AdcReader, SoilMoistureSensor};

/// Aggregates all sensor drivers behind [`SensorPort`].
///
/// `D` is the delay used for probe backoff; it blocks the control loop.
pub struct SensorHub<P, C, L, A, D> {
    external: P,
    internal: [P; 2],
    co2: C,
    light: LightSensor<L>,
    soil: SoilMoistureSensor<A>,
    delay: D,
    retry: RetryPolicy,
}

impl<P, C, L, A, D> SensorHub<P, C, L, A, D>
where
    P: ClimateProbe,
    C: Co2Sensor,
    L: InputPin,
    A: AdcReader,
    D: DelayNs,
{
    /// Construct a new hub from pre-built drivers.
    pub fn new(
        external: P,
        internal: [P; 2],
        co2: C,
        light: LightSensor<L>,
        soil: SoilMoistureSensor<A>,
        delay: D,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            external,
            internal,
            co2,
            light,
            soil,
            delay,
            retry,
        }
    }

    /// Both internal probes, first then second, averaged.  A fatal fault on
    /// the first probe skips the second.
    fn read_internal_pair(&mut self, quantity: Quantity) -> Result<f32, SensorError> {
        let [first, second] = &mut self.internal;
        let a = read_with_retry(first, ProbeId::Internal1, quantity, &self.retry, &mut self.delay)?;
        let b = read_with_retry(second, ProbeId::Internal2, quantity, &self.retry, &mut self.delay)?;
        let mean = mean2(a, b);
        trace!("internal {:?}: {a} / {b} -> {mean}", quantity);
        Ok(mean)
    }
}

impl<P, C, L, A, D> SensorPort for SensorHub<P, C, L, A, D>
where
    P: ClimateProbe,
    C: Co2Sensor,
    L: InputPin,
    A: AdcReader,
    D: DelayNs,
{
    fn read_external_temperature(&mut self) -> Result<f32, SensorError> {
        read_with_retry(
            &mut self.external,
            ProbeId::External,
            Quantity::Temperature,
            &self.retry,
            &mut self.delay,
        )
    }

    fn read_internal_temperature(&mut self) -> Result<f32, SensorError> {
        self.read_internal_pair(Quantity::Temperature)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.read_internal_pair(Quantity::Humidity)
    }

    fn read_co2(&mut self) -> Result<u16, SensorError> {
        self.co2.read_ppm()
    }

    fn read_ambient_light(&mut self) -> Result<AmbientLight, SensorError> {
        self.light.read()
    }

    fn read_soil_moisture(&mut self) -> f32 {
        self.soil.read_fraction()
    }
}
