//! Capacitive soil-moisture probe on an external ADC.
//!
//! The analog signal is noisy, so each read averages a burst of
//! conversions and reports the mean as a fraction of full scale.

use log::trace;

/// Conversions averaged per soil read.
pub const SOIL_SAMPLES: u32 = 10;

/// Multi-channel ADC.
pub trait AdcReader {
    /// One raw conversion on `channel`.
    fn read(&mut self, channel: u8) -> u16;

    /// Exclusive upper bound of a raw conversion.
    fn full_scale(&self) -> u16;
}

pub struct SoilMoistureSensor<A> {
    adc: A,
    channel: u8,
}

impl<A: AdcReader> SoilMoistureSensor<A> {
    pub fn new(adc: A, channel: u8) -> Self {
        Self { adc, channel }
    }

    /// Mean of [`SOIL_SAMPLES`] conversions divided by full scale.
    pub fn read_fraction(&mut self) -> f32 {
        let sum: u32 = (0..SOIL_SAMPLES)
            .map(|_| u32::from(self.adc.read(self.channel)))
            .sum();
        let mean = sum as f32 / SOIL_SAMPLES as f32;
        let fraction = mean / f32::from(self.adc.full_scale());
        trace!("soil ch{}: mean raw {:.1} -> {:.4}", self.channel, mean, fraction);
        fraction
    }
}
