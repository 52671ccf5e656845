//! Pin and channel assignments for the greenhouse board (BCM numbering).
//!
//! Single source of truth: every backend references this module rather
//! than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Temperature / humidity probes (single-wire DHT11 family)
// ---------------------------------------------------------------------------

/// Probe outside the enclosure.
pub const PROBE_EXTERNAL_GPIO: u8 = 25;
/// First probe inside the enclosure.
pub const PROBE_INTERNAL_1_GPIO: u8 = 23;
/// Second probe inside the enclosure.
pub const PROBE_INTERNAL_2_GPIO: u8 = 24;

// ---------------------------------------------------------------------------
// Sensors: digital / pulse
// ---------------------------------------------------------------------------

/// LDR comparator output.  LOW = too dark, HIGH = enough light.
/// Sensitivity is set by a trim pot on the board.
pub const LIGHT_SENSE_GPIO: u8 = 14;

/// MH-Z19 CO2 sensor PWM output.
pub const CO2_PWM_GPIO: u8 = 12;
/// Upper end of the CO2 sensor's configured measuring range (ppm).
pub const CO2_RANGE_PPM: u16 = 2000;

// ---------------------------------------------------------------------------
// Sensors: analog (MCP3008, 10-bit)
// ---------------------------------------------------------------------------

/// VMA303 soil moisture probe.
pub const ADC_CH_SOIL: u8 = 1;
/// Number of distinct codes of the converter (10 bits).
pub const ADC_FULL_SCALE: u16 = 1024;

// ---------------------------------------------------------------------------
// Relay outputs (active HIGH, all configured LOW at init)
// ---------------------------------------------------------------------------

/// Intake and extractor fans.
pub const FANS_GPIO: u8 = 17;
/// Normally-open solenoid water valve.
pub const WATER_VALVE_GPIO: u8 = 27;
/// LED grow lamp.
pub const LAMP_GPIO: u8 = 22;
