//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements         | Connects to                  |
//! |---------------|--------------------|------------------------------|
//! | `hardware`    | SensorPort         | SensorHub (probes, ADC, CO2) |
//! |               | ActuatorPort       | relay and valve drivers      |
//! | `sim`         | embedded-hal lines | simulated greenhouse model   |
//! | `log_sink`    | EventSink          | `log` facade                 |
//! | `csv_log`     | RecordSink         | comma-delimited sample files |
//! | `config_file` | ConfigPort         | JSON file                    |
//! | `time`        | ClockPort, DelayNs | `std::time`, `std::thread`   |

pub mod config_file;
pub mod csv_log;
pub mod hardware;
pub mod log_sink;
pub mod sim;
pub mod time;
