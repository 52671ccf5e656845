//! Command-line flags.
//!
//! Flags combine; the selected modes always run in [`Mode`] order no
//! matter how they were typed.  No flag at all prints usage.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::runner::Mode;

pub const USAGE: &str = "\
Run the greenhouse control algorithm, one of its test procedures, or
exercise single sensors and actuators.

Usage: greenhouse [OPTIONS]

Options:
  -r,  --run          Greenhouse environmental control operation
  -ct, --control      Test the environmental control capability
  -ht, --heating      Test the heating capability of the lamp
  -vt, --ventilation  Test how ventilation influences the environment
  -d,  --display      Display the current sensor data
  -l,  --lights       Turn the lamp on, then off after the countdown
  -w,  --water        Open the water valve for a short pulse
  -f,  --fans         Turn the fans on, then off after the countdown
       --config PATH  JSON configuration file (default: greenhouse.json)
  -h,  --help         Print this help
";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    pub modes: BTreeSet<Mode>,
    pub config_path: Option<PathBuf>,
    pub help: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    UnknownFlag(String),
    MissingValue(&'static str),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFlag(flag) => write!(f, "unknown flag '{flag}'"),
            Self::MissingValue(flag) => write!(f, "{flag} needs a value"),
        }
    }
}

impl std::error::Error for CliError {}

/// Parse arguments, excluding the program name.
pub fn parse<I, S>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut cmd = Command::default();
    let mut args = args.into_iter().map(Into::<String>::into);

    while let Some(arg) = args.next() {
        let mode = match arg.as_str() {
            "-r" | "--run" => Mode::Run,
            "-ct" | "--control" => Mode::ControlTest,
            "-ht" | "--heating" => Mode::HeatingTest,
            "-vt" | "--ventilation" => Mode::VentilationTest,
            "-d" | "--display" => Mode::Display,
            "-l" | "--lights" => Mode::Lamp,
            "-w" | "--water" => Mode::Water,
            "-f" | "--fans" => Mode::Fans,
            "-h" | "--help" => {
                cmd.help = true;
                continue;
            }
            "--config" => {
                let path = args.next().ok_or(CliError::MissingValue("--config"))?;
                cmd.config_path = Some(PathBuf::from(path));
                continue;
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--config=") {
                    cmd.config_path = Some(PathBuf::from(path));
                    continue;
                }
                return Err(CliError::UnknownFlag(arg));
            }
        };
        cmd.modes.insert(mode);
    }

    if cmd.modes.is_empty() {
        cmd.help = true;
    }
    Ok(cmd)
}
