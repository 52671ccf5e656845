//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] on a single JSON document.  A missing file
//! means "use defaults"; a present but unreadable or invalid file is an
//! error, so a typo never silently reverts the thresholds.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("config: {} not found, using defaults", self.path.display());
                return Ok(SystemConfig::default());
            }
            Err(e) => {
                warn!("config: cannot read {}: {}", self.path.display(), e);
                return Err(ConfigError::IoError);
            }
        };

        let cfg: SystemConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("config: {} is not valid: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        cfg.validate()?;
        info!("config: loaded {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::IoError)?;
        fs::write(&self.path, text).map_err(|e| {
            warn!("config: cannot write {}: {}", self.path.display(), e);
            ConfigError::IoError
        })?;
        info!("config: saved {}", self.path.display());
        Ok(())
    }
}
