//! Configuration management for minichain

use crate::error::{ChainError, Result};
use crate::miner::DEFAULT_CANCEL_CHECK_INTERVAL;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "minichain.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub miner: MinerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MinerConfig {
    #[serde(default = "default_beneficiary")]
    pub beneficiary_address: String,
    /// Proof-of-work attempts between two checks of the cancel flag.
    #[serde(default = "default_cancel_check_interval")]
    pub cancel_check_interval: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            beneficiary_address: default_beneficiary(),
            cancel_check_interval: default_cancel_check_interval(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_beneficiary() -> String {
    "miner".to_string()
}

fn default_cancel_check_interval() -> u64 {
    DEFAULT_CANCEL_CHECK_INTERVAL
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.miner.beneficiary_address.is_empty() {
            return Err(ChainError::ConfigError(
                "miner.beneficiary_address must not be empty".to_string(),
            ));
        }
        if self.miner.cancel_check_interval == 0 {
            return Err(ChainError::ConfigError(
                "miner.cancel_check_interval must be at least 1".to_string(),
            ));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ChainError::ConfigError(format!(
                "logging.level {:?} is not a valid level",
                self.logging.level
            )));
        }
        Ok(())
    }
}

/// Load `minichain.toml` from the working directory.
pub fn load_config() -> Result<Config> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Load configuration from `path`. A missing file yields the defaults.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config: Config = match fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(e) => return Err(e.into()),
    };

    config.validate()?;
    Ok(config)
}
