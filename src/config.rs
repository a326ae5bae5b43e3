//! Node configuration
//!
//! Operator settings read from a TOML file. Protocol constants live in
//! `crate::constants` and are never configurable.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use crate::consensus::{HardforkProperties, NetworkShares};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub treasury: TreasuryConfig,
    #[serde(default)]
    pub hardfork: HardforkConfig,
    /// Coinbase split per network, supplied by the chain parameters
    #[serde(default)]
    pub networks: Vec<NetworkShares>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreasuryConfig {
    /// Where the treasury mempool database lives
    #[serde(default = "default_treasury_path")]
    pub path: PathBuf,
    /// Sweep expired proposals on startup
    #[serde(default = "default_sweep_on_start")]
    pub sweep_on_start: bool,
}

impl Default for TreasuryConfig {
    fn default() -> Self {
        Self {
            path: default_treasury_path(),
            sweep_on_start: default_sweep_on_start(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HardforkConfig {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub activation_time: u32,
}

impl HardforkConfig {
    pub fn properties(&self) -> HardforkProperties {
        HardforkProperties::new(self.id, self.activation_time)
    }
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.treasury.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("treasury.path must be set".to_string()));
        }

        for shares in &self.networks {
            if shares.network.is_empty() {
                return Err(ConfigError::Invalid("network name must not be empty".to_string()));
            }
            if shares.miner_percent() < 0 {
                return Err(ConfigError::Invalid(format!(
                    "network {}: treasury and masternode shares exceed 100%",
                    shares.network
                )));
            }
        }

        Ok(())
    }
}

fn default_treasury_path() -> PathBuf {
    PathBuf::from("./data/treasury")
}

fn default_sweep_on_start() -> bool {
    true
}
