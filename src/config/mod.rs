//! Configuration system
//!
//! Handles TOML config file parsing, CLI argument merging and validation
//! into typed settings.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::domain::parse_positive_duration;
use crate::error::ConfigError;
use crate::selfstate::{SelfStateConfig, SelfStateSettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Logging settings
    pub log: LogConfig,
    /// Health store settings
    pub store: StoreConfig,
    /// Heartbeat probe cadences
    pub heartbeat: HeartbeatConfig,
    /// Self-state monitor settings
    pub selfstate: SelfStateConfig,
    /// Process runtime settings
    pub runtime: RuntimeConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log filter level (error, warn, info, debug, trace)
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend kind: "memory" or "file"
    pub backend: String,
    /// State directory for the file backend
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            path: None,
        }
    }
}

/// Heartbeat probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Ingestion probe cadence
    pub received_check_interval: String,
    /// Match-rate probe cadence
    pub matched_check_interval: String,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            received_check_interval: "5s".to_string(),
            matched_check_interval: "60s".to_string(),
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How long each task gets to exit on shutdown
    pub shutdown_timeout: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: "5s".to_string(),
        }
    }
}

/// Store backend selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
}

/// Validated store settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub backend: StoreBackend,
}

/// Validated heartbeat cadences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatSettings {
    pub received_check_interval: Duration,
    pub matched_check_interval: Duration,
}

/// Fully validated configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_level: log::LevelFilter,
    pub store: StoreSettings,
    pub heartbeat: HeartbeatSettings,
    pub selfstate: SelfStateSettings,
    pub shutdown_timeout: Duration,
}

impl Config {
    /// Validate every table into typed settings
    ///
    /// # Errors
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let log_level =
            log::LevelFilter::from_str(&self.log.level).map_err(|_| ConfigError::InvalidValue {
                key: "log.level".to_string(),
                message: format!("unknown level '{}'", self.log.level),
            })?;

        Ok(Settings {
            log_level,
            store: self.store.to_settings()?,
            heartbeat: self.heartbeat.to_settings()?,
            selfstate: self.selfstate.to_settings()?,
            shutdown_timeout: parse_positive_duration(
                "runtime.shutdown_timeout",
                &self.runtime.shutdown_timeout,
            )?,
        })
    }
}

impl StoreConfig {
    fn to_settings(&self) -> Result<StoreSettings, ConfigError> {
        let backend = match self.backend.trim().to_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "file" => match &self.path {
                Some(path) => StoreBackend::File(path.clone()),
                None => return Err(ConfigError::MissingField("store.path".to_string())),
            },
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "store.backend".to_string(),
                    message: format!("unknown backend '{}', expected memory or file", other),
                })
            }
        };
        Ok(StoreSettings { backend })
    }
}

impl HeartbeatConfig {
    fn to_settings(&self) -> Result<HeartbeatSettings, ConfigError> {
        Ok(HeartbeatSettings {
            received_check_interval: parse_positive_duration(
                "heartbeat.received_check_interval",
                &self.received_check_interval,
            )?,
            matched_check_interval: parse_positive_duration(
                "heartbeat.matched_check_interval",
                &self.matched_check_interval,
            )?,
        })
    }
}
