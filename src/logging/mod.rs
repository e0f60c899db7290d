//! # Logging
//!
//! Installs an `env_logger` backend for the `log` facade. The default level
//! and per-feature levels come from [`LogConfig`]; a feature is a module of
//! this crate such as `resolver` or `registry`.

use crate::config::{ConfigError, ConfigResult};
use log::LevelFilter;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Global logging configuration instance
static LOGGING_CONFIG: OnceCell<LogConfig> = OnceCell::new();

/// Log levels for the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub default_level: String,
    /// Feature-specific log levels
    #[serde(default)]
    pub features: HashMap<String, String>,
}

fn default_level() -> String {
    "INFO".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: default_level(),
            features: HashMap::new(),
        }
    }
}

impl LogConfig {
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: LogConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn with_feature(mut self, feature: &str, level: &str) -> Self {
        self.features.insert(feature.to_string(), level.to_string());
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        parse_level(&self.default_level).ok_or_else(|| {
            ConfigError::validation(format!("Invalid log level: {}", self.default_level))
        })?;
        for (feature, level) in &self.features {
            parse_level(level).ok_or_else(|| {
                ConfigError::validation(format!(
                    "Invalid log level '{}' for feature '{}'",
                    level, feature
                ))
            })?;
        }
        Ok(())
    }

    /// Module path the level of `feature` applies to.
    fn module_for(feature: &str) -> String {
        format!("{}::{}", env!("CARGO_CRATE_NAME"), feature)
    }
}

/// Parses `TRACE`, `DEBUG`, `INFO`, `WARN`, `ERROR` or `OFF`, ignoring case.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_ascii_uppercase().as_str() {
        "TRACE" => Some(LevelFilter::Trace),
        "DEBUG" => Some(LevelFilter::Debug),
        "INFO" => Some(LevelFilter::Info),
        "WARN" => Some(LevelFilter::Warn),
        "ERROR" => Some(LevelFilter::Error),
        "OFF" => Some(LevelFilter::Off),
        _ => None,
    }
}

pub struct LoggingSystem;

impl LoggingSystem {
    /// Installs the logger. `RUST_LOG`, when set, is applied on top of `config`.
    pub fn init_with_config(config: LogConfig) -> Result<(), LoggingError> {
        config.validate()?;

        let mut builder = env_logger::Builder::new();
        builder.filter_level(parse_level(&config.default_level).unwrap_or(LevelFilter::Info));
        for (feature, level) in &config.features {
            if let Some(filter) = parse_level(level) {
                builder.filter_module(&LogConfig::module_for(feature), filter);
            }
        }
        if let Ok(filters) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }

        LOGGING_CONFIG
            .set(config)
            .map_err(|_| LoggingError::AlreadyInitialized)?;
        builder.try_init()?;
        Ok(())
    }

    /// Captured test logging; repeated calls are ignored.
    pub fn init_for_tests() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .try_init();
    }
}

/// Logging system errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logging system already initialized")]
    AlreadyInitialized,
    #[error("Failed to install logger: {0}")]
    SetLogger(#[from] log::SetLoggerError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
