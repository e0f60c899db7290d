//! Registry configuration: storage location, collection source, auth and logging.

pub mod error;

pub use error::{ConfigError, ConfigResult};

use crate::auth::AuthSettings;
use crate::logging::LogConfig;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "FOLD_MODELS_CONFIG";
/// Environment variable overriding the database name.
pub const DB_NAME_ENV: &str = "DB_NAME";
/// Environment variable overriding the auth environment (`dev` / `prod`).
pub const ENVIRONMENT_ENV: &str = "FOLD_MODELS_ENV";

const DEFAULT_CONFIG_PATH: &str = "config/registry_config.json";

/// Configuration for a [`crate::database::ModelDatabase`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding the databases
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Name of the database inside `storage_path`
    #[serde(default = "default_db_name")]
    pub db_name: String,
    /// Directory of collection description files published at startup
    #[serde(default)]
    pub collections_dir: Option<PathBuf>,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LogConfig,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_db_name() -> String {
    "fold_models".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            db_name: default_db_name(),
            collections_dir: None,
            auth: AuthSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl RegistryConfig {
    /// Create a new configuration with the specified storage path
    pub fn new(storage_path: PathBuf) -> Self {
        Self {
            storage_path,
            ..Default::default()
        }
    }

    pub fn with_db_name(mut self, db_name: &str) -> Self {
        self.db_name = db_name.to_string();
        self
    }

    pub fn with_collections_dir(mut self, dir: PathBuf) -> Self {
        self.collections_dir = Some(dir);
        self
    }

    /// Full path of the database directory.
    pub fn database_path(&self) -> PathBuf {
        self.storage_path.join(&self.db_name)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.db_name.trim().is_empty() {
            return Err(ConfigError::validation("db_name must not be empty"));
        }
        if self.db_name.contains(['/', '\\']) {
            return Err(ConfigError::validation(format!(
                "db_name '{}' must not contain path separators",
                self.db_name
            )));
        }
        self.logging.validate()?;
        Ok(())
    }

    /// Applies `DB_NAME` and `FOLD_MODELS_ENV` using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_name) = lookup(DB_NAME_ENV) {
            self.db_name = db_name;
        }
        if let Some(environment) = lookup(ENVIRONMENT_ENV) {
            self.auth.environment = environment.parse().map_err(ConfigError::Validation)?;
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Parses a configuration file, TOML when the extension is `.toml`, JSON otherwise.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config = if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            serde_json::from_str(&contents)?
        };
        Ok(config)
    }
}

/// Load the registry configuration from the given path or from the
/// `FOLD_MODELS_CONFIG` environment variable.
///
/// If the file does not exist, a default [`RegistryConfig`] is used. Environment
/// overrides are applied in both cases and the result is validated.
pub fn load_registry_config(path: Option<&str>) -> ConfigResult<RegistryConfig> {
    let config_path = path
        .map(|p| p.to_string())
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config_path = PathBuf::from(config_path);

    let mut config = if config_path.exists() {
        RegistryConfig::from_file(&config_path).map_err(|e| {
            error!(
                "Failed to parse registry configuration {}: {}",
                config_path.display(),
                e
            );
            e
        })?
    } else {
        info!(
            "No configuration at {}, using defaults",
            config_path.display()
        );
        RegistryConfig::default()
    };

    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}
