//! Settings handed to the authentication service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment environment the auth service runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthEnvironment {
    Dev,
    Prod,
}

impl AuthEnvironment {
    pub fn from_dev_flag(dev: bool) -> Self {
        if dev {
            Self::Dev
        } else {
            Self::Prod
        }
    }

    /// `Dev` for debug builds, `Prod` for release builds.
    pub fn from_build() -> Self {
        Self::from_dev_flag(cfg!(debug_assertions))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "DEV",
            Self::Prod => "PROD",
        }
    }
}

impl Default for AuthEnvironment {
    fn default() -> Self {
        Self::from_build()
    }
}

impl fmt::Display for AuthEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

/// Request integration the auth service attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MiddlewareAdapter {
    #[default]
    SvelteKit,
    Web,
    Node,
}

/// Auth service configuration, part of the registry configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub environment: AuthEnvironment,
    /// Remove expired sessions automatically.
    #[serde(default = "default_auto_database_cleanup")]
    pub auto_database_cleanup: bool,
    #[serde(default)]
    pub middleware: MiddlewareAdapter,
}

fn default_auto_database_cleanup() -> bool {
    true
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            environment: AuthEnvironment::default(),
            auto_database_cleanup: default_auto_database_cleanup(),
            middleware: MiddlewareAdapter::default(),
        }
    }
}

impl AuthSettings {
    pub fn with_environment(mut self, environment: AuthEnvironment) -> Self {
        self.environment = environment;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing_and_display() {
        assert_eq!("dev".parse::<AuthEnvironment>().unwrap(), AuthEnvironment::Dev);
        assert_eq!(
            "Production".parse::<AuthEnvironment>().unwrap(),
            AuthEnvironment::Prod
        );
        assert!("staging".parse::<AuthEnvironment>().is_err());
        assert_eq!(AuthEnvironment::Dev.to_string(), "DEV");
        assert_eq!(AuthEnvironment::from_dev_flag(false), AuthEnvironment::Prod);
    }

    #[test]
    fn test_settings_defaults_from_json() {
        let settings: AuthSettings = serde_json::from_str(r#"{"environment": "PROD"}"#).unwrap();
        assert_eq!(settings.environment, AuthEnvironment::Prod);
        assert!(settings.auto_database_cleanup);
        assert_eq!(settings.middleware, MiddlewareAdapter::SvelteKit);
    }
}
