//! Service configuration.
//!
//! Values come from three layers, later ones winning:
//!   1. built-in defaults
//!   2. an optional TOML file (`AQI_CONFIG`, default `aqi_service.toml`)
//!   3. environment variables, after `.env` has been loaded by `main`
//!
//! Example file:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [provider]
//! token = "your-waqi-token"
//! timeout_secs = 10
//!
//! [history]
//! capacity = 500
//! default_days = 7
//! max_days = 90
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::history::DEFAULT_CAPACITY;
use crate::ingest::waqi::WAQI_BASE_URL;

pub const DEFAULT_CONFIG_PATH: &str = "aqi_service.toml";

/// Largest history window `max_days` may allow (about ten years).
pub const MAX_DAYS_CEILING: u32 = 3650;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// WAQI API token. The public "demo" token only answers for a few cities.
    pub token: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: WAQI_BASE_URL.to_string(),
            token: "demo".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum observations kept in memory.
    pub capacity: usize,
    /// Window used by `/api/history` when `days` is omitted.
    pub default_days: u32,
    /// Requested windows are clamped to `1..=max_days`.
    pub max_days: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            default_days: 7,
            max_days: 90,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub history: HistoryConfig,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Loads configuration from `AQI_CONFIG` (or the default path) and the
    /// process environment. A missing file at the default path is not an
    /// error; a missing file named explicitly by `AQI_CONFIG` is.
    pub fn load() -> Result<Self, ConfigError> {
        let (path, required) = match env::var("AQI_CONFIG") {
            Ok(p) => (PathBuf::from(p), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let mut config = if required || path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies environment overrides. `lookup` is injected so tests don't
    /// have to touch the real process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_env("PORT", &port)?;
        }
        if let Some(token) = lookup("WAQI_TOKEN") {
            self.provider.token = token;
        }
        if let Some(base_url) = lookup("WAQI_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Some(capacity) = lookup("HISTORY_CAPACITY") {
            self.history.capacity = parse_env("HISTORY_CAPACITY", &capacity)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let h = &self.history;
        if h.capacity == 0 {
            return Err(ConfigError::Invalid("history.capacity must be at least 1".into()));
        }
        if h.max_days == 0 || h.max_days > MAX_DAYS_CEILING {
            return Err(ConfigError::Invalid(format!(
                "history.max_days must be between 1 and {}",
                MAX_DAYS_CEILING
            )));
        }
        if h.default_days == 0 || h.default_days > h.max_days {
            return Err(ConfigError::Invalid(format!(
                "history.default_days must be between 1 and {}",
                h.max_days
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        name,
        reason: format!("'{}': {}", raw, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history.capacity, 500);
        assert_eq!(config.history.max_days, 90);
        assert_eq!(config.provider.base_url, "https://api.waqi.info");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 8081

            [history]
            capacity = 50
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.history.capacity, 50);
        assert_eq!(config.history.default_days, 7);
        assert_eq!(config.provider.token, "demo");
    }

    #[test]
    fn test_unparseable_toml_is_an_error() {
        assert!(Config::from_toml_str("[server\nport = ").is_err());
        assert!(Config::from_toml_str("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::default();
        config
            .apply_env(env_of(&[
                ("PORT", "9090"),
                ("WAQI_TOKEN", "secret"),
                ("HISTORY_CAPACITY", "25"),
            ]))
            .expect("overrides should apply");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.provider.token, "secret");
        assert_eq!(config.history.capacity, 25);
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
    }

    #[test]
    fn test_bad_env_value_names_the_variable() {
        let mut config = Config::default();
        let err = config
            .apply_env(env_of(&[("PORT", "not-a-port")]))
            .expect_err("non-numeric port should fail");
        assert!(err.to_string().contains("PORT"), "got: {}", err);
    }

    #[test]
    fn test_validation_rejects_zero_capacity_and_bad_windows() {
        let mut config = Config::default();
        config.history.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.history.default_days = 120;
        assert!(config.validate().is_err(), "default window beyond max_days");

        let mut config = Config::default();
        config.history.max_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_caps_max_days() {
        let mut config = Config::default();
        config.history.max_days = MAX_DAYS_CEILING;
        assert!(config.validate().is_ok(), "the ceiling itself is allowed");

        config.history.max_days = MAX_DAYS_CEILING + 1;
        assert!(config.validate().is_err());

        config.history.max_days = u32::MAX;
        let err = config.validate().expect_err("u32::MAX days should be rejected");
        assert!(err.to_string().contains("max_days"), "got: {}", err);
    }

    #[test]
    fn test_missing_explicit_file_is_a_read_error() {
        let err = Config::from_file(Path::new("/nonexistent/aqi_service.toml"))
            .expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
