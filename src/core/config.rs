//! Configuration management with layered hierarchy
//!
//! Sources, lowest priority first: built-in defaults, the global user file
//! (`~/.config/academy/config.yaml`), an explicit `--config` file, then
//! `ACADEMY_*` environment variables. Command flags override all of these.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Public country list used when nothing else is configured
pub const DEFAULT_COUNTRY_API_URL: &str = "https://restcountries.com/v3.1/all?fields=name,cca2";

/// Public state list service used when nothing else is configured
pub const DEFAULT_STATE_API_URL: &str = "https://api.countrystatecity.in/v1";

/// Configuration keys: (key, environment variable, description)
pub const CONFIG_KEYS: &[(&str, &str, &str)] = &[
    ("base_url", "ACADEMY_BASE_URL", "Backend base URL; courses are posted to {base_url}/course"),
    ("state_api_key", "ACADEMY_STATE_API_KEY", "API key sent to the state list service"),
    ("country_api_url", "ACADEMY_COUNTRY_API_URL", "Country list endpoint"),
    ("state_api_url", "ACADEMY_STATE_API_URL", "State list service base URL"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not configured (set {env} or run `academy config set {key} <value>`)")]
    Missing { key: &'static str, env: &'static str },

    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Academy configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub base_url: Option<String>,

    /// API key for the state list service
    pub state_api_key: Option<String>,

    /// Country list endpoint
    pub country_api_url: Option<String>,

    /// State list service base URL
    pub state_api_url: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// An unreadable global file is skipped; an explicit file that can't be
    /// read or parsed is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(global) = Self::read_file(&global_path) {
                    config.merge(global);
                }
            }
        }

        if let Some(path) = explicit {
            config.merge(Self::read_file(path)?);
        }

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse a single YAML config file
    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "academy")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Overlay non-empty environment values
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (key, env, _) in CONFIG_KEYS {
            if let Some(value) = lookup(env).filter(|v| !v.trim().is_empty()) {
                if let Some(slot) = self.slot_mut(key) {
                    *slot = Some(value);
                }
            }
        }
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.state_api_key.is_some() {
            self.state_api_key = other.state_api_key;
        }
        if other.country_api_url.is_some() {
            self.country_api_url = other.country_api_url;
        }
        if other.state_api_url.is_some() {
            self.state_api_url = other.state_api_url;
        }
    }

    /// Look up a value by key name
    pub fn get(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        let value = match key {
            "base_url" => &self.base_url,
            "state_api_key" => &self.state_api_key,
            "country_api_url" => &self.country_api_url,
            "state_api_url" => &self.state_api_url,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value.as_deref())
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "base_url" => Some(&mut self.base_url),
            "state_api_key" => Some(&mut self.state_api_key),
            "country_api_url" => Some(&mut self.country_api_url),
            "state_api_url" => Some(&mut self.state_api_url),
            _ => None,
        }
    }

    /// Backend base URL, required for course submission
    pub fn base_url(&self) -> Result<&str, ConfigError> {
        self.base_url.as_deref().ok_or(ConfigError::Missing {
            key: "base_url",
            env: "ACADEMY_BASE_URL",
        })
    }

    /// State service API key, required for state lookups
    pub fn state_api_key(&self) -> Result<&str, ConfigError> {
        self.state_api_key.as_deref().ok_or(ConfigError::Missing {
            key: "state_api_key",
            env: "ACADEMY_STATE_API_KEY",
        })
    }

    pub fn country_api_url(&self) -> &str {
        self.country_api_url
            .as_deref()
            .unwrap_or(DEFAULT_COUNTRY_API_URL)
    }

    pub fn state_api_url(&self) -> &str {
        self.state_api_url.as_deref().unwrap_or(DEFAULT_STATE_API_URL)
    }
}

/// True if `key` names a configuration value
pub fn is_valid_key(key: &str) -> bool {
    CONFIG_KEYS.iter().any(|(k, _, _)| *k == key)
}
