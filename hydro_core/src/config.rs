//! Configuration file support for Hydro.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/hydro/config.toml`.
//! It covers installation concerns (where data lives, ambient defaults);
//! user preferences edited through the CLI live in the settings store.

use crate::types::DEFAULT_TEMPERATURE_CELSIUS;
use crate::{Environment, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub reminders: RemindersConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Fallback values for inputs the user did not supply
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Ambient temperature assumed when none is given
    #[serde(default = "default_temperature")]
    pub temperature_celsius: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            temperature_celsius: default_temperature(),
        }
    }
}

/// Reminder timer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// How often `hydro watch` wakes up to poll the timer
    #[serde(default = "default_watch_tick_seconds")]
    pub watch_tick_seconds: u64,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            watch_tick_seconds: default_watch_tick_seconds(),
        }
    }
}

fn home_dir_or(fallback: &str) -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(fallback),
        None => PathBuf::from(".").join(fallback),
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| home_dir_or(".local/share"))
        .join("hydro")
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE_CELSIUS
}

fn default_watch_tick_seconds() -> u64 {
    30
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.defaults.temperature_celsius.is_finite() {
            return Err(Error::Config(
                "defaults.temperature_celsius must be a finite number".into(),
            ));
        }
        if self.reminders.watch_tick_seconds == 0 {
            return Err(Error::Config(
                "reminders.watch_tick_seconds must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| home_dir_or(".config"))
            .join("hydro")
            .join("config.toml")
    }

    /// Environment for an optional temperature observation
    pub fn environment(&self, temperature_celsius: Option<f64>) -> Environment {
        Environment::new(temperature_celsius.unwrap_or(self.defaults.temperature_celsius))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
