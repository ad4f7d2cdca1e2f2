//! Configuration file support for the bridge.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/sabridge/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

/// Bridge-side settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Deepest nesting accepted by the property converter
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_depth: default_max_depth(),
        }
    }
}

/// Unit used for the duration attached to timer events
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    #[default]
    Milliseconds,
    Seconds,
}

/// Timer event settings for the reference engine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimerConfig {
    #[serde(default = "default_duration_key")]
    pub duration_key: String,

    #[serde(default)]
    pub unit: TimeUnit,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_key: default_duration_key(),
            unit: TimeUnit::default(),
        }
    }
}

/// Reference engine settings
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    /// Fixed anonymous id; a random one is generated when unset
    #[serde(default)]
    pub anonymous_id: Option<String>,

    /// JSONL file receiving every emitted event
    #[serde(default)]
    pub events_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_max_depth() -> usize {
    16
}

fn default_duration_key() -> String {
    "event_duration".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
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

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .ok_or_else(|| Error::Config("no config directory available".into()))?,
        };
        Ok(base.join("sabridge").join("config.toml"))
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

    /// Reject settings the bridge cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.bridge.max_depth == 0 {
            return Err(Error::Config("bridge.max_depth must be at least 1".into()));
        }
        if self.timer.duration_key.is_empty() {
            return Err(Error::Config("timer.duration_key must not be empty".into()));
        }
        Ok(())
    }
}
