//! Configuration management for fieldnotes.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fieldnotes";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "notes.db";

/// Key under which the notes collection has always been persisted.
pub const DEFAULT_NOTES_KEY: &str = "pwa_notes_v1";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FIELDNOTES_`)
/// 2. TOML config file at `~/.config/fieldnotes/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Capture configuration.
    pub capture: CaptureConfig,
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Connectivity probe configuration.
    pub network: NetworkConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/fieldnotes/notes.db`
    pub database_path: Option<PathBuf>,
    /// Key holding the serialized notes collection.
    pub notes_key: String,
}

/// Capture-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Upper bound on a single geolocation request in milliseconds.
    pub geo_timeout_ms: u64,
    /// Ask the location provider for its most accurate fix.
    pub high_accuracy: bool,
    /// JPEG quality for snapshots (1-100).
    pub jpeg_quality: u8,
    /// Snapshot width used when the stream reports no dimensions.
    pub fallback_width: u32,
    /// Snapshot height used when the stream reports no dimensions.
    pub fallback_height: u32,
}

/// Rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// `chrono` format string for note timestamps.
    pub timestamp_format: String,
    /// Render timestamps in UTC instead of local time.
    pub use_utc: bool,
}

/// Connectivity probe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the connectivity probe connects to.
    pub probe_addr: String,
    /// Probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            notes_key: DEFAULT_NOTES_KEY.to_string(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            geo_timeout_ms: 10_000,
            high_accuracy: true,
            jpeg_quality: 80,
            fallback_width: 640,
            fallback_height: 480,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            use_utc: false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_addr: "1.1.1.1:443".to_string(),
            probe_timeout_ms: 1_500,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `FIELDNOTES_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FIELDNOTES_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.notes_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "notes_key must not be empty".to_string(),
            });
        }

        if self.capture.geo_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "geo_timeout_ms must be greater than 0".to_string(),
            });
        }

        if !(1..=100).contains(&self.capture.jpeg_quality) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "jpeg_quality ({}) must be between 1 and 100",
                    self.capture.jpeg_quality
                ),
            });
        }

        if self.capture.fallback_width == 0 || self.capture.fallback_height == 0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "fallback dimensions ({}x{}) must be non-zero",
                    self.capture.fallback_width, self.capture.fallback_height
                ),
            });
        }

        if StrftimeItems::new(&self.render.timestamp_format)
            .any(|item| matches!(item, Item::Error))
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "timestamp_format ({}) is not a valid format string",
                    self.render.timestamp_format
                ),
            });
        }

        if self.network.probe_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "probe_timeout_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the geolocation timeout as a Duration.
    #[must_use]
    pub fn geo_timeout(&self) -> Duration {
        Duration::from_millis(self.capture.geo_timeout_ms)
    }

    /// Get the connectivity probe timeout as a Duration.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.network.probe_timeout_ms)
    }
}
