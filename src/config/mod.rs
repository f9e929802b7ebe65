//! Configuration module for keyreplay
//!
//! Settings live in a single TOML file. Every field has a default, so a
//! missing file or a partial file is always usable.
//!
//! # Config Location
//!
//! The default file is stored in the platform-appropriate config directory:
//! - **Linux**: `~/.config/dev.keyreplay/keyreplay.toml`
//! - **macOS**: `~/Library/Application Support/dev.keyreplay/keyreplay.toml`
//! - **Windows**: `%APPDATA%\dev.keyreplay\keyreplay.toml`
//!
//! # Example
//!
//! ```toml
//! [playback]
//! speed = 2.0
//! min_delay_ms = 5
//!
//! [recorder]
//! max_events = 50000
//!
//! [logging]
//! filter = "warn,keyreplay=info"
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{ReplayError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.keyreplay";

/// Config filename
pub const CONFIG_FILE: &str = "keyreplay.toml";

/// Get the application config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Complete keyreplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Version for future migration support
    #[serde(default = "default_config_version")]
    pub version: u32,

    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub recorder: RecorderSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

fn default_config_version() -> u32 {
    1
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            playback: PlaybackSettings::default(),
            recorder: RecorderSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ReplayConfig {
    /// Parse a config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ReplayError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReplayError::Config(format!("Failed to read config {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Load the config at `path`, or from the default location when `None`
    ///
    /// Falls back to defaults (with a warning) on any error. A missing
    /// default file is not an error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Self::default(),
            },
        };

        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the config as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ReplayError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ReplayError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ReplayError::Config(format!("Failed to write config {:?}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = ReplayConfig::from_toml("").unwrap();
        assert_eq!(config, ReplayConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = ReplayConfig::from_toml(
            r#"
            [playback]
            speed = 2.0

            [recorder]
            max_events = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.playback.speed, 2.0);
        assert_eq!(config.playback.min_delay_ms, DEFAULT_MIN_DELAY_MS);
        assert_eq!(config.recorder.max_events, 100);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_invalid_toml() {
        let err = ReplayConfig::from_toml("[playback\nspeed = ").unwrap_err();
        assert!(matches!(err, ReplayError::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = ReplayConfig::default();
        config.playback.speed = 0.5;
        config.logging.filter = "trace".to_string();
        config.save(&path).unwrap();

        let loaded = ReplayConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReplayConfig::load_or_default(Some(&dir.path().join("absent.toml")));
        assert_eq!(config, ReplayConfig::default());
    }
}
