//! Tunable settings for recording and playback
//!
//! # Main Types
//!
//! - [`PlaybackSettings`] - Default speed, scheduling floor and speed presets
//! - [`RecorderSettings`] - Capture limits
//! - [`LoggingSettings`] - Default tracing filter for the CLI

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::session::player::{clamp_speed, PlayerOptions};

/// Default scheduling floor in milliseconds
pub const DEFAULT_MIN_DELAY_MS: u64 = 10;

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info,keyreplay=debug";

/// Playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Initial speed multiplier for new players
    pub speed: f64,

    /// Minimum delay between two applied events, in milliseconds
    pub min_delay_ms: u64,

    /// Speed presets offered to users
    pub speed_options: Vec<f64>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            min_delay_ms: DEFAULT_MIN_DELAY_MS,
            speed_options: vec![0.5, 1.0, 2.0, 4.0],
        }
    }
}

impl PlaybackSettings {
    /// Minimum delay as a duration, never below 1ms
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms.max(1))
    }

    /// Player options seeded from these settings
    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions::default()
            .with_speed(clamp_speed(self.speed))
            .with_min_delay(self.min_delay())
    }
}

/// Recorder settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderSettings {
    /// Maximum events per recording (0 = unlimited)
    pub max_events: usize,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
