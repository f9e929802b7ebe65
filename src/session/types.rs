//! Session data types

use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, Result, ResultExt};
use crate::types::{EditKind, EventLog};

/// State of the keystroke recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    /// Not observing any document
    #[default]
    Idle,
    /// Capturing change notifications
    Recording,
}

impl RecorderState {
    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        matches!(self, RecorderState::Recording)
    }
}

/// State of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Not started yet, or stopped
    #[default]
    Idle,
    /// Applying events on schedule
    Playing,
    /// Suspended with the cursor retained
    Paused,
    /// Every event has been applied
    Completed,
}

impl PlaybackState {
    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    /// Check if paused
    pub fn is_paused(&self) -> bool {
        matches!(self, PlaybackState::Paused)
    }

    /// Check if the last play-through finished
    pub fn is_completed(&self) -> bool {
        matches!(self, PlaybackState::Completed)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "Idle",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Completed => "Completed",
        }
    }
}

/// Metadata for a recorded session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Name/title of the session
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// When the session was recorded
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    /// Timestamp of the last event
    #[serde(default)]
    pub duration_ms: u64,
    /// Number of events recorded
    #[serde(default)]
    pub event_count: usize,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            name: String::from("Untitled Session"),
            description: None,
            recorded_at: chrono::Utc::now(),
            duration_ms: 0,
            event_count: 0,
        }
    }
}

impl SessionMetadata {
    /// Create new metadata with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Per-kind event counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditCounts {
    pub inserts: usize,
    pub deletes: usize,
    pub replaces: usize,
}

/// A complete recorded session: the starting text plus the edits made to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecording {
    /// Session metadata
    pub metadata: SessionMetadata,
    /// Document text when recording started
    #[serde(default)]
    pub initial_text: String,
    /// Recorded events in observation order
    #[serde(default)]
    pub events: EventLog,
}

impl Default for SessionRecording {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRecording {
    /// Create a new empty recording
    pub fn new() -> Self {
        Self::with_metadata(SessionMetadata::default())
    }

    /// Create with metadata
    pub fn with_metadata(metadata: SessionMetadata) -> Self {
        Self {
            metadata,
            initial_text: String::new(),
            events: Vec::new(),
        }
    }

    /// Build a finalized recording from captured events
    pub fn from_events(initial_text: impl Into<String>, events: EventLog) -> Self {
        let mut recording = Self {
            metadata: SessionMetadata::default(),
            initial_text: initial_text.into(),
            events,
        };
        recording.finalize();
        recording
    }

    /// Timestamp of the last event
    pub fn duration_ms(&self) -> u64 {
        self.events.last().map(|e| e.timestamp_ms).unwrap_or(0)
    }

    /// Get the number of events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Check if the recording is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Count events by kind
    pub fn edit_counts(&self) -> EditCounts {
        self.events
            .iter()
            .fold(EditCounts::default(), |mut counts, event| {
                match event.kind {
                    EditKind::Insert => counts.inserts += 1,
                    EditKind::Delete => counts.deletes += 1,
                    EditKind::Replace => counts.replaces += 1,
                }
                counts
            })
    }

    /// Save recording to a file (JSON format)
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(ReplayError::from)
            .with_context(|| format!("Failed to write session {:?}", path))
    }

    /// Load recording from a file
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| {
            ReplayError::Serialization(format!("Failed to parse session {:?}: {}", path, e))
        })
    }

    /// Finalize the recording by updating metadata
    pub fn finalize(&mut self) {
        self.metadata.duration_ms = self.duration_ms();
        self.metadata.event_count = self.events.len();
    }
}
