//! Keystroke recording and playback module
//!
//! This module captures the edits made to a document as a timestamped event
//! log and replays such logs onto a document with the original timing.
//!
//! # Features
//!
//! - Record insert/delete/replace events from document change notifications
//! - Serialize logs to JSON compatible with the web editor's format
//! - Play back logs at 0.25x to 4x speed with pause/resume/stop
//! - Save complete sessions (starting text plus events) to disk
//! - Drive the whole record/replay workflow through [`ReplayController`]

pub mod codec;
pub mod controller;
pub mod player;
pub mod recorder;
pub mod types;

pub use codec::{deserialize_events, serialize_events};
pub use controller::{format_duration, ReplayController, ReplayNotice};
pub use player::{KeystrokePlayer, PlayerOptions};
pub use recorder::KeystrokeRecorder;
pub use types::{PlaybackState, RecorderState, SessionMetadata, SessionRecording};
