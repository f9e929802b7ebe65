//! # keyreplay: Keystroke Recording and Replay
//!
//! Captures the edits made to a text document as a timestamped event log and
//! replays that log onto the same or another document, reproducing the
//! original typing rhythm at an adjustable speed.
//!
//! ## Architecture
//!
//! - **Document**: the [`EditableDocument`] capability set the engine talks to
//! - **Recorder**: turns change notifications into [`KeystrokeEvent`]s
//! - **Player**: a timer-driven state machine applying events on schedule
//! - **Codec**: lenient JSON encoding of event logs
//! - **Controller**: the record/replay workflow of an editor panel
//!
//! Everything runs on one thread. Playback timers are `spawn_local` tasks,
//! so players must be driven from inside a [`tokio::task::LocalSet`]
//! (see [`runtime::run_local`]).
//!
//! ## Example
//!
//! ```ignore
//! use keyreplay::{document::share, KeystrokePlayer, KeystrokeRecorder, PlayerOptions, TextDocument};
//!
//! let source = share(TextDocument::default());
//! let mut recorder = KeystrokeRecorder::new();
//! recorder.start(&mut *source.borrow_mut());
//! source.borrow_mut().insert(Position::origin(), "Hi")?;
//! let events = recorder.stop();
//!
//! keyreplay::runtime::run_local(async move {
//!     let target = share(TextDocument::default());
//!     let player = KeystrokePlayer::new(events, PlayerOptions::default().with_speed(2.0));
//!     player.play(target.clone())?;
//!     while !player.is_completed() {
//!         tokio::time::sleep(std::time::Duration::from_millis(10)).await;
//!     }
//!     Ok::<_, keyreplay::ReplayError>(())
//! })??;
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod runtime;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use config::ReplayConfig;
pub use document::{EditableDocument, SharedDocument, Subscription, TextDocument};
pub use error::{ReplayError, Result};
pub use session::{
    deserialize_events, serialize_events, KeystrokePlayer, KeystrokeRecorder, PlaybackState,
    PlayerOptions, ReplayController, ReplayNotice, SessionRecording,
};
pub use types::{EditKind, EventLog, KeystrokeEvent, Position, TextEdit, TextRange};
