//! Replay controller
//!
//! Ties a recorder and a player to one editor document the way an editor's
//! "session recorder" panel does: record, stop, replay from the captured
//! starting text, pause/resume/stop, change speed, and expose live stats
//! (keystroke count, coding time, progress).
//!
//! Status messages are delivered through an injected [`Notifier`] instead of
//! a global toast hook.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::ReplayConfig;
use crate::document::SharedDocument;
use crate::types::EventLog;

use super::player::{clamp_speed, KeystrokePlayer};
use super::recorder::KeystrokeRecorder;
use super::types::SessionRecording;

/// Status updates emitted by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayNotice {
    RecordingStarted,
    RecordingStopped { events: usize },
    NothingToReplay,
    ReplayStarted { events: usize },
    ReplayPaused,
    ReplayResumed,
    ReplayStopped,
    ReplayCompleted,
}

/// Receiver for [`ReplayNotice`]s
pub type Notifier = Rc<dyn Fn(&ReplayNotice)>;

/// Format milliseconds as `m:ss`
pub fn format_duration(ms: u64) -> String {
    let total_seconds = ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Flags shared with the active player's callbacks
#[derive(Debug, Default)]
struct ReplayProgress {
    replaying: Cell<bool>,
    percent: Cell<f64>,
}

/// Record/replay workflow for a single document
pub struct ReplayController {
    config: ReplayConfig,
    recorder: KeystrokeRecorder,
    player: Option<KeystrokePlayer>,
    recording: SessionRecording,
    speed: f64,
    progress: Rc<ReplayProgress>,
    notifier: Option<Notifier>,
}

impl Default for ReplayController {
    fn default() -> Self {
        Self::new(ReplayConfig::default())
    }
}

impl ReplayController {
    pub fn new(config: ReplayConfig) -> Self {
        let speed = clamp_speed(config.playback.speed);
        Self {
            recorder: KeystrokeRecorder::with_max_events(config.recorder.max_events),
            config,
            player: None,
            recording: SessionRecording::new(),
            speed,
            progress: Rc::new(ReplayProgress::default()),
            notifier: None,
        }
    }

    /// Attach a status notifier
    pub fn with_notifier(mut self, notifier: impl Fn(&ReplayNotice) + 'static) -> Self {
        self.notifier = Some(Rc::new(notifier));
        self
    }

    fn notify(&self, notice: ReplayNotice) {
        if let Some(notifier) = &self.notifier {
            notifier(&notice);
        }
    }

    // ==================== Recording ====================

    /// Start recording edits made to `document`
    ///
    /// The document's current text becomes the replay starting point.
    pub fn start_recording(&mut self, document: &SharedDocument) {
        if self.recorder.is_recording() {
            return;
        }

        let Ok(mut doc) = document.try_borrow_mut() else {
            tracing::warn!("Document is busy, cannot start recording");
            return;
        };

        self.recorder = KeystrokeRecorder::with_max_events(self.config.recorder.max_events);
        self.recording = SessionRecording::new();
        self.recording.initial_text = doc.text();
        self.recorder.start(&mut *doc);
        drop(doc);

        tracing::info!("Recording started");
        self.notify(ReplayNotice::RecordingStarted);
    }

    /// Stop recording; returns the number of captured events
    pub fn stop_recording(&mut self) -> usize {
        if !self.recorder.is_recording() {
            return 0;
        }

        self.recording.events = self.recorder.stop();
        self.recording.finalize();
        let events = self.recording.event_count();

        tracing::info!("Recording stopped, events: {}", events);
        self.notify(ReplayNotice::RecordingStopped { events });
        events
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    // ==================== Replay ====================

    /// Rewind `document` to the recorded starting text and replay onto it
    ///
    /// Stops an active recording first. Returns `false` when there is
    /// nothing to replay, the document is busy, or playback timers cannot be
    /// spawned on this thread.
    pub fn start_replay(&mut self, document: &SharedDocument) -> bool {
        if self.recorder.is_recording() {
            self.stop_recording();
        }

        if self.recording.is_empty() {
            tracing::info!("No events to replay");
            self.notify(ReplayNotice::NothingToReplay);
            return false;
        }

        // A busy document leaves any running replay untouched
        let Ok(mut doc) = document.try_borrow_mut() else {
            tracing::warn!("Document is busy, cannot start replay");
            return false;
        };
        if let Some(previous) = self.player.take() {
            previous.stop();
        }
        doc.reset(&self.recording.initial_text);
        drop(doc);

        let events = self.recording.event_count();
        tracing::info!("Starting replay with {} events", events);

        self.progress.percent.set(0.0);
        self.progress.replaying.set(true);

        let on_progress = Rc::clone(&self.progress);
        let on_complete = Rc::clone(&self.progress);
        let notifier = self.notifier.clone();
        let options = self
            .config
            .playback
            .player_options()
            .with_speed(self.speed)
            .on_progress(move |current, total| {
                on_progress
                    .percent
                    .set(current as f64 / total.max(1) as f64 * 100.0);
            })
            .on_complete(move || {
                tracing::info!("Replay completed");
                on_complete.replaying.set(false);
                on_complete.percent.set(100.0);
                if let Some(notifier) = &notifier {
                    notifier(&ReplayNotice::ReplayCompleted);
                }
            });

        let player = KeystrokePlayer::new(self.recording.events.clone(), options);
        self.notify(ReplayNotice::ReplayStarted { events });
        if let Err(e) = player.play(Rc::clone(document)) {
            tracing::warn!("Failed to start replay: {}", e);
            self.progress.replaying.set(false);
            self.progress.percent.set(0.0);
            self.notify(ReplayNotice::ReplayStopped);
            return false;
        }
        self.player = Some(player);
        true
    }

    pub fn pause_replay(&mut self) {
        let Some(player) = &self.player else {
            return;
        };
        if player.is_playing() {
            player.pause();
            tracing::info!("Replay paused");
            self.notify(ReplayNotice::ReplayPaused);
        }
    }

    pub fn resume_replay(&mut self, document: &SharedDocument) {
        let Some(player) = &self.player else {
            return;
        };
        if player.is_paused() {
            if let Err(e) = player.resume(Rc::clone(document)) {
                tracing::warn!("Failed to resume replay: {}", e);
                return;
            }
            tracing::info!("Replay resumed");
            self.notify(ReplayNotice::ReplayResumed);
        }
    }

    /// Stop the replay and discard the player
    pub fn stop_replay(&mut self) {
        let Some(player) = self.player.take() else {
            return;
        };
        player.stop();
        self.progress.replaying.set(false);
        self.progress.percent.set(0.0);
        tracing::info!("Replay stopped");
        self.notify(ReplayNotice::ReplayStopped);
    }

    /// Change the playback speed, including for a running replay
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = clamp_speed(speed);
        if let Some(player) = &self.player {
            player.set_speed(self.speed);
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Speed presets from the config
    pub fn speed_options(&self) -> &[f64] {
        &self.config.playback.speed_options
    }

    pub fn is_replaying(&self) -> bool {
        self.progress.replaying.get()
    }

    pub fn is_paused(&self) -> bool {
        self.player.as_ref().is_some_and(|p| p.is_paused())
    }

    /// Replay progress in percent
    pub fn progress_percent(&self) -> f64 {
        self.progress.percent.get()
    }

    // ==================== Stats & data ====================

    /// Keystrokes captured (live while recording)
    pub fn keystroke_count(&self) -> usize {
        if self.recorder.is_recording() {
            self.recorder.event_count()
        } else {
            self.recording.event_count()
        }
    }

    /// Time from recording start to the latest keystroke
    pub fn coding_duration_ms(&self) -> u64 {
        if self.recorder.is_recording() {
            self.recorder.last_timestamp_ms()
        } else {
            self.recording.duration_ms()
        }
    }

    pub fn has_recording(&self) -> bool {
        !self.recording.is_empty()
    }

    /// The last finished recording
    pub fn recording(&self) -> &SessionRecording {
        &self.recording
    }

    /// Events of the last finished recording
    pub fn events(&self) -> &EventLog {
        &self.recording.events
    }

    /// Replace the current recording, e.g. with one loaded from disk
    pub fn load_recording(&mut self, recording: SessionRecording) {
        self.stop_replay();
        if self.recorder.is_recording() {
            self.recorder.stop();
        }
        tracing::info!(
            "Loaded recording '{}' with {} events",
            recording.metadata.name,
            recording.event_count()
        );
        self.recording = recording;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{share, TextDocument};
    use crate::types::{KeystrokeEvent, Position};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(999), "0:00");
        assert_eq!(format_duration(61_500), "1:01");
        assert_eq!(format_duration(600_000), "10:00");
    }

    #[test]
    fn test_defaults() {
        let controller = ReplayController::default();
        assert!(!controller.is_recording());
        assert!(!controller.is_replaying());
        assert_eq!(controller.speed(), 1.0);
        assert_eq!(controller.speed_options(), &[0.5, 1.0, 2.0, 4.0]);
        assert_eq!(controller.keystroke_count(), 0);
    }

    #[test]
    fn test_replay_without_runtime_is_not_left_running() {
        let mut controller = ReplayController::default();
        controller.load_recording(SessionRecording::from_events(
            "",
            vec![
                KeystrokeEvent::insert("a", Position::new(1, 1), 0),
                KeystrokeEvent::insert("b", Position::new(1, 2), 100),
            ],
        ));
        let document: SharedDocument = share(TextDocument::default());

        assert!(!controller.start_replay(&document));
        assert!(!controller.is_replaying());
        assert_eq!(controller.progress_percent(), 0.0);
        assert!(!controller.is_paused());
    }

    #[test]
    fn test_set_speed_clamps() {
        let mut controller = ReplayController::default();
        controller.set_speed(16.0);
        assert_eq!(controller.speed(), 4.0);
    }
}
