//! Keystroke player for replaying recorded sessions
//!
//! Playback is an explicit state machine driven by a single owned timer.
//! The first event is applied synchronously by [`KeystrokePlayer::play`];
//! every later event is applied by a delayed task spawned with
//! [`tokio::task::spawn_local`], so playback must run inside a
//! [`tokio::task::LocalSet`] (see [`crate::runtime::run_local`]).
//!
//! Every state transition bumps a generation counter. A timer task carries
//! the generation it was scheduled under and does nothing if the session has
//! moved on, so a callback that fires after `pause`/`stop`/`resume` can never
//! apply a stale event.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::document::{EditableDocument, SharedDocument};
use crate::error::{ReplayError, Result};
use crate::types::{EditKind, EventLog, KeystrokeEvent, TextEdit};

use super::types::PlaybackState;

/// Slowest allowed playback speed
pub const MIN_SPEED: f64 = 0.25;

/// Fastest allowed playback speed
pub const MAX_SPEED: f64 = 4.0;

/// Default floor between two scheduled applications
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(10);

/// Smallest delay ever scheduled between two events
pub const MIN_DELAY_FLOOR: Duration = Duration::from_millis(1);

/// Progress callback: `(events_applied, total_events)`
pub type ProgressCallback = Box<dyn FnMut(usize, usize)>;

/// Completion callback
pub type CompleteCallback = Box<dyn FnMut()>;

/// Construction options for [`KeystrokePlayer`]
pub struct PlayerOptions {
    /// Playback speed multiplier (clamped to `[MIN_SPEED, MAX_SPEED]`)
    pub speed: f64,
    /// Lower bound for any scheduled delay
    pub min_delay: Duration,
    /// Called after each applied event
    pub on_progress: Option<ProgressCallback>,
    /// Called once when the last event has been applied
    pub on_complete: Option<CompleteCallback>,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            min_delay: DEFAULT_MIN_DELAY,
            on_progress: None,
            on_complete: None,
        }
    }
}

impl PlayerOptions {
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    pub fn on_progress(mut self, callback: impl FnMut(usize, usize) + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

/// Clamp a requested speed into the supported range
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        return 1.0;
    }
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

/// Delay between applying `current` and `next` at `speed`
pub fn scheduled_delay(
    current: &KeystrokeEvent,
    next: &KeystrokeEvent,
    speed: f64,
    min_delay: Duration,
) -> Duration {
    let gap_ms = next.timestamp_ms.saturating_sub(current.timestamp_ms) as f64;
    let scaled = Duration::from_secs_f64(gap_ms / clamp_speed(speed) / 1000.0);
    scaled.max(min_delay)
}

/// Apply one event to a document and move the caret after it
///
/// Deletions remove `[start, end)` and ignore any text the event carries.
pub fn apply_event(document: &mut dyn EditableDocument, event: &KeystrokeEvent) -> Result<()> {
    if event.kind != EditKind::Insert && event.end.is_none() {
        return Err(ReplayError::MalformedEvent(format!(
            "{} at {} has no end position",
            event.kind.display_name(),
            event.start
        )));
    }

    let edit = match event.kind {
        EditKind::Insert => TextEdit::insert(event.start, event.text.clone()),
        EditKind::Delete => TextEdit::delete(event.range()),
        EditKind::Replace => TextEdit::new(event.range(), event.text.clone()),
    };

    document.apply_edits(std::slice::from_ref(&edit))?;
    document.set_caret(event.caret_after());
    document.focus();
    Ok(())
}

/// Check that timer tasks can be spawned from the current thread
///
/// Timers need a tokio runtime with a `LocalSet` (or a local runtime). Tokio
/// only reports a missing `LocalSet` by panicking, so the check spawns a
/// no-op task and contains that panic.
fn ensure_local_context() -> Result<()> {
    if tokio::runtime::Handle::try_current().is_err() {
        return Err(ReplayError::Runtime(
            "playback timers need a tokio runtime".to_string(),
        ));
    }

    std::panic::catch_unwind(|| drop(tokio::task::spawn_local(async {}))).map_err(|_| {
        ReplayError::Runtime("playback timers must run inside a tokio LocalSet".to_string())
    })
}

/// Mutable playback state shared with the timer task
struct PlaybackSession {
    events: EventLog,
    current_index: usize,
    speed: f64,
    min_delay: Duration,
    state: PlaybackState,
    document: Option<SharedDocument>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
    on_progress: Option<ProgressCallback>,
    on_complete: Option<CompleteCallback>,
}

impl PlaybackSession {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Invalidate every outstanding timer task
    fn next_generation(&mut self) -> u64 {
        self.cancel_timer();
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.state.is_playing()
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// Replays an [`EventLog`] onto a document with the original timing
///
/// # Example
///
/// ```ignore
/// let doc = share(TextDocument::new(initial_text));
/// let player = KeystrokePlayer::new(events, PlayerOptions::default().with_speed(2.0));
/// player.play(doc.clone())?;
/// ```
pub struct KeystrokePlayer {
    session: Rc<RefCell<PlaybackSession>>,
}

impl std::fmt::Debug for KeystrokePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.session.borrow();
        f.debug_struct("KeystrokePlayer")
            .field("state", &session.state)
            .field("current_index", &session.current_index)
            .field("total", &session.events.len())
            .field("speed", &session.speed)
            .finish()
    }
}

impl KeystrokePlayer {
    /// Create a player for `events`
    pub fn new(events: EventLog, options: PlayerOptions) -> Self {
        let session = PlaybackSession {
            events,
            current_index: 0,
            speed: clamp_speed(options.speed),
            min_delay: options.min_delay.max(MIN_DELAY_FLOOR),
            state: PlaybackState::Idle,
            document: None,
            timer: None,
            generation: 0,
            on_progress: options.on_progress,
            on_complete: options.on_complete,
        };
        Self {
            session: Rc::new(RefCell::new(session)),
        }
    }

    /// Get current state
    pub fn state(&self) -> PlaybackState {
        self.session.borrow().state
    }

    /// Check if playing (and not paused)
    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    /// Check if paused
    pub fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    /// Check if the last play-through finished
    pub fn is_completed(&self) -> bool {
        self.state().is_completed()
    }

    /// Index of the next event to apply
    pub fn current_index(&self) -> usize {
        self.session.borrow().current_index
    }

    /// Total number of events
    pub fn total_events(&self) -> usize {
        self.session.borrow().events.len()
    }

    /// Get playback speed
    pub fn speed(&self) -> f64 {
        self.session.borrow().speed
    }

    /// Set playback speed
    ///
    /// Affects the next scheduled delay; a wait already in flight keeps its
    /// original duration.
    pub fn set_speed(&self, speed: f64) {
        let speed = clamp_speed(speed);
        self.session.borrow_mut().speed = speed;
        tracing::debug!("Playback speed set to {}x", speed);
    }

    /// Fraction of events applied (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        let session = self.session.borrow();
        if session.events.is_empty() {
            return if session.state.is_completed() { 1.0 } else { 0.0 };
        }
        session.current_index as f64 / session.events.len() as f64
    }

    /// Start playback from the first event
    ///
    /// Restarts from the beginning when paused or completed. Ignored while
    /// already playing. Fails without touching the document when a timer
    /// will be needed but cannot be spawned here.
    pub fn play(&self, document: SharedDocument) -> Result<()> {
        let generation = {
            let mut session = self.session.borrow_mut();
            if session.state.is_playing() {
                tracing::debug!("Player already running, ignoring play");
                return Ok(());
            }
            if session.events.len() > 1 {
                ensure_local_context()?;
            }
            let generation = session.next_generation();
            session.document = Some(document);
            session.current_index = 0;
            session.state = PlaybackState::Playing;
            tracing::debug!("Playback started with {} events", session.events.len());
            generation
        };
        advance(&self.session, generation);
        Ok(())
    }

    /// Pause playback, keeping the cursor
    pub fn pause(&self) {
        let mut session = self.session.borrow_mut();
        if !session.state.is_playing() {
            return;
        }
        session.next_generation();
        session.state = PlaybackState::Paused;
        tracing::debug!("Playback paused at event {}", session.current_index);
    }

    /// Resume a paused playback, possibly onto a different document
    ///
    /// Stays paused when a timer will be needed but cannot be spawned here.
    pub fn resume(&self, document: SharedDocument) -> Result<()> {
        let generation = {
            let mut session = self.session.borrow_mut();
            if !session.state.is_paused() {
                return Ok(());
            }
            if session.events.len().saturating_sub(session.current_index) > 1 {
                ensure_local_context()?;
            }
            let generation = session.next_generation();
            session.document = Some(document);
            session.state = PlaybackState::Playing;
            tracing::debug!("Playback resumed at event {}", session.current_index);
            generation
        };
        advance(&self.session, generation);
        Ok(())
    }

    /// Stop playback and rewind; the completion callback does not fire
    pub fn stop(&self) {
        let mut session = self.session.borrow_mut();
        session.next_generation();
        session.current_index = 0;
        session.state = PlaybackState::Idle;
        session.document = None;
        tracing::debug!("Playback stopped");
    }
}

enum Step {
    Apply(KeystrokeEvent, SharedDocument),
    Complete,
}

/// Apply the event under the cursor and schedule the next one
fn advance(session_rc: &Rc<RefCell<PlaybackSession>>, generation: u64) {
    let step = {
        let mut session = session_rc.borrow_mut();
        if !session.is_current(generation) {
            tracing::trace!("Ignoring stale playback step");
            return;
        }
        session.timer = None;

        match (session.events.get(session.current_index), &session.document) {
            (Some(event), Some(document)) => Step::Apply(event.clone(), Rc::clone(document)),
            _ => Step::Complete,
        }
    };

    let (event, document) = match step {
        Step::Apply(event, document) => (event, document),
        Step::Complete => {
            complete(session_rc, generation);
            return;
        }
    };

    let applied = match document.try_borrow_mut() {
        Ok(mut doc) => apply_event(&mut *doc, &event),
        Err(_) => Err(ReplayError::DocumentBusy),
    };

    let progress = {
        let mut session = session_rc.borrow_mut();
        if session.generation != generation {
            return;
        }
        session.current_index += 1;
        match applied {
            Ok(()) => {
                tracing::trace!(
                    "Applied {} at {} ({}/{})",
                    event.kind.display_name(),
                    event.start,
                    session.current_index,
                    session.events.len()
                );
                Some((session.current_index, session.events.len(), session.on_progress.take()))
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to apply event {} ({} at {}): {}",
                    session.current_index - 1,
                    event.kind.display_name(),
                    event.start,
                    e
                );
                None
            }
        }
    };

    if let Some((applied, total, Some(mut callback))) = progress {
        callback(applied, total);
        let mut session = session_rc.borrow_mut();
        if session.on_progress.is_none() {
            session.on_progress = Some(callback);
        }
    }

    let delay = {
        let session = session_rc.borrow();
        if !session.is_current(generation) {
            return;
        }
        let index = session.current_index;
        match (session.events.get(index.wrapping_sub(1)), session.events.get(index)) {
            (Some(current), Some(next)) => {
                Some(scheduled_delay(current, next, session.speed, session.min_delay))
            }
            _ => None,
        }
    };

    match delay {
        Some(delay) => schedule(session_rc, generation, delay),
        None => complete(session_rc, generation),
    }
}

fn schedule(session_rc: &Rc<RefCell<PlaybackSession>>, generation: u64, delay: Duration) {
    let weak: Weak<RefCell<PlaybackSession>> = Rc::downgrade(session_rc);
    let timer = tokio::task::spawn_local(async move {
        tokio::time::sleep(delay).await;
        if let Some(session) = weak.upgrade() {
            advance(&session, generation);
        }
    });
    session_rc.borrow_mut().timer = Some(timer);
}

fn complete(session_rc: &Rc<RefCell<PlaybackSession>>, generation: u64) {
    let callback = {
        let mut session = session_rc.borrow_mut();
        if !session.is_current(generation) {
            return;
        }
        session.state = PlaybackState::Completed;
        session.document = None;
        tracing::debug!("Playback completed ({} events)", session.events.len());
        session.on_complete.take()
    };

    if let Some(mut callback) = callback {
        callback();
        let mut session = session_rc.borrow_mut();
        if session.on_complete.is_none() {
            session.on_complete = Some(callback);
        }
    }
}
