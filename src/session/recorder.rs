//! Keystroke recorder for capturing live edits

use std::cell::RefCell;
use std::rc::Rc;

use tokio::time::Instant;

use crate::document::{EditableDocument, Subscription};
use crate::types::{ContentChange, EventLog, KeystrokeEvent};

use super::types::RecorderState;

/// Buffer shared between the recorder and its change listener
#[derive(Debug)]
struct CaptureBuffer {
    /// Whether notifications are still being accepted
    active: bool,
    /// Recording start (`t0`)
    started_at: Instant,
    /// Captured events in observation order
    events: EventLog,
    /// Maximum number of events to keep (0 = unlimited)
    max_events: usize,
    /// Set once the limit has been reported
    truncated: bool,
}

impl CaptureBuffer {
    fn new(max_events: usize) -> Self {
        Self {
            active: false,
            started_at: Instant::now(),
            events: Vec::new(),
            max_events,
            truncated: false,
        }
    }

    fn capture(&mut self, change: &ContentChange) {
        if !self.active {
            return;
        }

        let timestamp_ms = self.started_at.elapsed().as_millis() as u64;
        for range in &change.ranges {
            if self.max_events > 0 && self.events.len() >= self.max_events {
                if !self.truncated {
                    tracing::warn!(
                        "Recording reached {} events, further edits are dropped",
                        self.max_events
                    );
                    self.truncated = true;
                }
                return;
            }
            self.events.push(KeystrokeEvent::from_change(range, timestamp_ms));
        }
    }
}

/// Keystroke recorder
///
/// Converts a document's change notifications into [`KeystrokeEvent`]s
/// timestamped relative to [`start`](Self::start). The listener runs in the
/// document's edit path and only appends to a buffer.
#[derive(Debug)]
pub struct KeystrokeRecorder {
    /// Current recording state
    state: RecorderState,
    /// Events captured so far
    buffer: Rc<RefCell<CaptureBuffer>>,
    /// Listener registration, released on stop
    subscription: Option<Subscription>,
}

impl Default for KeystrokeRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl KeystrokeRecorder {
    /// Create a new recorder
    pub fn new() -> Self {
        Self::with_max_events(0)
    }

    /// Create a recorder that keeps at most `max_events` events
    pub fn with_max_events(max_events: usize) -> Self {
        Self {
            state: RecorderState::Idle,
            buffer: Rc::new(RefCell::new(CaptureBuffer::new(max_events))),
            subscription: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Check if recording
    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    /// Begin observing `document`
    ///
    /// Clears any previous events. Does nothing while already recording.
    pub fn start(&mut self, document: &mut dyn EditableDocument) {
        if self.is_recording() {
            tracing::debug!("Recorder already running, ignoring start");
            return;
        }

        {
            let mut buffer = self.buffer.borrow_mut();
            buffer.events.clear();
            buffer.truncated = false;
            buffer.started_at = Instant::now();
            buffer.active = true;
        }
        self.state = RecorderState::Recording;

        let buffer = Rc::clone(&self.buffer);
        self.subscription = document.subscribe(Box::new(move |change: &ContentChange| {
            buffer.borrow_mut().capture(change);
        }));

        if self.subscription.is_none() {
            tracing::warn!("Document has no change-notification source, nothing will be recorded");
        }
        tracing::debug!("Recording started");
    }

    /// Stop recording and return the captured events
    ///
    /// Calling this while idle returns the last captured log again.
    pub fn stop(&mut self) -> EventLog {
        if self.is_recording() {
            self.buffer.borrow_mut().active = false;
            if let Some(subscription) = self.subscription.take() {
                subscription.dispose();
            }
            self.state = RecorderState::Idle;
            tracing::debug!("Recording stopped with {} events", self.event_count());
        }
        self.get_events()
    }

    /// Snapshot of the events captured so far
    pub fn get_events(&self) -> EventLog {
        self.buffer.borrow().events.clone()
    }

    /// Number of events captured so far
    pub fn event_count(&self) -> usize {
        self.buffer.borrow().events.len()
    }

    /// Timestamp of the newest event
    pub fn last_timestamp_ms(&self) -> u64 {
        self.buffer
            .borrow()
            .events
            .last()
            .map(|e| e.timestamp_ms)
            .unwrap_or(0)
    }
}

impl Drop for KeystrokeRecorder {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
        }
    }
}
