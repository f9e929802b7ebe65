//! Test data builders for creating event logs

use keyreplay::{EventLog, KeystrokeEvent, Position};

/// Builder for hand-written event logs
///
/// Events are appended in order; each one is stamped `gap_ms` after the
/// previous one unless an explicit timestamp is given.
pub struct EventLogBuilder {
    events: EventLog,
    gap_ms: u64,
    next_ts: u64,
}

impl EventLogBuilder {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            gap_ms: 100,
            next_ts: 0,
        }
    }

    pub fn gap(mut self, gap_ms: u64) -> Self {
        self.gap_ms = gap_ms;
        self
    }

    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.next_ts = timestamp_ms;
        self
    }

    pub fn insert(self, text: &str, line: u32, column: u32) -> Self {
        let event = KeystrokeEvent::insert(text, Position::new(line, column), self.next_ts);
        self.push(event)
    }

    pub fn delete(self, start: (u32, u32), end: (u32, u32)) -> Self {
        let event = KeystrokeEvent::delete(
            Position::new(start.0, start.1),
            Position::new(end.0, end.1),
            self.next_ts,
        );
        self.push(event)
    }

    pub fn replace(self, text: &str, start: (u32, u32), end: (u32, u32)) -> Self {
        let event = KeystrokeEvent::replace(
            text,
            Position::new(start.0, start.1),
            Position::new(end.0, end.1),
            self.next_ts,
        );
        self.push(event)
    }

    /// Type `text` on `line` one character per event, starting at `column`
    pub fn typed(mut self, text: &str, line: u32, column: u32) -> Self {
        for (i, c) in text.chars().enumerate() {
            self = self.insert(&c.to_string(), line, column + i as u32);
        }
        self
    }

    fn push(mut self, event: KeystrokeEvent) -> Self {
        self.events.push(event);
        self.next_ts += self.gap_ms;
        self
    }

    pub fn build(self) -> EventLog {
        self.events
    }
}

impl Default for EventLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The two-keystroke "Hi" log
pub fn hi_log() -> EventLog {
    EventLogBuilder::new().gap(50).typed("Hi", 1, 1).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_builder() {
        let events = EventLogBuilder::new()
            .gap(20)
            .typed("ab", 1, 1)
            .at(500)
            .delete((1, 1), (1, 2))
            .build();

        assert_eq!(events.len(), 3);
        assert_eq!(events[1].timestamp_ms, 20);
        assert_eq!(events[2].timestamp_ms, 500);
        assert_eq!(events[2].end, Some(Position::new(1, 2)));
    }
}
