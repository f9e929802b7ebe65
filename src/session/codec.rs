//! Event log serialization
//!
//! Logs are encoded as a JSON array of events. Decoding is lenient: anything
//! that is not a valid log decodes to an empty log, which callers treat as
//! "nothing to replay".

use crate::types::{EventLog, KeystrokeEvent};

/// Encode an event log as JSON
pub fn serialize_events(events: &[KeystrokeEvent]) -> String {
    match serde_json::to_string(events) {
        Ok(json) => json,
        Err(e) => {
            // Only strings and integers; serde_json has nothing to reject here
            tracing::error!("Failed to serialize event log: {}", e);
            String::from("[]")
        }
    }
}

/// Decode an event log, returning an empty log on malformed input
pub fn deserialize_events(json: &str) -> EventLog {
    match try_deserialize_events(json) {
        Ok(events) => events,
        Err(reason) => {
            tracing::warn!("Discarding malformed event log: {}", reason);
            Vec::new()
        }
    }
}

/// Decode an event log, reporting why it was rejected
pub fn try_deserialize_events(json: &str) -> std::result::Result<EventLog, String> {
    let events: EventLog = serde_json::from_str(json).map_err(|e| e.to_string())?;

    if let Some((index, event)) = events
        .iter()
        .enumerate()
        .find(|(_, e)| !e.start.is_valid() || e.end.is_some_and(|end| !end.is_valid()))
    {
        return Err(format!(
            "event {} has a position below 1:1 ({})",
            index, event.start
        ));
    }

    Ok(events)
}
