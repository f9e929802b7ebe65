//! Integration tests for event log encoding and session files

mod common;

use common::builders::{hi_log, EventLogBuilder};
use keyreplay::session::codec::try_deserialize_events;
use keyreplay::session::player::apply_event;
use keyreplay::session::SessionMetadata;
use keyreplay::{
    deserialize_events, serialize_events, EditKind, KeystrokeEvent, Position, ReplayError,
    SessionRecording, TextDocument,
};
use proptest::prelude::*;

#[test]
fn test_garbage_decodes_to_empty_log() {
    assert!(deserialize_events("not valid data").is_empty());
    assert!(deserialize_events("").is_empty());
    assert!(deserialize_events("{\"type\":\"insert\"}").is_empty());
    assert!(deserialize_events("[{\"type\":\"paste\",\"position\":{\"line\":1,\"column\":1},\"timestamp\":0}]").is_empty());
}

#[test]
fn test_empty_log_round_trip() {
    let json = serialize_events(&[]);
    assert_eq!(json, "[]");
    assert!(deserialize_events(&json).is_empty());
}

#[test]
fn test_reads_web_editor_log() {
    // Inserts carry no endPosition; unknown fields are ignored
    let json = r#"[
        {"type":"insert","text":"Hi","position":{"line":1,"column":1},"timestamp":0,"source":"keyboard"},
        {"type":"delete","text":"","position":{"line":1,"column":2},"endPosition":{"line":1,"column":3},"timestamp":420},
        {"type":"replace","text":"ey","position":{"line":1,"column":2},"endPosition":{"line":1,"column":2},"timestamp":900}
    ]"#;

    let events = deserialize_events(json);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].end, None);
    assert_eq!(events[1].kind, EditKind::Delete);
    assert_eq!(events[2].timestamp_ms, 900);

    let mut doc = TextDocument::default();
    for event in &events {
        apply_event(&mut doc, event).unwrap();
    }
    assert_eq!(doc.as_str(), "Hey");
}

#[test]
fn test_hand_edited_delete_removes_range_only() {
    let json = r#"[{"type":"delete","text":"ZZ","position":{"line":1,"column":1},"endPosition":{"line":1,"column":3},"timestamp":0}]"#;
    let events = deserialize_events(json);
    assert_eq!(events.len(), 1);

    let mut doc = TextDocument::new("abcd");
    apply_event(&mut doc, &events[0]).unwrap();
    assert_eq!(doc.as_str(), "cd");
}

#[test]
fn test_rejects_zero_based_positions() {
    let json = r#"[{"type":"insert","text":"x","position":{"line":0,"column":0},"timestamp":0}]"#;
    let reason = try_deserialize_events(json).unwrap_err();
    assert!(reason.contains("below 1:1"), "unexpected reason: {}", reason);
    assert!(deserialize_events(json).is_empty());
}

#[test]
fn test_session_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.keyreplay.json");

    let events = EventLogBuilder::new()
        .gap(75)
        .typed("Hello", 1, 1)
        .replace("J", (1, 1), (1, 2))
        .build();
    let mut recording = SessionRecording::with_metadata(
        SessionMetadata::new("greeting").with_description("typing a greeting"),
    );
    recording.initial_text = String::from("\n// end");
    recording.events = events;
    recording.finalize();
    recording.save_to_file(&path).unwrap();

    let loaded = SessionRecording::load_from_file(&path).unwrap();
    assert_eq!(loaded, recording);
    assert_eq!(loaded.metadata.event_count, 6);
    assert_eq!(loaded.metadata.duration_ms, 375);
    assert_eq!(loaded.edit_counts().replaces, 1);

    let mut doc = TextDocument::new(loaded.initial_text.clone());
    for event in &loaded.events {
        apply_event(&mut doc, event).unwrap();
    }
    assert_eq!(doc.as_str(), "Jello\n// end");
}

#[test]
fn test_corrupt_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.keyreplay.json");
    std::fs::write(&path, serialize_events(&hi_log())).unwrap();

    // A bare event log is not a session
    let err = SessionRecording::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ReplayError::Serialization(_)));

    let missing = SessionRecording::load_from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(missing, ReplayError::Io(_)));
}

#[test]
fn test_save_into_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("session.keyreplay.json");

    let err = SessionRecording::from_events("", hi_log())
        .save_to_file(&path)
        .unwrap_err();
    assert!(matches!(err, ReplayError::WithContext { .. }));
    assert!(err.to_string().contains("Failed to write session"));
}

fn position_strategy() -> impl Strategy<Value = Position> {
    (1u32..500, 1u32..200).prop_map(|(line, column)| Position::new(line, column))
}

fn event_strategy() -> impl Strategy<Value = KeystrokeEvent> {
    prop_oneof![
        (".{1,8}", position_strategy(), any::<u32>())
            .prop_map(|(text, at, ts)| KeystrokeEvent::insert(text, at, ts as u64)),
        (position_strategy(), position_strategy(), any::<u32>())
            .prop_map(|(start, end, ts)| KeystrokeEvent::delete(start, end, ts as u64)),
        (".{0,8}", position_strategy(), position_strategy(), any::<u32>()).prop_map(
            |(text, start, end, ts)| KeystrokeEvent::replace(text, start, end, ts as u64)
        ),
    ]
}

proptest! {
    #[test]
    fn prop_serialized_logs_decode_unchanged(
        events in prop::collection::vec(event_strategy(), 0..32),
    ) {
        let decoded = deserialize_events(&serialize_events(&events));
        prop_assert_eq!(decoded, events);
    }

    #[test]
    fn prop_arbitrary_text_never_panics(input in ".*") {
        let _ = deserialize_events(&input);
    }
}
