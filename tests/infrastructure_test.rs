//! Test to verify test infrastructure works correctly

mod common;

use common::builders::{hi_log, EventLogBuilder};
use keyreplay::EditKind;

#[test]
fn test_infrastructure_setup() {
    let events = EventLogBuilder::new()
        .insert("x", 2, 3)
        .replace("yz", (1, 1), (1, 4))
        .build();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EditKind::Insert);
    assert_eq!(events[1].kind, EditKind::Replace);
    assert_eq!(events[1].timestamp_ms, 100);

    let hi = hi_log();
    assert_eq!(hi[1].text, "i");
    assert_eq!(hi[1].timestamp_ms, 50);
}

#[test]
fn test_float_comparison() {
    common::assert_float_eq(1.0, 1.0000001, 0.001);
}

#[test]
#[should_panic]
fn test_float_comparison_fails() {
    common::assert_float_eq(1.0, 2.0, 0.001);
}
