//! Core data types for keyreplay
//!
//! This module contains the fundamental data structures shared by the
//! recorder, the player and the serializer.
//!
//! # Main Types
//!
//! - [`Position`] - A 1-based `{line, column}` location in a document
//! - [`TextRange`] - A half-open span between two positions
//! - [`TextEdit`] - A replacement request sent to a document
//! - [`ContentChange`] - A change notification emitted by a document
//! - [`KeystrokeEvent`] - One normalized, timestamped text mutation
//! - [`EventLog`] - An ordered sequence of events from one recording
//!
//! # Coordinates
//!
//! Lines and columns both start at 1, matching common editor conventions.
//! Columns count characters, and the column one past the last character of a
//! line addresses the end of that line.

use serde::{Deserialize, Serialize};

/// An ordered sequence of events representing one recorded session
pub type EventLog = Vec<KeystrokeEvent>;

/// A 1-based document position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number, starting at 1
    pub line: u32,
    /// Column number, starting at 1
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The first position of any document
    pub const fn origin() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Whether both coordinates are 1-based (non-zero)
    pub fn is_valid(&self) -> bool {
        self.line >= 1 && self.column >= 1
    }

    /// Position of the caret after typing `text` starting here.
    ///
    /// Multi-line text puts the caret at the end of its last line.
    pub fn advanced_by(&self, text: &str) -> Position {
        match text.rfind('\n') {
            Some(last_newline) => {
                let newlines = text.matches('\n').count() as u32;
                let tail = text[last_newline + 1..].chars().count() as u32;
                Position::new(self.line + newlines, tail + 1)
            }
            None => Position::new(self.line, self.column + text.chars().count() as u32),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::origin()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open span `[start, end)` in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width range at `at`
    pub const fn caret(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A request to replace `range` with `text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub text: String,
}

impl TextEdit {
    pub fn new(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        Self::new(TextRange::caret(at), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }
}

/// One changed span inside a content-change notification.
///
/// `range` refers to the document as it was before the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedRange {
    pub range: TextRange,
    pub text: String,
}

/// A content-change notification emitted by a document.
///
/// A single user action (e.g. a multi-cursor edit) may touch several ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentChange {
    pub ranges: Vec<ChangedRange>,
}

/// Kind of a recorded text mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    /// Text inserted at a zero-width range
    Insert,
    /// A non-empty range removed
    Delete,
    /// A non-empty range replaced with new text
    Replace,
}

impl EditKind {
    /// Classify a changed span.
    pub fn classify(range: &TextRange, text: &str) -> Self {
        if !text.is_empty() && range.is_empty() {
            EditKind::Insert
        } else if text.is_empty() && !range.is_empty() {
            EditKind::Delete
        } else {
            EditKind::Replace
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EditKind::Insert => "insert",
            EditKind::Delete => "delete",
            EditKind::Replace => "replace",
        }
    }
}

/// A single recorded text mutation.
///
/// The serialized field names (`type`, `position`, `endPosition`,
/// `timestamp`) are shared with logs written by the web editor. Columns here
/// count chars while the web editor counts UTF-16 code units, so positions in
/// its logs drift after any character outside the Basic Multilingual Plane
/// (most emoji) on the same line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    /// What kind of mutation this is
    #[serde(rename = "type")]
    pub kind: EditKind,
    /// Inserted text (empty for deletions)
    #[serde(default)]
    pub text: String,
    /// Where the mutation begins
    #[serde(rename = "position")]
    pub start: Position,
    /// Exclusive end of the replaced span (deletions and replacements)
    #[serde(rename = "endPosition", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Position>,
    /// Milliseconds since recording started
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
}

impl KeystrokeEvent {
    pub fn insert(text: impl Into<String>, at: Position, timestamp_ms: u64) -> Self {
        Self {
            kind: EditKind::Insert,
            text: text.into(),
            start: at,
            end: None,
            timestamp_ms,
        }
    }

    pub fn delete(start: Position, end: Position, timestamp_ms: u64) -> Self {
        Self {
            kind: EditKind::Delete,
            text: String::new(),
            start,
            end: Some(end),
            timestamp_ms,
        }
    }

    pub fn replace(text: impl Into<String>, start: Position, end: Position, timestamp_ms: u64) -> Self {
        Self {
            kind: EditKind::Replace,
            text: text.into(),
            start,
            end: Some(end),
            timestamp_ms,
        }
    }

    /// Normalize one changed span of a notification into an event.
    pub fn from_change(change: &ChangedRange, timestamp_ms: u64) -> Self {
        let range = &change.range;
        match EditKind::classify(range, &change.text) {
            EditKind::Insert => Self::insert(change.text.clone(), range.start, timestamp_ms),
            EditKind::Delete => Self::delete(range.start, range.end, timestamp_ms),
            EditKind::Replace => {
                Self::replace(change.text.clone(), range.start, range.end, timestamp_ms)
            }
        }
    }

    /// The span this event replaces in the document it is applied to
    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end.unwrap_or(self.start))
    }

    /// Where the caret belongs after this event is applied
    pub fn caret_after(&self) -> Position {
        match self.kind {
            EditKind::Delete => self.start,
            EditKind::Insert | EditKind::Replace => self.start.advanced_by(&self.text),
        }
    }
}
