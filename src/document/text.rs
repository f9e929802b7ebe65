//! In-memory text document

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::{ReplayError, Result};
use crate::types::{ChangedRange, ContentChange, Position, TextEdit, TextRange};

use super::{ChangeListener, EditableDocument, Subscription};

type ListenerSlot = Rc<RefCell<ChangeListener>>;

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(u64, ListenerSlot)>,
}

/// Plain-string document with 1-based, character-counted positions
pub struct TextDocument {
    text: String,
    caret: Position,
    focused: bool,
    listeners: Rc<RefCell<ListenerRegistry>>,
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::new("")
    }
}

impl std::fmt::Debug for TextDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextDocument")
            .field("text", &self.text)
            .field("caret", &self.caret)
            .field("focused", &self.focused)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            caret: Position::origin(),
            focused: false,
            listeners: Rc::new(RefCell::new(ListenerRegistry::default())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> Position {
        self.caret
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Line `line` (1-based) without its terminator
    pub fn line(&self, line: u32) -> Option<&str> {
        if line == 0 {
            return None;
        }
        self.text.split('\n').nth(line as usize - 1)
    }

    /// Number of registered change listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    /// Position just past the last character
    pub fn end_position(&self) -> Position {
        let line = self.line_count() as u32;
        let last = self.text.rsplit('\n').next().unwrap_or("");
        Position::new(line, last.chars().count() as u32 + 1)
    }

    /// Edit through the document as a user would, notifying listeners
    pub fn insert(&mut self, at: Position, text: &str) -> Result<()> {
        self.apply_edits(&[TextEdit::insert(at, text)])
    }

    /// Byte offset of a position
    fn offset_of(&self, pos: Position) -> Result<usize> {
        if !pos.is_valid() {
            return Err(ReplayError::invalid_position(
                pos.line,
                pos.column,
                "positions are 1-based",
            ));
        }

        let mut line_start = 0;
        for (idx, line) in self.text.split('\n').enumerate() {
            if idx + 1 == pos.line as usize {
                let column = pos.column as usize - 1;
                let chars = line.chars().count();
                if column > chars {
                    return Err(ReplayError::invalid_position(
                        pos.line,
                        pos.column,
                        format!("line has {} columns", chars + 1),
                    ));
                }
                let byte = line
                    .char_indices()
                    .nth(column)
                    .map(|(b, _)| b)
                    .unwrap_or(line.len());
                return Ok(line_start + byte);
            }
            line_start += line.len() + 1;
        }

        Err(ReplayError::invalid_position(
            pos.line,
            pos.column,
            format!("document has {} lines", self.line_count()),
        ))
    }

    fn notify(&self, change: &ContentChange) {
        // Snapshot the slots so a listener may unsubscribe while being called
        let slots: Vec<ListenerSlot> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, slot)| slot.clone())
            .collect();

        for slot in slots {
            match slot.try_borrow_mut() {
                Ok(mut listener) => (*listener)(change),
                Err(_) => tracing::warn!("Skipping re-entrant change listener"),
            }
        }
    }
}

impl EditableDocument for TextDocument {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn subscribe(&mut self, listener: ChangeListener) -> Option<Subscription> {
        let id = {
            let mut registry = self.listeners.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Rc::new(RefCell::new(listener))));
            id
        };

        let registry: Weak<RefCell<ListenerRegistry>> = Rc::downgrade(&self.listeners);
        Some(Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            }
        }))
    }

    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<()> {
        if edits.is_empty() {
            return Ok(());
        }

        let mut resolved = Vec::with_capacity(edits.len());
        for edit in edits {
            let start = self.offset_of(edit.range.start)?;
            let end = self.offset_of(edit.range.end)?;
            if end < start {
                return Err(ReplayError::invalid_position(
                    edit.range.end.line,
                    edit.range.end.column,
                    format!("range end precedes start {}", edit.range.start),
                ));
            }
            resolved.push((start, end, edit));
        }

        // Back to front so earlier offsets stay valid
        resolved.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        for pair in resolved.windows(2) {
            let (later, earlier) = (&pair[0], &pair[1]);
            if earlier.1 > later.0 || (earlier.0 == later.0 && earlier.1 == later.1) {
                return Err(ReplayError::OverlappingEdits);
            }
        }

        for (start, end, edit) in &resolved {
            self.text.replace_range(*start..*end, &edit.text);
        }

        let change = ContentChange {
            ranges: resolved
                .iter()
                .map(|(_, _, edit)| ChangedRange {
                    range: edit.range,
                    text: edit.text.clone(),
                })
                .collect(),
        };
        self.notify(&change);
        Ok(())
    }

    fn set_caret(&mut self, position: Position) {
        self.caret = position;
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn reset(&mut self, text: &str) {
        let full = TextRange::new(Position::origin(), self.end_position());
        self.text = text.to_string();
        self.caret = Position::origin();
        self.notify(&ContentChange {
            ranges: vec![ChangedRange {
                range: full,
                text: text.to_string(),
            }],
        });
    }
}
