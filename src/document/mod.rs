//! Editable document interface
//!
//! The recorder and the player never talk to a concrete editor widget. They
//! consume the [`EditableDocument`] capability set instead: read the text,
//! subscribe to content changes, apply edits, move the caret, focus and
//! reset. [`TextDocument`] is the in-memory implementation used by the CLI
//! and the tests.

pub mod text;

pub use text::TextDocument;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::types::{ContentChange, Position, TextEdit};

/// Callback invoked synchronously for every content change
pub type ChangeListener = Box<dyn FnMut(&ContentChange)>;

/// A document shared between the caller and a running player
pub type SharedDocument = Rc<RefCell<dyn EditableDocument>>;

/// Wrap a document so it can be handed to a player or controller
pub fn share<D: EditableDocument + 'static>(document: D) -> Rc<RefCell<D>> {
    Rc::new(RefCell::new(document))
}

/// Handle to a change-listener registration.
///
/// The listener is removed when the subscription is disposed or dropped.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Unregister the listener now
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

/// Capability set of an editable text surface
///
/// # Example
///
/// ```ignore
/// fn type_hello(doc: &mut dyn EditableDocument) -> Result<()> {
///     doc.apply_edits(&[TextEdit::insert(Position::origin(), "hello")])?;
///     doc.set_caret(Position::new(1, 6));
///     Ok(())
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait EditableDocument {
    /// Full current text
    fn text(&self) -> String;

    /// Register a content-change listener
    ///
    /// Returns `None` when the document has no change-notification source.
    fn subscribe(&mut self, listener: ChangeListener) -> Option<Subscription>;

    /// Apply a batch of edits atomically
    ///
    /// All ranges refer to the document before the batch. Either every edit
    /// is applied or none is.
    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<()>;

    /// Move the caret
    fn set_caret(&mut self, position: Position);

    /// Take input focus
    fn focus(&mut self);

    /// Replace the whole text
    fn reset(&mut self, text: &str);
}
