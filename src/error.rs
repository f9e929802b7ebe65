//! Error handling for keyreplay
//!
//! This module defines the crate error type and a Result alias for use
//! throughout the library. Most playback failures are tolerated and only
//! logged; these errors surface at document, config and file boundaries.

use thiserror::Error;

/// Main error type for keyreplay operations
#[derive(Error, Debug)]
pub enum ReplayError {
    /// A position does not exist in the target document
    #[error("Invalid position {line}:{column}: {message}")]
    InvalidPosition {
        line: u32,
        column: u32,
        message: String,
    },

    /// Two edits of one batch touch the same span
    #[error("Overlapping edits in a single batch")]
    OverlappingEdits,

    /// An event is missing data required to apply it
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The document is already borrowed by another operation
    #[error("Document is busy")]
    DocumentBusy,

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors building or driving the async runtime
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReplayError>,
    },
}

impl ReplayError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReplayError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for an out-of-range position
    pub fn invalid_position(line: u32, column: u32, message: impl Into<String>) -> Self {
        ReplayError::InvalidPosition {
            line,
            column,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(err: serde_json::Error) -> Self {
        ReplayError::Serialization(err.to_string())
    }
}

/// Result type alias for keyreplay operations
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
