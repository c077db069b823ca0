//! # Error Types
//!
//! Defines error types used across components.

use thiserror::Error;

/// Failure of a backend round-trip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with a non-success status.
    #[error("Rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided detail.
        message: String,
    },

    /// Network-level failure (no response).
    #[error("Transport error: {0}")]
    Transport(String),

    /// No response within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl BackendError {
    /// True for failures that may succeed when retried unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }

    /// Server-provided message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::NotFound(msg) | Self::Rejected { message: msg, .. } => Some(msg),
            _ => None,
        }
    }

    /// Map an HTTP status and detail into an error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 404 {
            Self::NotFound(message)
        } else {
            Self::Rejected { status, message }
        }
    }
}

/// Structural problem in a form definition, found at load time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormDefinitionError {
    /// Form has no id.
    #[error("Form id is empty")]
    EmptyFormId,

    /// A field has no id.
    #[error("Field id is empty")]
    EmptyFieldId,

    /// Two fields share an id.
    #[error("Duplicate field id: {0}")]
    DuplicateFieldId(String),

    /// Choice field declares no options.
    #[error("Choice field {0} has no options")]
    MissingOptions(String),

    /// Pattern does not compile.
    #[error("Invalid pattern on field {field}: {reason}")]
    InvalidPattern {
        /// Field id.
        field: String,
        /// Compiler message.
        reason: String,
    },

    /// `minLength` exceeds `maxLength`.
    #[error("Length bounds inverted on field {0}")]
    InvertedLengthBounds(String),

    /// `min` exceeds `max`.
    #[error("Numeric bounds inverted on field {0}")]
    InvertedNumericBounds(String),
}
