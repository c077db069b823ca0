//! # Domain Errors

use shared_types::{FieldErrors, FormDefinitionError};
use std::fmt;
use thiserror::Error;

/// Per-field validation messages for one page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub FieldErrors);

impl ValidationErrors {
    /// True if no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for one field.
    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.0.get(field_id).map(String::as_str)
    }

    /// Underlying map.
    pub fn into_inner(self) -> FieldErrors {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Please fix {} field(s) on this page", self.0.len())
    }
}

impl std::error::Error for ValidationErrors {}

/// Session paginator errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaginatorError {
    /// Form failed load-time checks.
    #[error("Invalid form: {0}")]
    InvalidForm(#[from] FormDefinitionError),

    /// Current page has invalid fields.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Response for a field the form does not have.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Field does not take answers.
    #[error("Field {0} does not take a response")]
    NotAnInput(String),
}
