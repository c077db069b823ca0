//! # Domain Errors

use fc_03_session_paginator::ValidationErrors;
use shared_store::StoreError;
use thiserror::Error;

/// Submission errors. Backend failures never appear here; they become
/// queued submissions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmitError {
    /// Submit requested before the last page.
    #[error("Submit is only available on the last page ({current} of {count})")]
    NotOnFinalPage {
        /// Current page, one-based.
        current: usize,
        /// Page count.
        count: usize,
    },

    /// Final page has invalid fields.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Neither delivered nor queued. The session is kept.
    #[error("Could not save submission on this device: {0}")]
    Storage(#[from] StoreError),
}
