//! # Domain Errors
//!
//! Error taxonomy of the Token Verifier.
//!
//! | Type | Recovery |
//! |------|----------|
//! | [`AccessDenied`] | terminal, a new link is needed |
//! | [`VerificationError`] | retry the handshake |
//! | [`VerifierError`] | caller misuse or superseded load |

use shared_types::BackendError;
use thiserror::Error;

/// Terminal denial. Re-verifying cannot fix it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessDenied {
    /// Token unknown to the backend.
    #[error("Invalid token")]
    InvalidToken,

    /// Token past its expiry.
    #[error("Token has expired")]
    Expired,

    /// Token revoked by an administrator.
    #[error("Token has been revoked")]
    Revoked,

    /// Token used up its submission quota.
    #[error("Submission limit reached")]
    SubmissionLimitReached,

    /// Token is bound to a different device.
    #[error("This link is locked to another device")]
    LockedToAnotherDevice,

    /// Form is not assigned to this token.
    #[error("Form {0} is not available on this link")]
    FormNotAssigned(String),

    /// Any other refusal.
    #[error("Access denied: {0}")]
    Forbidden(String),
}

impl AccessDenied {
    /// Classify a backend refusal. Transient failures yield `None`.
    pub fn from_backend(err: &BackendError) -> Option<Self> {
        match err {
            BackendError::NotFound(_) => Some(Self::InvalidToken),
            BackendError::Rejected { status, message } if (400..500).contains(status) => {
                Some(Self::from_message(message))
            }
            _ => None,
        }
    }

    /// Classify a refusal message.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("expired") {
            Self::Expired
        } else if lower.contains("revoked") {
            Self::Revoked
        } else if lower.contains("limit") {
            Self::SubmissionLimitReached
        } else if crate::domain::is_lock_message(message) {
            Self::LockedToAnotherDevice
        } else if lower.contains("invalid token") {
            Self::InvalidToken
        } else {
            Self::Forbidden(message.to_string())
        }
    }
}

/// Recoverable handshake failure. The user may try again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// PIN is not the expected number of digits.
    #[error("PIN must be {length} digits")]
    InvalidPinFormat {
        /// Expected digit count.
        length: usize,
    },

    /// Backend refused the PIN.
    #[error("{0}")]
    PinRejected(String),

    /// Backend unreachable during the handshake.
    #[error("Verification failed: {0}. Please try again.")]
    Network(String),

    /// Handshake accepted but this device could not be remembered.
    #[error("Could not save verification on this device: {0}. Please try again.")]
    Storage(String),
}

/// Errors returned by verifier operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifierError {
    /// Handshake requested while not in `NeedsVerification`.
    #[error("No verification is pending")]
    NotAwaitingVerification,

    /// Operation needs a verified session.
    #[error("Access has not been verified")]
    NotVerified,

    /// `retry` before any `load`.
    #[error("No token has been loaded")]
    NoToken,

    /// A newer load or teardown invalidated this operation.
    #[error("Operation superseded by a newer session")]
    Superseded,

    /// Terminal denial.
    #[error(transparent)]
    Denied(#[from] AccessDenied),

    /// Form neither fetchable nor cached.
    #[error("Form {0} is unavailable offline")]
    FormUnavailable(String),
}
