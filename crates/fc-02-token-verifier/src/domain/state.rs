//! # Verification State
//!
//! The state machine driven by the verifier service.

use serde::{Deserialize, Serialize};
use shared_types::{FormDefinition, FormRef, SecurityMode, TokenRecord};

use super::errors::{AccessDenied, VerificationError};

/// How access was granted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerifiedVia {
    /// `standard` mode, no handshake.
    Open,
    /// This device is already in the verification cache.
    CachedDevice,
    /// A device-lock or PIN handshake just succeeded.
    Handshake,
    /// Backend unreachable; granted from cached forms. Informational only.
    OfflineFallback,
}

/// A verified session.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifiedAccess {
    /// Token identifier.
    pub token_id: String,
    /// Enumerator shown in the header.
    pub enumerator_name: String,
    /// Security mode of the token.
    pub security_mode: SecurityMode,
    /// Forms available in this session.
    pub forms: Vec<FormDefinition>,
    /// Submissions left on the token, if capped.
    pub remaining_submissions: Option<u32>,
    /// Quota consumption in percent, if capped.
    pub quota_progress: Option<f64>,
    /// How access was granted.
    pub via: VerifiedVia,
}

impl VerifiedAccess {
    pub(crate) fn from_record(record: &TokenRecord, via: VerifiedVia) -> Self {
        Self {
            token_id: record.token_id.clone(),
            enumerator_name: record.enumerator_name.clone(),
            security_mode: record.security_mode,
            forms: record.forms.clone(),
            remaining_submissions: record.remaining_submissions(),
            quota_progress: record.quota_progress(),
            via,
        }
    }

    /// True if granted without reaching the backend.
    pub fn is_offline(&self) -> bool {
        self.via == VerifiedVia::OfflineFallback
    }

    /// Summaries of the available forms.
    pub fn form_refs(&self) -> Vec<FormRef> {
        self.forms.iter().map(FormRef::from).collect()
    }

    /// Look up an available form.
    pub fn form(&self, form_id: &str) -> Option<&FormDefinition> {
        self.forms.iter().find(|f| f.id == form_id)
    }
}

/// A handshake the user still has to complete.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingVerification {
    /// `device_locked` or `pin_protected`.
    pub mode: SecurityMode,
    /// Token snapshot from this load.
    pub record: TokenRecord,
    /// Inline error from the previous attempt.
    pub error: Option<VerificationError>,
}

/// Why the verifier ended in `Error`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessFailure {
    /// Terminal: a new link is needed.
    Denied(AccessDenied),
    /// Backend unreachable and nothing cached. `retry()` may succeed.
    Unavailable {
        /// User-facing message.
        message: String,
    },
}

impl AccessFailure {
    /// True if a manual retry can help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// User-facing message.
    pub fn message(&self) -> String {
        match self {
            Self::Denied(denied) => denied.to_string(),
            Self::Unavailable { message } => message.clone(),
        }
    }
}

/// Verifier state.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum VerificationState {
    /// Token fetch in flight.
    #[default]
    Loading,
    /// Access granted.
    Verified(VerifiedAccess),
    /// Waiting for a device registration or PIN.
    NeedsVerification(PendingVerification),
    /// Access not granted.
    Error(AccessFailure),
}

impl VerificationState {
    /// True in `Verified`.
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }

    /// The verified access, if any.
    pub fn access(&self) -> Option<&VerifiedAccess> {
        match self {
            Self::Verified(access) => Some(access),
            _ => None,
        }
    }

    /// Inline handshake error, if any.
    pub fn verification_error(&self) -> Option<&VerificationError> {
        match self {
            Self::NeedsVerification(pending) => pending.error.as_ref(),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Verified(_) => "verified",
            Self::NeedsVerification(_) => "needs_verification",
            Self::Error(_) => "error",
        }
    }
}
