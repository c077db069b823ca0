//! # Core Domain Entities
//!
//! Collection tokens, device identity, in-progress session state and
//! submissions.
//!
//! ## Ownership
//!
//! - `TokenRecord`: owned by the backend, the client keeps an immutable
//!   snapshot per load.
//! - `DeviceIdentity`: created lazily on first need, persisted, never destroyed.
//! - `SessionState`: mutated by user input, flushed by autosave, cleared on
//!   submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::forms::{FormDefinition, FormRef};

/// Responses keyed by field id. Insertion order is irrelevant.
pub type ResponseMap = BTreeMap<String, serde_json::Value>;

/// Validation messages keyed by field id.
pub type FieldErrors = BTreeMap<String, String>;

// =============================================================================
// COLLECTION TOKENS
// =============================================================================

/// Access policy attached to a collection link.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    /// Anyone holding the link may collect.
    #[default]
    Standard,
    /// The first device to register owns the link.
    DeviceLocked,
    /// A PIN is required once per device.
    PinProtected,
}

/// Token metadata returned by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenRecord {
    /// Stable token identifier (never the raw link secret).
    pub token_id: String,
    /// Access policy.
    #[serde(default)]
    pub security_mode: SecurityMode,
    /// Server-side lock state.
    #[serde(default)]
    pub device_locked: bool,
    /// Name of the enumerator the link was issued to.
    #[serde(default)]
    pub enumerator_name: String,
    /// Forms assigned to this link.
    #[serde(default)]
    pub forms: Vec<FormDefinition>,
    /// Expiry instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Optional submission quota.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_submissions: Option<u32>,
    /// Submissions recorded so far.
    #[serde(default)]
    pub submission_count: u32,
}

impl TokenRecord {
    /// Create an open (standard mode) record.
    pub fn new(token_id: impl Into<String>, enumerator_name: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            security_mode: SecurityMode::Standard,
            device_locked: false,
            enumerator_name: enumerator_name.into(),
            forms: Vec::new(),
            expires_at: None,
            max_submissions: None,
            submission_count: 0,
        }
    }

    /// True once `expires_at` has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }

    /// True if a quota exists and is used up.
    pub fn submission_limit_reached(&self) -> bool {
        self.max_submissions
            .is_some_and(|max| self.submission_count >= max)
    }

    /// Submissions left under the quota, `None` when unlimited.
    pub fn remaining_submissions(&self) -> Option<u32> {
        self.max_submissions
            .map(|max| max.saturating_sub(self.submission_count))
    }

    /// Quota usage in percent (capped at 100), `None` when unlimited.
    pub fn quota_progress(&self) -> Option<f64> {
        match self.max_submissions {
            Some(0) => Some(100.0),
            Some(max) => Some((self.submission_count as f64 / max as f64 * 100.0).min(100.0)),
            None => None,
        }
    }

    /// Summaries of the assigned forms.
    pub fn form_refs(&self) -> Vec<FormRef> {
        self.forms.iter().map(FormRef::from).collect()
    }

    /// Look up an assigned form.
    pub fn form(&self, form_id: &str) -> Option<&FormDefinition> {
        self.forms.iter().find(|f| f.id == form_id)
    }
}

// =============================================================================
// DEVICE IDENTITY
// =============================================================================

/// Screen dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenSize {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Descriptive device attributes (everything but the id).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceProfile {
    /// "mobile", "tablet", "desktop", ...
    pub device_type: String,
    /// Browser or client name.
    pub browser: String,
    /// Operating system.
    pub os: String,
    /// Screen dimensions.
    pub screen: ScreenSize,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            device_type: "desktop".to_string(),
            browser: "fieldforce-collect".to_string(),
            os: std::env::consts::OS.to_string(),
            screen: ScreenSize::default(),
        }
    }
}

/// Persistent identity of this browser profile / install.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Generated once, reused forever.
    pub device_id: String,
    /// "mobile", "tablet", "desktop", ...
    pub device_type: String,
    /// Browser or client name.
    pub browser: String,
    /// Operating system.
    pub os: String,
    /// Screen dimensions.
    pub screen: ScreenSize,
}

impl DeviceIdentity {
    /// Mint a fresh identity for a profile.
    pub fn generate(profile: DeviceProfile) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), profile)
    }

    /// Build an identity with a known id.
    pub fn with_id(device_id: impl Into<String>, profile: DeviceProfile) -> Self {
        Self {
            device_id: device_id.into(),
            device_type: profile.device_type,
            browser: profile.browser,
            os: profile.os,
            screen: profile.screen,
        }
    }
}

/// Captured position.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeoLocation {
    /// Degrees.
    pub latitude: f64,
    /// Degrees.
    pub longitude: f64,
    /// Meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// In-progress responses for one form.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    /// Answers keyed by field id.
    pub responses: ResponseMap,
    /// Zero-based page index.
    pub current_page: usize,
    /// Messages for fields that failed validation.
    #[serde(default)]
    pub errors: FieldErrors,
    /// Last successful save.
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
}

impl SessionState {
    /// True once any answer exists.
    pub fn has_responses(&self) -> bool {
        !self.responses.is_empty()
    }

    /// Reset to an empty session.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// SUBMISSIONS
// =============================================================================

/// Default submission source tag.
pub const DEFAULT_SUBMISSION_SOURCE: &str = "token_collection";

/// A completed response set, delivered immediately or queued.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    /// Client-generated id, stable across queueing and delivery.
    pub id: String,
    /// Form the answers belong to.
    pub form_id: String,
    /// Collection link used, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Answers.
    pub data: ResponseMap,
    /// Device that produced the answers.
    pub device_info: DeviceIdentity,
    /// Position at submit time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    /// Creation instant.
    pub submitted_at: DateTime<Utc>,
    /// Channel tag.
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    DEFAULT_SUBMISSION_SOURCE.to_string()
}

impl Submission {
    /// Create a submission stamped with a fresh id and the current time.
    pub fn new(form_id: impl Into<String>, data: ResponseMap, device_info: DeviceIdentity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            form_id: form_id.into(),
            token: None,
            data,
            device_info,
            location: None,
            submitted_at: Utc::now(),
            source: default_source(),
        }
    }
}
