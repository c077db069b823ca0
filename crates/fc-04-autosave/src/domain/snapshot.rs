//! # Snapshots
//!
//! Wire and storage shapes of a saved session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::ResponseMap;

/// Local snapshot stored under `cawi_{form}_{token|anon}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Answers so far.
    #[serde(default)]
    pub responses: ResponseMap,
    /// Page on screen when saved.
    #[serde(default)]
    pub current_page: usize,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
}

/// Lifecycle of a remote session.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Still being filled in.
    #[default]
    InProgress,
    /// Submitted or queued; never resumed.
    Completed,
}

/// Session as returned by the session store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RemoteSession {
    /// Resume identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Form the session belongs to.
    #[serde(default)]
    pub form_id: String,
    /// Token the session belongs to.
    #[serde(default)]
    pub token: Option<String>,
    /// Answers so far.
    #[serde(default)]
    pub responses: ResponseMap,
    /// Page on screen when saved.
    #[serde(default)]
    pub current_page: usize,
    /// Lifecycle.
    #[serde(default)]
    pub status: SessionStatus,
    /// Last server-side update.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteSession {
    /// True if this session can be resumed.
    pub fn is_resumable(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    /// True if this session was saved for `form_id`.
    pub fn belongs_to(&self, form_id: &str) -> bool {
        !self.form_id.is_empty() && self.form_id == form_id
    }
}

/// Body of a session-store save.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSaveRequest {
    /// Form the session belongs to.
    pub form_id: String,
    /// Token the session belongs to.
    pub token: Option<String>,
    /// Answers so far.
    pub responses: ResponseMap,
    /// Page on screen.
    pub current_page: usize,
    /// Lifecycle.
    pub status: SessionStatus,
}

/// Result of the remote half of a persist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteSave {
    /// Session store accepted the snapshot.
    Saved,
    /// Not attempted while offline.
    SkippedOffline,
    /// Remote saving is turned off.
    Disabled,
    /// Attempt failed; swallowed until the next tick.
    Failed(String),
}

/// Result of one persist.
#[derive(Clone, Debug, PartialEq)]
pub enum PersistOutcome {
    /// No answers yet; nothing written.
    NothingToSave,
    /// Local snapshot written at `saved_at`.
    Saved {
        /// Local write time.
        saved_at: DateTime<Utc>,
        /// Remote half.
        remote: RemoteSave,
    },
}

impl PersistOutcome {
    /// Local write time, if anything was written.
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Saved { saved_at, .. } => Some(*saved_at),
            Self::NothingToSave => None,
        }
    }
}
