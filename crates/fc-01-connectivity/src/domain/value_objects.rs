//! # Domain Value Objects
//!
//! Connectivity transitions and what the monitor did about them.

use serde::{Deserialize, Serialize};
use shared_store::SyncReport;

/// Change between two consecutive connectivity readings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Transition {
    /// Reading matches the previous one.
    Unchanged,
    /// true → false.
    WentOffline,
    /// false → true.
    Reconnected,
}

impl Transition {
    /// Classify a reading against the previous one.
    pub fn between(previous: bool, next: bool) -> Self {
        match (previous, next) {
            (false, true) => Self::Reconnected,
            (true, false) => Self::WentOffline,
            _ => Self::Unchanged,
        }
    }
}

/// Result of feeding one platform reading to the monitor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// No transition, nothing done.
    Unchanged,
    /// Now offline.
    WentOffline,
    /// Back online with an empty queue; no sync attempted.
    ReconnectedIdle,
    /// Back online; one sync pass ran.
    ReconnectedSynced(SyncReport),
    /// Back online; the single sync attempt failed.
    ReconnectedSyncFailed(String),
}

impl TransitionOutcome {
    /// True if a Sync Agent pass was attempted.
    pub fn attempted_sync(&self) -> bool {
        matches!(
            self,
            Self::ReconnectedSynced(_) | Self::ReconnectedSyncFailed(_)
        )
    }
}
