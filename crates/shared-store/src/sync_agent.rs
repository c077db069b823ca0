//! # Sync Agent Contract
//!
//! Background delivery of queued submissions. This engine only triggers a
//! pass and reads the resulting pending count; delivery semantics
//! (exactly-once-eventually) belong to the agent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;

/// Outcome of one sync pass.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncReport {
    /// Submissions confirmed by the backend.
    pub delivered: usize,
    /// Submissions that failed and stay queued.
    pub failed: usize,
    /// Queue length after the pass.
    pub remaining: usize,
}

/// Sync pass failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// Backend unreachable.
    #[error("Sync failed: {0}")]
    Failed(String),

    /// Local queue unreadable.
    #[error("Sync storage error: {0}")]
    Storage(String),

    /// Pass did not finish in time.
    #[error("Sync timed out")]
    Timeout,
}

/// Sync Agent collaborator.
#[async_trait]
pub trait SyncAgent: Send + Sync {
    /// Deliver every queued submission it can.
    async fn sync_all(&self) -> Result<SyncReport, SyncError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Sync agent that records how often it was called.
#[derive(Debug, Default)]
pub struct MockSyncAgent {
    calls: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockSyncAgent {
    /// Agent whose passes succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Agent whose passes fail.
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            should_fail: AtomicBool::new(true),
        }
    }

    /// Number of `sync_all` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SyncAgent for MockSyncAgent {
    async fn sync_all(&self) -> Result<SyncReport, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SyncError::Failed("Mock failure".to_string()));
        }
        Ok(SyncReport::default())
    }
}
