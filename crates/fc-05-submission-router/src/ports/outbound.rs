//! # Outbound Ports

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{BackendError, GeoLocation, Submission};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Submission endpoint - outbound port.
#[async_trait]
pub trait SubmissionBackend: Send + Sync {
    /// `POST` a submission. Any 2xx is success.
    async fn submit(&self, token: Option<&str>, submission: &Submission)
        -> Result<(), BackendError>;
}

/// Device position - outbound port.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Best-effort current position. `None` when unavailable or denied.
    async fn current_location(&self) -> Option<GeoLocation>;
}

/// Provider returning a fixed position, or none.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedLocation(pub Option<GeoLocation>);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Option<GeoLocation> {
        self.0
    }
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Submission endpoint that records what it receives.
#[derive(Default)]
pub struct MockSubmissionBackend {
    received: Mutex<Vec<Submission>>,
    failure: Mutex<Option<BackendError>>,
    calls: AtomicUsize,
}

impl MockSubmissionBackend {
    /// Endpoint accepting everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `err` until cleared.
    pub fn fail_with(&self, err: BackendError) {
        *self.failure.lock() = Some(err);
    }

    /// Let calls succeed again.
    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    /// Accepted submissions.
    pub fn received(&self) -> Vec<Submission> {
        self.received.lock().clone()
    }

    /// Calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionBackend for MockSubmissionBackend {
    async fn submit(
        &self,
        _token: Option<&str>,
        submission: &Submission,
    ) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        self.received.lock().push(submission.clone());
        Ok(())
    }
}
