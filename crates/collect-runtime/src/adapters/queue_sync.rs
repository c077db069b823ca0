//! # Queue Sync Agent
//!
//! Drains the Local Cache submission queue through the submission endpoint.
//! An entry leaves the queue only after the backend accepts it.

use async_trait::async_trait;
use fc_05_submission_router::SubmissionBackend;
use shared_store::{LocalCache, SyncAgent, SyncError, SyncReport};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// [`SyncAgent`] delivering queued submissions oldest first.
pub struct QueueSyncAgent {
    cache: Arc<dyn LocalCache>,
    backend: Arc<dyn SubmissionBackend>,
}

impl QueueSyncAgent {
    /// Agent draining `cache` into `backend`.
    pub fn new(cache: Arc<dyn LocalCache>, backend: Arc<dyn SubmissionBackend>) -> Self {
        Self { cache, backend }
    }
}

#[async_trait]
impl SyncAgent for QueueSyncAgent {
    async fn sync_all(&self) -> Result<SyncReport, SyncError> {
        let pending = self
            .cache
            .pending_submissions()
            .await
            .map_err(|e| SyncError::Storage(e.to_string()))?;

        let mut report = SyncReport::default();
        let mut last_transient = None;

        for submission in &pending {
            match self
                .backend
                .submit(submission.token.as_deref(), submission)
                .await
            {
                Ok(()) => {
                    self.cache
                        .remove_submission(&submission.id)
                        .await
                        .map_err(|e| SyncError::Storage(e.to_string()))?;
                    report.delivered += 1;
                    debug!(submission_id = %submission.id, "Delivered queued submission");
                }
                Err(e) => {
                    warn!(
                        submission_id = %submission.id,
                        error = %e,
                        "Queued submission not delivered"
                    );
                    if e.is_transient() {
                        last_transient = Some(e.to_string());
                    }
                    report.failed += 1;
                }
            }
        }

        report.remaining = self
            .cache
            .get_pending_count()
            .await
            .map_err(|e| SyncError::Storage(e.to_string()))?;

        if report.delivered == 0 && report.failed > 0 {
            if let Some(reason) = last_transient {
                return Err(SyncError::Failed(reason));
            }
        }

        info!(
            delivered = report.delivered,
            failed = report.failed,
            remaining = report.remaining,
            "Sync pass finished"
        );
        Ok(report)
    }
}
