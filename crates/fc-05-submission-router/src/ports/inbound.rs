//! # Inbound Ports

use async_trait::async_trait;
use fc_03_session_paginator::SessionPaginator;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::domain::{SubmissionOutcome, SubmissionReceipt, SubmitError};

/// Submission Router API - inbound port.
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    /// Validate the final page, then deliver or queue. On success the
    /// autosaved session is cleared and `session` is reset.
    async fn submit(
        &self,
        session: &Mutex<SessionPaginator>,
    ) -> Result<SubmissionReceipt, SubmitError>;

    /// Outcome signal for UI consumers.
    fn subscribe(&self) -> broadcast::Receiver<SubmissionOutcome>;
}
