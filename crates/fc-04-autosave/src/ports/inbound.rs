//! # Inbound Ports

use async_trait::async_trait;
use shared_types::SessionState;

use crate::domain::{AutosaveError, PersistOutcome, ResumedSession, SessionSnapshot};

/// Autosave Persistor API - inbound port.
#[async_trait]
pub trait AutosaveApi: Send + Sync {
    /// Write the local snapshot and, while online, post it remotely.
    /// Skipped when there are no answers.
    async fn persist(&self, state: &SessionState) -> Result<PersistOutcome, AutosaveError>;

    /// Find the session to resume: explicit resume id, then the token's
    /// remote session, then the local snapshot.
    async fn resume(&self, resume_id: Option<&str>)
        -> Result<Option<ResumedSession>, AutosaveError>;

    /// Drop the in-progress session so it is never resumed again. Stops the
    /// autosave timer; a new session needs a fresh timer.
    async fn clear(&self) -> Result<(), AutosaveError>;

    /// Current local snapshot.
    fn local_snapshot(&self) -> Result<Option<SessionSnapshot>, AutosaveError>;
}
