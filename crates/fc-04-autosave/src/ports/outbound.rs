//! # Outbound Ports
//!
//! Session-store contract used for remote autosave and resume.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use shared_types::BackendError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::domain::{RemoteSession, SessionSaveRequest};

/// Session store - outbound port.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// `GET` a session by resume identifier. 404 is `NotFound`.
    async fn fetch_session(&self, session_id: &str) -> Result<RemoteSession, BackendError>;

    /// `GET` the session associated with a token. 404 is `NotFound`.
    async fn fetch_session_by_token(&self, token: &str) -> Result<RemoteSession, BackendError>;

    /// `POST` a snapshot; the store upserts by form and token.
    async fn save_session(&self, request: &SessionSaveRequest)
        -> Result<RemoteSession, BackendError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

#[derive(Default)]
struct MockSessionState {
    by_id: HashMap<String, RemoteSession>,
    failure: Option<BackendError>,
    saved: Vec<SessionSaveRequest>,
}

/// In-memory session store.
#[derive(Default)]
pub struct MockSessionBackend {
    state: Mutex<MockSessionState>,
    fetch_calls: AtomicUsize,
    save_delay: Option<Duration>,
}

impl MockSessionBackend {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session. It is reachable by id and by its token.
    pub fn with_session(self, session: RemoteSession) -> Self {
        let id = session.id.clone().unwrap_or_default();
        self.state.lock().by_id.insert(id, session);
        self
    }

    /// Hold every save for `delay` before answering.
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }

    /// Make every call fail with `err` until cleared.
    pub fn fail_with(&self, err: BackendError) {
        self.state.lock().failure = Some(err);
    }

    /// Let calls succeed again.
    pub fn clear_failure(&self) {
        self.state.lock().failure = None;
    }

    /// Every save request received, oldest first.
    pub fn saved(&self) -> Vec<SessionSaveRequest> {
        self.state.lock().saved.clone()
    }

    /// Fetch calls so far, by id or by token.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), BackendError> {
        match &self.state.lock().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SessionBackend for MockSessionBackend {
    async fn fetch_session(&self, session_id: &str) -> Result<RemoteSession, BackendError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.state
            .lock()
            .by_id
            .get(session_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound("Session not found".to_string()))
    }

    async fn fetch_session_by_token(&self, token: &str) -> Result<RemoteSession, BackendError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.state
            .lock()
            .by_id
            .values()
            .filter(|s| s.token.as_deref() == Some(token))
            .max_by_key(|s| s.updated_at)
            .cloned()
            .ok_or_else(|| BackendError::NotFound("Session not found".to_string()))
    }

    async fn save_session(
        &self,
        request: &SessionSaveRequest,
    ) -> Result<RemoteSession, BackendError> {
        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failure()?;
        let mut state = self.state.lock();
        state.saved.push(request.clone());

        let existing = state
            .by_id
            .values()
            .find(|s| s.form_id == request.form_id && s.token == request.token)
            .and_then(|s| s.id.clone());
        let id = existing.unwrap_or_else(|| format!("session-{}", state.by_id.len() + 1));

        let session = RemoteSession {
            id: Some(id.clone()),
            form_id: request.form_id.clone(),
            token: request.token.clone(),
            responses: request.responses.clone(),
            current_page: request.current_page,
            status: request.status,
            updated_at: Some(Utc::now()),
        };
        state.by_id.insert(id, session.clone());
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionStatus;
    use shared_types::ResponseMap;

    fn request(page: usize) -> SessionSaveRequest {
        SessionSaveRequest {
            form_id: "f1".into(),
            token: Some("t1".into()),
            responses: ResponseMap::new(),
            current_page: page,
            status: SessionStatus::InProgress,
        }
    }

    #[tokio::test]
    async fn test_save_upserts_by_form_and_token() {
        let backend = MockSessionBackend::new();
        let first = backend.save_session(&request(0)).await.unwrap();
        let second = backend.save_session(&request(1)).await.unwrap();
        assert_eq!(first.id, second.id);

        let by_token = backend.fetch_session_by_token("t1").await.unwrap();
        assert_eq!(by_token.current_page, 1);
        assert_eq!(backend.saved().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_session_is_not_found() {
        let backend = MockSessionBackend::new();
        let err = tokio_test::assert_err!(backend.fetch_session("nope").await);
        assert!(matches!(err, BackendError::NotFound(_)));
        assert_eq!(backend.fetch_calls(), 1);
    }
}
