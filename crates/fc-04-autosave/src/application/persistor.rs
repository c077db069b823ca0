//! # Autosave Persistor Service

use async_trait::async_trait;
use chrono::Utc;
use fc_01_connectivity::ConnectivityHandle;
use fc_03_session_paginator::{PaginatorError, SessionNavigation, SessionPaginator};
use parking_lot::Mutex;
use shared_store::{KeyValueStore, KeyValueStoreExt};
use shared_types::keys::session_snapshot_key;
use shared_types::{
    BackendError, GenerationTicket, ResponseMap, SessionGeneration, SessionState,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::AutosaveConfig;
use crate::domain::{
    accept_local, accept_remote, choose, AutosaveError, PersistOutcome, RemoteSave,
    RemoteSession, ResumedSession, SessionSaveRequest, SessionSnapshot, SessionStatus,
};
use crate::ports::{AutosaveApi, SessionBackend};

/// Autosave Persistor for one form/token pair.
pub struct AutosavePersistor {
    config: AutosaveConfig,
    form_id: String,
    token: Option<String>,
    store: Arc<dyn KeyValueStore>,
    backend: Arc<dyn SessionBackend>,
    connectivity: ConnectivityHandle,
    generation: SessionGeneration,
    /// Orders snapshot writes against `clear`.
    snapshot_lock: Mutex<()>,
}

impl AutosavePersistor {
    /// Persistor for `form_id`, opened through `token` (anonymous if `None`).
    pub fn new(
        config: AutosaveConfig,
        form_id: impl Into<String>,
        token: Option<String>,
        store: Arc<dyn KeyValueStore>,
        backend: Arc<dyn SessionBackend>,
        connectivity: ConnectivityHandle,
    ) -> Self {
        Self {
            config,
            form_id: form_id.into(),
            token,
            store,
            backend,
            connectivity,
            generation: SessionGeneration::new(),
            snapshot_lock: Mutex::new(()),
        }
    }

    /// Share a generation counter with the rest of the session.
    pub fn with_generation(mut self, generation: SessionGeneration) -> Self {
        self.generation = generation;
        self
    }

    /// Generation counter guarding this persistor.
    pub fn generation(&self) -> &SessionGeneration {
        &self.generation
    }

    /// Configuration.
    pub fn config(&self) -> &AutosaveConfig {
        &self.config
    }

    /// Key of the local snapshot.
    pub fn snapshot_key(&self) -> String {
        session_snapshot_key(&self.form_id, self.token.as_deref())
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, BackendError> {
        match tokio::time::timeout(self.config.request_timeout(), request).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout),
        }
    }

    fn ensure_current(&self, ticket: GenerationTicket) -> Result<(), AutosaveError> {
        if self.generation.is_current(ticket) {
            Ok(())
        } else {
            debug!(form_id = %self.form_id, "[fc-04] Dropping stale autosave result");
            Err(AutosaveError::Superseded)
        }
    }

    fn remote_allowed(&self) -> Option<RemoteSave> {
        if !self.config.remote_enabled {
            Some(RemoteSave::Disabled)
        } else if !self.connectivity.is_online() {
            Some(RemoteSave::SkippedOffline)
        } else {
            None
        }
    }

    fn save_request(
        &self,
        responses: ResponseMap,
        current_page: usize,
        status: SessionStatus,
    ) -> SessionSaveRequest {
        SessionSaveRequest {
            form_id: self.form_id.clone(),
            token: self.token.clone(),
            responses,
            current_page,
            status,
        }
    }

    async fn save_remote(&self, request: SessionSaveRequest) -> RemoteSave {
        if let Some(skipped) = self.remote_allowed() {
            return skipped;
        }
        match self.call(self.backend.save_session(&request)).await {
            Ok(_) => RemoteSave::Saved,
            Err(e) => {
                warn!(form_id = %self.form_id, error = %e, "[fc-04] Remote save failed");
                RemoteSave::Failed(e.to_string())
            }
        }
    }

    /// Fetch one remote candidate. Misses and failures both fall through.
    async fn fetch_candidate(
        &self,
        label: &str,
        request: impl Future<Output = Result<RemoteSession, BackendError>>,
    ) -> Option<RemoteSession> {
        match self.call(request).await {
            Ok(session) => {
                if !session.belongs_to(&self.form_id) {
                    debug!(
                        form_id = %self.form_id,
                        other_form = %session.form_id,
                        source = label,
                        "[fc-04] Ignoring session saved for another form"
                    );
                }
                accept_remote(Some(session), &self.form_id)
            }
            Err(BackendError::NotFound(_)) => None,
            Err(e) => {
                warn!(
                    form_id = %self.form_id,
                    source = label,
                    error = %e,
                    "[fc-04] Resume lookup failed"
                );
                None
            }
        }
    }

    /// Move one page forward and persist if the page changed.
    pub async fn next_page(
        &self,
        session: &Mutex<SessionPaginator>,
    ) -> Result<usize, PaginatorError> {
        let (before, after, state) = {
            let mut paginator = session.lock();
            let before = paginator.current_page_index();
            let after = paginator.go_next()?;
            (before, after, paginator.state().clone())
        };
        if after != before {
            self.persist_into(session, &state, None).await;
        }
        Ok(after)
    }

    /// Move one page back and persist if the page changed.
    pub async fn previous_page(&self, session: &Mutex<SessionPaginator>) -> usize {
        let (before, after, state) = {
            let mut paginator = session.lock();
            let before = paginator.current_page_index();
            let after = paginator.go_previous();
            (before, after, paginator.state().clone())
        };
        if after != before {
            self.persist_into(session, &state, None).await;
        }
        after
    }

    /// Persist `state` and stamp the session on success. Failures are logged.
    pub(crate) async fn persist_into(
        &self,
        session: &Mutex<SessionPaginator>,
        state: &SessionState,
        ticket: Option<GenerationTicket>,
    ) {
        match self.persist_guarded(state, ticket).await {
            Ok(outcome) => {
                if let Some(at) = outcome.saved_at() {
                    session.lock().mark_saved(at);
                }
            }
            Err(AutosaveError::Superseded) => {}
            Err(e) => warn!(form_id = %self.form_id, error = %e, "[fc-04] Autosave failed"),
        }
    }

    /// Persist, refusing to write once `ticket` (if any) is stale. A session
    /// cleared by [`AutosaveApi::clear`] is never written back.
    async fn persist_guarded(
        &self,
        state: &SessionState,
        ticket: Option<GenerationTicket>,
    ) -> Result<PersistOutcome, AutosaveError> {
        if !state.has_responses() {
            return Ok(PersistOutcome::NothingToSave);
        }

        let saved_at = Utc::now();
        let snapshot = SessionSnapshot {
            responses: state.responses.clone(),
            current_page: state.current_page,
            saved_at,
        };
        {
            let _guard = self.snapshot_lock.lock();
            if let Some(ticket) = ticket {
                self.ensure_current(ticket)?;
            }
            self.store.set_json(&self.snapshot_key(), &snapshot)?;
        }

        if let Some(ticket) = ticket {
            self.ensure_current(ticket)?;
        }
        let request = self.save_request(
            state.responses.clone(),
            state.current_page,
            SessionStatus::InProgress,
        );
        let remote = self.save_remote(request).await;
        debug!(
            form_id = %self.form_id,
            page = state.current_page,
            answers = state.responses.len(),
            ?remote,
            "[fc-04] Session persisted"
        );
        Ok(PersistOutcome::Saved { saved_at, remote })
    }

    /// Resume into `session`, replacing its state when a source wins.
    pub async fn restore_into(
        &self,
        session: &Mutex<SessionPaginator>,
        resume_id: Option<&str>,
    ) -> Result<Option<ResumedSession>, AutosaveError> {
        let resumed = self.resume(resume_id).await?;
        if let Some(found) = &resumed {
            let mut paginator = session.lock();
            paginator.restore(found.responses.clone(), found.current_page);
            if let Some(at) = found.saved_at {
                paginator.mark_saved(at);
            }
        }
        Ok(resumed)
    }
}

#[async_trait]
impl AutosaveApi for AutosavePersistor {
    async fn persist(&self, state: &SessionState) -> Result<PersistOutcome, AutosaveError> {
        self.persist_guarded(state, None).await
    }

    async fn resume(
        &self,
        resume_id: Option<&str>,
    ) -> Result<Option<ResumedSession>, AutosaveError> {
        let ticket = self.generation.current();
        let online = self.connectivity.is_online();

        let mut by_resume_id = None;
        if let (Some(id), true) = (resume_id, online) {
            let found = self
                .fetch_candidate("resume_id", self.backend.fetch_session(id))
                .await;
            self.ensure_current(ticket)?;
            by_resume_id = found.map(|s| (id.to_string(), s));
        }

        let mut by_token = None;
        if let (None, Some(token), true) = (&by_resume_id, self.token.as_deref(), online) {
            by_token = self
                .fetch_candidate("token", self.backend.fetch_session_by_token(token))
                .await;
            self.ensure_current(ticket)?;
        }

        let local = if by_resume_id.is_none() && by_token.is_none() {
            accept_local(self.local_snapshot()?)
        } else {
            None
        };

        let resumed = choose(by_resume_id, by_token, local);
        match &resumed {
            Some(found) => info!(
                form_id = %self.form_id,
                source = ?found.source,
                page = found.current_page,
                "[fc-04] Session resumed"
            ),
            None => debug!(form_id = %self.form_id, "[fc-04] No session to resume"),
        }
        Ok(resumed)
    }

    async fn clear(&self) -> Result<(), AutosaveError> {
        {
            let _guard = self.snapshot_lock.lock();
            self.generation.invalidate();
            self.store.remove(&self.snapshot_key())?;
        }

        let request = self.save_request(ResponseMap::new(), 0, SessionStatus::Completed);
        let remote = self.save_remote(request).await;
        info!(form_id = %self.form_id, ?remote, "[fc-04] Session cleared");
        Ok(())
    }

    fn local_snapshot(&self) -> Result<Option<SessionSnapshot>, AutosaveError> {
        Ok(self.store.get_json(&self.snapshot_key())?)
    }
}
