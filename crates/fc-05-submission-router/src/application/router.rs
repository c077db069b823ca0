//! # Submission Router Service
//!
//! Delivers a finished session immediately when online, otherwise (or on
//! any delivery failure) hands it to the Local Cache queue.

use async_trait::async_trait;
use fc_01_connectivity::ConnectivityHandle;
use fc_03_session_paginator::{SessionNavigation, SessionPaginator};
use fc_04_autosave::AutosaveApi;
use parking_lot::Mutex;
use shared_store::{KeyValueStore, KeyValueStoreExt, LocalCache};
use shared_types::keys::completion_settings_key;
use shared_types::{BackendError, DeviceIdentity, FormSettings, GeoLocation, Submission};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::SubmissionConfig;
use crate::domain::{CompletionNotice, SubmissionOutcome, SubmissionReceipt, SubmitError};
use crate::ports::{LocationProvider, SubmissionApi, SubmissionBackend};

const OUTCOME_CHANNEL_CAPACITY: usize = 16;

/// Submission Router for sessions opened through one collection link.
pub struct SubmissionRouter {
    config: SubmissionConfig,
    token: Option<String>,
    device: DeviceIdentity,
    backend: Arc<dyn SubmissionBackend>,
    local_cache: Arc<dyn LocalCache>,
    autosave: Arc<dyn AutosaveApi>,
    store: Arc<dyn KeyValueStore>,
    connectivity: ConnectivityHandle,
    location: Arc<dyn LocationProvider>,
    outcomes: broadcast::Sender<SubmissionOutcome>,
}

impl SubmissionRouter {
    /// Create a router.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SubmissionConfig,
        token: Option<String>,
        device: DeviceIdentity,
        backend: Arc<dyn SubmissionBackend>,
        local_cache: Arc<dyn LocalCache>,
        autosave: Arc<dyn AutosaveApi>,
        store: Arc<dyn KeyValueStore>,
        connectivity: ConnectivityHandle,
        location: Arc<dyn LocationProvider>,
    ) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            config,
            token,
            device,
            backend,
            local_cache,
            autosave,
            store,
            connectivity,
            location,
            outcomes,
        }
    }

    /// Completion notice last recorded for `form_id`.
    pub fn completion_notice(&self, form_id: &str) -> Option<CompletionNotice> {
        match self.store.get_json(&completion_settings_key(form_id)) {
            Ok(notice) => notice,
            Err(e) => {
                warn!(form_id, error = %e, "[fc-05] Unreadable completion notice");
                None
            }
        }
    }

    async fn locate(&self) -> Option<GeoLocation> {
        tokio::time::timeout(
            self.config.location_timeout(),
            self.location.current_location(),
        )
        .await
        .unwrap_or_else(|_| {
            debug!("[fc-05] Location fix timed out");
            None
        })
    }

    async fn deliver(&self, submission: &Submission) -> Result<(), BackendError> {
        let request = self.backend.submit(self.token.as_deref(), submission);
        match tokio::time::timeout(self.config.request_timeout(), request).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout),
        }
    }

    /// Deliver or queue. Only a failed queue write is an error.
    async fn route(&self, submission: &Submission) -> Result<SubmissionOutcome, SubmitError> {
        if self.connectivity.is_online() {
            match self.deliver(submission).await {
                Ok(()) => return Ok(SubmissionOutcome::SubmittedNow),
                Err(e) => warn!(
                    submission_id = %submission.id,
                    error = %e,
                    "[fc-05] Delivery failed, queueing"
                ),
            }
        }

        if let Err(e) = self.local_cache.save_submission(submission).await {
            error!(
                submission_id = %submission.id,
                form_id = %submission.form_id,
                error = %e,
                "[fc-05] Could not queue submission"
            );
            return Err(SubmitError::Storage(e));
        }
        Ok(SubmissionOutcome::Queued)
    }

    fn record_notice(&self, form_id: &str, settings: &FormSettings) -> CompletionNotice {
        let notice = CompletionNotice {
            thank_you_message: settings.thank_you_message().to_string(),
            primary_color: settings.primary_color.clone(),
        };
        if let Err(e) = self
            .store
            .set_json(&completion_settings_key(form_id), &notice)
        {
            warn!(form_id, error = %e, "[fc-05] Could not record completion notice");
        }
        notice
    }
}

#[async_trait]
impl SubmissionApi for SubmissionRouter {
    async fn submit(
        &self,
        session: &Mutex<SessionPaginator>,
    ) -> Result<SubmissionReceipt, SubmitError> {
        // Reset before any await. Restored only if the submission cannot be kept.
        let (form_id, settings, state) = {
            let mut paginator = session.lock();
            if !paginator.is_last_page() {
                return Err(SubmitError::NotOnFinalPage {
                    current: paginator.current_page_index() + 1,
                    count: paginator.page_count(),
                });
            }
            paginator.validate_current_page()?;
            let form = paginator.form();
            let taken = (
                form.id.clone(),
                form.settings.clone(),
                paginator.state().clone(),
            );
            paginator.reset();
            taken
        };

        let mut submission =
            Submission::new(form_id.clone(), state.responses.clone(), self.device.clone());
        submission.token = self.token.clone();
        submission.location = self.locate().await;
        submission.source = self.config.source.clone();

        let outcome = match self.route(&submission).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let mut paginator = session.lock();
                paginator.restore(state.responses, state.current_page);
                if let Some(at) = state.last_saved {
                    paginator.mark_saved(at);
                }
                return Err(e);
            }
        };
        info!(
            submission_id = %submission.id,
            form_id = %form_id,
            ?outcome,
            "[fc-05] Submission routed"
        );

        if let Err(e) = self.autosave.clear().await {
            warn!(form_id = %form_id, error = %e, "[fc-05] Could not clear autosaved session");
        }

        let notice = self.record_notice(&form_id, &settings);
        // No subscribers is fine.
        let _ = self.outcomes.send(outcome);

        Ok(SubmissionReceipt {
            submission_id: submission.id,
            form_id,
            outcome,
            notice,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<SubmissionOutcome> {
        self.outcomes.subscribe()
    }
}
