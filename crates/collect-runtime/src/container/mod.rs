//! # Collect Container
//!
//! Builds every component once, over shared adapters.
//!
//! ```text
//! JsonFileStore ──► KvLocalCache ──┬──► ConnectivityMonitor ◄── QueueSyncAgent
//!       │                          │
//!       ├──────────────────────────┼──► TokenVerifier ◄──────┐
//!       │                          │                         │
//!       └──► per form: AutosavePersistor, SubmissionRouter ◄─┴── HttpCollectBackend
//! ```

pub mod config;

pub use config::RuntimeConfig;

use fc_01_connectivity::{ConnectivityApi, ConnectivityMonitor};
use fc_02_token_verifier::{TokenVerifier, VerifierError};
use fc_03_session_paginator::{PaginatorError, SessionPaginator};
use fc_04_autosave::{AutosaveError, AutosavePersistor};
use fc_05_submission_router::{FixedLocation, SubmissionRouter, SubmitError};
use parking_lot::Mutex;
use shared_store::{KvLocalCache, LocalCache, StoreError};
use shared_types::{DeviceProfile, FormDefinition};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::adapters::{HttpCollectBackend, HttpSetupError, JsonFileStore, QueueSyncAgent};

/// Runtime failures.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Local store could not be opened or written.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] HttpSetupError),

    /// Access handshake failed.
    #[error(transparent)]
    Verifier(#[from] VerifierError),

    /// Form could not be laid out or answered.
    #[error(transparent)]
    Paginator(#[from] PaginatorError),

    /// Session resume failed.
    #[error(transparent)]
    Autosave(#[from] AutosaveError),

    /// Submission neither delivered nor queued.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Device profile reported by the CLI.
pub fn cli_device_profile() -> DeviceProfile {
    DeviceProfile {
        device_type: "desktop".to_string(),
        browser: format!("fieldforce-collect/{}", crate::VERSION),
        os: std::env::consts::OS.to_string(),
        ..DeviceProfile::default()
    }
}

/// One form being filled: the session plus its persistor and router.
pub struct FormSession {
    /// Paginated session state.
    pub paginator: Arc<Mutex<SessionPaginator>>,
    /// Autosave for this form and token.
    pub persistor: Arc<AutosavePersistor>,
    /// Submission routing for this token.
    pub router: SubmissionRouter,
}

/// Every component, wired.
pub struct CollectContainer {
    /// Configuration in effect.
    pub config: RuntimeConfig,
    /// Durable key-value store.
    pub store: Arc<JsonFileStore>,
    /// Forms and queued submissions.
    pub local_cache: Arc<dyn LocalCache>,
    /// Backend client.
    pub backend: Arc<HttpCollectBackend>,
    /// Connectivity and queue status.
    pub monitor: Arc<ConnectivityMonitor>,
    /// Token handshake.
    pub verifier: Arc<TokenVerifier>,
}

impl CollectContainer {
    /// Open the store under `config.data_dir` and wire every component.
    pub fn open(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let store = Arc::new(JsonFileStore::open(config.store_path())?);
        let local_cache: Arc<dyn LocalCache> = Arc::new(KvLocalCache::new(store.clone()));

        let timeout = Duration::from_secs(config.verifier.request_timeout_secs);
        let backend = Arc::new(HttpCollectBackend::new(&config.backend_url, timeout)?);

        let sync_agent = Arc::new(QueueSyncAgent::new(local_cache.clone(), backend.clone()));
        let monitor = Arc::new(ConnectivityMonitor::new(
            config.connectivity.clone(),
            !config.start_offline,
            local_cache.clone(),
            sync_agent,
        ));

        let verifier = Arc::new(
            TokenVerifier::new(
                config.verifier.clone(),
                backend.clone(),
                local_cache.clone(),
                store.clone(),
                monitor.handle(),
            )
            .with_device_profile(cli_device_profile()),
        );

        info!(
            backend = %config.backend_url,
            store = %store.path().display(),
            online = monitor.is_online(),
            "Runtime wired"
        );

        Ok(Self {
            config,
            store,
            local_cache,
            backend,
            monitor,
            verifier,
        })
    }

    /// Lay out `form` and build its persistor and router for `token`.
    pub fn form_session(
        &self,
        token: &str,
        form: FormDefinition,
    ) -> Result<FormSession, RuntimeError> {
        let device = self.verifier.devices().get_or_create()?;
        let form_id = form.id.clone();
        let paginator = SessionPaginator::load(form, &self.config.paginator)?;

        let persistor = Arc::new(
            AutosavePersistor::new(
                self.config.autosave.clone(),
                form_id,
                Some(token.to_string()),
                self.store.clone(),
                self.backend.clone(),
                self.monitor.handle(),
            )
            .with_generation(self.verifier.generation_handle()),
        );

        let router = SubmissionRouter::new(
            self.config.submission.clone(),
            Some(token.to_string()),
            device,
            self.backend.clone(),
            self.local_cache.clone(),
            persistor.clone(),
            self.store.clone(),
            self.monitor.handle(),
            Arc::new(FixedLocation::default()),
        );

        Ok(FormSession {
            paginator: Arc::new(Mutex::new(paginator)),
            persistor,
            router,
        })
    }
}
