//! # Token Verifier Service
//!
//! Drives the verification state machine. Every load begins a new
//! generation; a backend response that arrives after a newer load or a
//! teardown is dropped without touching state.

use async_trait::async_trait;
use chrono::Utc;
use fc_01_connectivity::ConnectivityHandle;
use parking_lot::RwLock;
use shared_store::{KeyValueStore, LocalCache};
use shared_types::{
    BackendError, DeviceProfile, FormDefinition, GenerationTicket, SecurityMode,
    SessionGeneration, TokenRecord,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::adapters::{DeviceRegistry, VerificationCache};
use crate::config::VerifierConfig;
use crate::domain::{
    check_token_usable, is_pin_message, is_valid_pin, AccessDenied, AccessFailure,
    PendingVerification, VerificationError, VerificationState, VerifiedAccess, VerifiedVia,
    VerifierError, OFFLINE_ENUMERATOR, OFFLINE_NO_CACHE_MESSAGE, VERIFY_FAILED_MESSAGE,
};
use crate::ports::{TokenBackend, TokenVerifierApi};

const PIN_REJECTED_FALLBACK: &str = "Incorrect PIN. Please try again.";

#[derive(Default)]
struct Session {
    token: Option<String>,
    state: VerificationState,
}

/// Token Verifier - the access gate in front of every form.
pub struct TokenVerifier {
    config: VerifierConfig,
    backend: Arc<dyn TokenBackend>,
    local_cache: Arc<dyn LocalCache>,
    devices: DeviceRegistry,
    verified: VerificationCache,
    connectivity: ConnectivityHandle,
    generation: SessionGeneration,
    session: RwLock<Session>,
}

impl TokenVerifier {
    /// Create a verifier. Device identity and verification cache live in
    /// `store`.
    pub fn new(
        config: VerifierConfig,
        backend: Arc<dyn TokenBackend>,
        local_cache: Arc<dyn LocalCache>,
        store: Arc<dyn KeyValueStore>,
        connectivity: ConnectivityHandle,
    ) -> Self {
        Self {
            config,
            backend,
            local_cache,
            devices: DeviceRegistry::new(store.clone(), DeviceProfile::default()),
            verified: VerificationCache::new(store),
            connectivity,
            generation: SessionGeneration::new(),
            session: RwLock::new(Session::default()),
        }
    }

    /// Describe this device with `profile` when an identity is first created.
    pub fn with_device_profile(mut self, profile: DeviceProfile) -> Self {
        self.devices = self.devices.with_profile(profile);
        self
    }

    /// Shared generation counter; invalidating it cancels in-flight work.
    pub fn generation_handle(&self) -> SessionGeneration {
        self.generation.clone()
    }

    /// Device registry used for handshakes.
    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    /// Verification cache used for handshakes.
    pub fn verification_cache(&self) -> &VerificationCache {
        &self.verified
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, BackendError> {
        let timeout = Duration::from_secs(self.config.request_timeout_secs);
        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout),
        }
    }

    /// Apply `state` if `ticket` is still current.
    fn commit(
        &self,
        ticket: GenerationTicket,
        state: VerificationState,
    ) -> Result<VerificationState, VerifierError> {
        let mut session = self.session.write();
        if !self.generation.is_current(ticket) {
            debug!(state = state.label(), "[fc-02] Dropping stale verification result");
            return Err(VerifierError::Superseded);
        }
        info!(state = state.label(), "[fc-02] Verification state changed");
        session.state = state.clone();
        Ok(state)
    }

    fn ensure_current(&self, ticket: GenerationTicket) -> Result<(), VerifierError> {
        if self.generation.is_current(ticket) {
            Ok(())
        } else {
            Err(VerifierError::Superseded)
        }
    }

    /// Grant access and cache the forms for offline use.
    async fn grant(&self, record: &TokenRecord, via: VerifiedVia) -> VerificationState {
        for form in &record.forms {
            if let Err(e) = self.local_cache.cache_form(form).await {
                warn!(form_id = %form.id, error = %e, "[fc-02] Failed to cache form");
            }
        }
        info!(
            token_id = %record.token_id,
            forms = record.forms.len(),
            ?via,
            "[fc-02] Access granted"
        );
        VerificationState::Verified(VerifiedAccess::from_record(record, via))
    }

    /// Access from cached forms when the backend cannot be reached.
    async fn offline_fallback(&self, token: &str, offline: bool) -> VerificationState {
        let message = if offline {
            OFFLINE_NO_CACHE_MESSAGE
        } else {
            VERIFY_FAILED_MESSAGE
        };

        match self.local_cache.get_cached_forms().await {
            Ok(forms) if !forms.is_empty() => {
                info!(
                    forms = forms.len(),
                    "[fc-02] Backend unreachable, using cached forms"
                );
                VerificationState::Verified(VerifiedAccess {
                    token_id: token.to_string(),
                    enumerator_name: OFFLINE_ENUMERATOR.to_string(),
                    security_mode: SecurityMode::Standard,
                    forms,
                    remaining_submissions: None,
                    quota_progress: None,
                    via: VerifiedVia::OfflineFallback,
                })
            }
            Ok(_) => VerificationState::Error(AccessFailure::Unavailable {
                message: message.to_string(),
            }),
            Err(e) => {
                warn!(error = %e, "[fc-02] Cached forms unreadable");
                VerificationState::Error(AccessFailure::Unavailable {
                    message: message.to_string(),
                })
            }
        }
    }

    /// Decide the state for a freshly fetched token.
    async fn resolve(&self, record: TokenRecord) -> VerificationState {
        if let Err(denied) = check_token_usable(&record, Utc::now()) {
            info!(token_id = %record.token_id, reason = %denied, "[fc-02] Token not usable");
            return VerificationState::Error(AccessFailure::Denied(denied));
        }

        let mode = record.security_mode;
        if mode == SecurityMode::Standard {
            return self.grant(&record, VerifiedVia::Open).await;
        }

        let device = match self.devices.get_or_create() {
            Ok(device) => device,
            Err(e) => {
                warn!(error = %e, "[fc-02] Device identity unavailable");
                return VerificationState::Error(AccessFailure::Unavailable {
                    message: e.to_string(),
                });
            }
        };

        if self.verified.is_verified(&record.token_id, &device.device_id) {
            debug!(token_id = %record.token_id, "[fc-02] Device already verified");
            return self.grant(&record, VerifiedVia::CachedDevice).await;
        }

        if mode == SecurityMode::DeviceLocked && record.device_locked {
            info!(token_id = %record.token_id, "[fc-02] Token locked to another device");
            return VerificationState::Error(AccessFailure::Denied(
                AccessDenied::LockedToAnotherDevice,
            ));
        }

        VerificationState::NeedsVerification(PendingVerification {
            mode,
            record,
            error: None,
        })
    }

    /// Map a failed registration onto the state machine.
    fn handshake_failure(
        &self,
        pending: PendingVerification,
        err: BackendError,
    ) -> VerificationState {
        let Some(denied) = AccessDenied::from_backend(&err) else {
            warn!(error = %err, "[fc-02] Handshake failed, retry allowed");
            return VerificationState::NeedsVerification(PendingVerification {
                error: Some(VerificationError::Network(err.to_string())),
                ..pending
            });
        };

        let message = err.detail().unwrap_or_default().trim().to_string();
        let pin_problem = pending.mode == SecurityMode::PinProtected
            && (is_pin_message(&message) || matches!(denied, AccessDenied::Forbidden(_)));

        if pin_problem {
            info!(token_id = %pending.record.token_id, "[fc-02] PIN rejected");
            let message = if message.is_empty() {
                PIN_REJECTED_FALLBACK.to_string()
            } else {
                message
            };
            return VerificationState::NeedsVerification(PendingVerification {
                error: Some(VerificationError::PinRejected(message)),
                ..pending
            });
        }

        info!(token_id = %pending.record.token_id, reason = %denied, "[fc-02] Handshake denied");
        VerificationState::Error(AccessFailure::Denied(denied))
    }

    async fn handshake(&self, pin: Option<&str>) -> Result<VerificationState, VerifierError> {
        let ticket = self.generation.current();
        let pending = match self.state() {
            VerificationState::NeedsVerification(pending) => pending,
            _ => return Err(VerifierError::NotAwaitingVerification),
        };

        let pin = match pending.mode {
            SecurityMode::PinProtected => {
                match pin.filter(|p| is_valid_pin(p, self.config.pin_length)) {
                    Some(pin) => Some(pin),
                    None => {
                        let state = VerificationState::NeedsVerification(PendingVerification {
                            error: Some(VerificationError::InvalidPinFormat {
                                length: self.config.pin_length,
                            }),
                            ..pending
                        });
                        return self.commit(ticket, state);
                    }
                }
            }
            _ => None,
        };

        let device = match self.devices.get_or_create() {
            Ok(device) => device,
            Err(e) => {
                warn!(error = %e, "[fc-02] Device identity unavailable");
                let state = VerificationState::NeedsVerification(PendingVerification {
                    error: Some(VerificationError::Network(e.to_string())),
                    ..pending
                });
                return self.commit(ticket, state);
            }
        };

        let token = pending.record.token_id.clone();
        debug!(token_id = %token, mode = ?pending.mode, "[fc-02] Registering device");
        let result = self
            .call(self.backend.register_device(&token, &device, pin))
            .await;
        self.ensure_current(ticket)?;

        let state = match result {
            Ok(registration) => match self.verified.record(&token, &device.device_id) {
                Ok(()) => {
                    let mut record = pending.record;
                    record.device_locked = registration.device_locked;
                    self.grant(&record, VerifiedVia::Handshake).await
                }
                Err(e) => {
                    // A locked token readmits this device only through the cache.
                    warn!(token_id = %token, error = %e, "[fc-02] Could not record verified device");
                    VerificationState::NeedsVerification(PendingVerification {
                        error: Some(VerificationError::Storage(e.to_string())),
                        ..pending
                    })
                }
            },
            Err(err) => self.handshake_failure(pending, err),
        };
        self.commit(ticket, state)
    }

    async fn cached_form(
        &self,
        form_id: &str,
        listed: Option<FormDefinition>,
    ) -> Result<FormDefinition, VerifierError> {
        match self.local_cache.get_cached_form(form_id).await {
            Ok(Some(form)) => return Ok(form),
            Ok(None) => {}
            Err(e) => warn!(form_id, error = %e, "[fc-02] Cached form unreadable"),
        }
        listed.ok_or_else(|| VerifierError::FormUnavailable(form_id.to_string()))
    }
}

#[async_trait]
impl TokenVerifierApi for TokenVerifier {
    async fn load(&self, token: &str) -> Result<VerificationState, VerifierError> {
        let ticket = self.generation.begin();
        {
            let mut session = self.session.write();
            session.token = Some(token.to_string());
            session.state = VerificationState::Loading;
        }

        if !self.connectivity.is_online() {
            debug!("[fc-02] Offline, skipping token fetch");
            let state = self.offline_fallback(token, true).await;
            return self.commit(ticket, state);
        }

        let result = self.call(self.backend.fetch_token(token)).await;
        self.ensure_current(ticket)?;

        let state = match result {
            Ok(record) => self.resolve(record).await,
            Err(err) => match AccessDenied::from_backend(&err) {
                Some(denied) => {
                    info!(reason = %denied, "[fc-02] Token rejected");
                    VerificationState::Error(AccessFailure::Denied(denied))
                }
                None => {
                    warn!(error = %err, "[fc-02] Token fetch failed");
                    let offline = !self.connectivity.is_online();
                    self.offline_fallback(token, offline).await
                }
            },
        };
        self.commit(ticket, state)
    }

    async fn register_device(&self) -> Result<VerificationState, VerifierError> {
        self.handshake(None).await
    }

    async fn submit_pin(&self, pin: &str) -> Result<VerificationState, VerifierError> {
        self.handshake(Some(pin)).await
    }

    async fn retry(&self) -> Result<VerificationState, VerifierError> {
        let token = self
            .session
            .read()
            .token
            .clone()
            .ok_or(VerifierError::NoToken)?;
        self.load(&token).await
    }

    async fn open_form(&self, form_id: &str) -> Result<FormDefinition, VerifierError> {
        let ticket = self.generation.current();
        let access = match self.state() {
            VerificationState::Verified(access) => access,
            _ => return Err(VerifierError::NotVerified),
        };
        let listed = access.form(form_id).cloned();

        if !access.is_offline() && listed.is_none() {
            return Err(AccessDenied::FormNotAssigned(form_id.to_string()).into());
        }
        if access.is_offline() || !self.connectivity.is_online() {
            return self.cached_form(form_id, listed).await;
        }

        let result = self
            .call(self.backend.fetch_form(&access.token_id, form_id))
            .await;
        self.ensure_current(ticket)?;

        match result {
            Ok(form) => {
                if let Err(e) = self.local_cache.cache_form(&form).await {
                    warn!(form_id, error = %e, "[fc-02] Failed to cache form");
                }
                Ok(form)
            }
            Err(BackendError::NotFound(_)) => {
                Err(AccessDenied::FormNotAssigned(form_id.to_string()).into())
            }
            Err(err) => match AccessDenied::from_backend(&err) {
                Some(denied) => Err(denied.into()),
                None => {
                    warn!(form_id, error = %err, "[fc-02] Form fetch failed, using cache");
                    self.cached_form(form_id, listed).await
                }
            },
        }
    }

    fn state(&self) -> VerificationState {
        self.session.read().state.clone()
    }

    fn teardown(&self) {
        debug!("[fc-02] Teardown, invalidating in-flight work");
        self.generation.invalidate();
    }
}
