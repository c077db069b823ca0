//! # Integration Test Flows
//!
//! Properties that span components:
//!
//! - Token Verifier (02) handshakes against a shared backend, seen from
//!   one or more devices
//! - Session Paginator (03) blocking navigation on invalid pages
//! - Connectivity Monitor (01) triggering the Sync Agent on reconnect
//! - Submission Router (05) queueing through the Local Cache

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use fc_01_connectivity::{
        ConnectivityApi, ConnectivityConfig, ConnectivityMonitor, ConnectivitySignal,
        TransitionOutcome,
    };
    use fc_02_token_verifier::{
        AccessDenied, AccessFailure, MockTokenBackend, TokenVerifier, TokenVerifierApi,
        VerificationState, VerifiedVia, VerifierConfig,
    };
    use fc_03_session_paginator::{
        PaginatorConfig, PaginatorError, SessionNavigation, SessionPaginator,
    };
    use shared_store::{InMemoryStore, KvLocalCache, LocalCache, MockSyncAgent};
    use shared_types::{
        DeviceIdentity, DeviceProfile, FieldKind, FormDefinition, FormField, ResponseMap,
        SecurityMode, Submission, TokenRecord,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// One device: its own store, talking to a shared backend.
    struct Device {
        store: Arc<InMemoryStore>,
        signal: ConnectivitySignal,
    }

    impl Device {
        fn new() -> Self {
            Self {
                store: Arc::new(InMemoryStore::new()),
                signal: ConnectivitySignal::new(true),
            }
        }

        /// A fresh verifier on this device, as after a page reload.
        fn verifier(&self, backend: &Arc<MockTokenBackend>) -> TokenVerifier {
            TokenVerifier::new(
                VerifierConfig::for_testing(),
                backend.clone(),
                Arc::new(KvLocalCache::new(self.store.clone())),
                self.store.clone(),
                self.signal.handle(),
            )
        }
    }

    fn token(mode: SecurityMode) -> TokenRecord {
        let mut record = TokenRecord::new("t1", "Amina");
        record.security_mode = mode;
        record.forms = vec![FormDefinition::new(
            "f1",
            "Household",
            vec![FormField::new("q1", "Q1", FieldKind::Text)],
        )];
        record
    }

    // =============================================================================
    // TOKEN VERIFIER FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_standard_link_needs_no_handshake() {
        let backend = Arc::new(MockTokenBackend::new().with_token(token(SecurityMode::Standard)));
        let device = Device::new();

        let state = device.verifier(&backend).load("t1").await.unwrap();

        assert!(state.is_verified());
        assert_eq!(backend.fetch_calls(), 1);
        assert_eq!(backend.register_calls(), 0);
    }

    #[tokio::test]
    async fn test_device_lock_binds_first_device_only() {
        let backend =
            Arc::new(MockTokenBackend::new().with_token(token(SecurityMode::DeviceLocked)));
        let first = Device::new();
        let second = Device::new();

        // First device registers and owns the link.
        let verifier = first.verifier(&backend);
        let state = verifier.load("t1").await.unwrap();
        assert!(matches!(state, VerificationState::NeedsVerification(_)));
        let state = verifier.register_device().await.unwrap();
        assert!(state.is_verified());
        assert_eq!(backend.register_calls(), 1);

        // Second device is turned away.
        let state = second.verifier(&backend).load("t1").await.unwrap();
        assert_eq!(
            state,
            VerificationState::Error(AccessFailure::Denied(AccessDenied::LockedToAnotherDevice))
        );

        // First device comes back later without a prompt.
        let state = first.verifier(&backend).load("t1").await.unwrap();
        assert_eq!(state.access().map(|a| a.via), Some(VerifiedVia::CachedDevice));
        assert_eq!(backend.register_calls(), 1);
    }

    #[tokio::test]
    async fn test_wrong_pin_keeps_prompt_and_cache() {
        let backend = Arc::new(
            MockTokenBackend::new()
                .with_token(token(SecurityMode::PinProtected))
                .with_pin("t1", "4821"),
        );
        let device = Device::new();
        let verifier = device.verifier(&backend);
        verifier.load("t1").await.unwrap();

        let state = verifier.submit_pin("1111").await.unwrap();

        assert!(matches!(state, VerificationState::NeedsVerification(_)));
        let message = state.verification_error().unwrap().to_string();
        assert!(!message.is_empty());
        assert!(verifier.verification_cache().entries().unwrap().is_empty());

        // The prompt stays usable.
        assert!(verifier.submit_pin("4821").await.unwrap().is_verified());
    }

    // =============================================================================
    // SESSION FLOWS
    // =============================================================================

    #[test]
    fn test_required_field_blocks_navigation() {
        let form = FormDefinition::new(
            "f1",
            "Household",
            vec![
                FormField::new("name", "Name", FieldKind::Text).required(),
                FormField::page_break("br1"),
                FormField::new("age", "Age", FieldKind::Number),
            ],
        );
        let mut session = SessionPaginator::load(form, &PaginatorConfig::default()).unwrap();

        let err = session.go_next().unwrap_err();
        assert!(matches!(err, PaginatorError::Validation(_)));
        assert_eq!(session.current_page_index(), 0);

        session.set_response("name", json!("Wanjiru")).unwrap();
        assert_eq!(session.go_next().unwrap(), 1);
    }

    // =============================================================================
    // CONNECTIVITY FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_reconnect_triggers_exactly_one_sync() {
        let cache: Arc<dyn LocalCache> =
            Arc::new(KvLocalCache::new(Arc::new(InMemoryStore::new())));
        cache
            .save_submission(&Submission::new(
                "f1",
                ResponseMap::new(),
                DeviceIdentity::generate(DeviceProfile::default()),
            ))
            .await
            .unwrap();
        let agent = Arc::new(MockSyncAgent::new());
        let monitor = ConnectivityMonitor::new(
            ConnectivityConfig::for_testing(),
            false,
            cache,
            agent.clone(),
        );

        let outcome = monitor.set_online(true).await;
        assert!(matches!(outcome, TransitionOutcome::ReconnectedSynced(_)));

        // Repeated readings are not transitions.
        for _ in 0..5 {
            assert_eq!(monitor.set_online(true).await, TransitionOutcome::Unchanged);
        }
        assert_eq!(agent.calls(), 1);
        assert_eq!(monitor.pending_count(), 1);
    }
}
