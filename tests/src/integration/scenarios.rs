//! # Collection Scenarios
//!
//! End-to-end checks of the four reference situations:
//!
//! 1. A required text question and a number question split by a page break
//!    become two pages.
//! 2. A PIN-protected link accepts the right PIN, locks to the device and is
//!    remembered in the verification cache.
//! 3. A submission made offline is queued exactly once and the session is
//!    cleared.
//! 4. An explicit resume id beats a newer local snapshot.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use parking_lot::Mutex;
    use serde_json::json;

    use fc_01_connectivity::{
        ConnectivityApi, ConnectivityConfig, ConnectivityMonitor, ConnectivitySignal,
    };
    use fc_02_token_verifier::{
        MockTokenBackend, TokenVerifier, TokenVerifierApi, VerificationState, VerifierConfig,
    };
    use fc_03_session_paginator::{paginate, PaginatorConfig, SessionNavigation, SessionPaginator};
    use fc_04_autosave::{
        AutosaveApi, AutosaveConfig, AutosavePersistor, MockSessionBackend, RemoteSession,
        ResumeSource, SessionSnapshot, SessionStatus,
    };
    use fc_05_submission_router::{
        FixedLocation, MockSubmissionBackend, SubmissionApi, SubmissionConfig, SubmissionOutcome,
        SubmissionRouter,
    };
    use shared_store::{InMemoryStore, KeyValueStoreExt, KvLocalCache, LocalCache, MockSyncAgent};
    use shared_types::keys::session_snapshot_key;
    use shared_types::{
        DeviceIdentity, DeviceProfile, FieldKind, FormDefinition, FormField, ResponseMap,
        SecurityMode, TokenRecord,
    };

    // =============================================================================
    // SCENARIO 1: PAGE BREAKS
    // =============================================================================

    #[test]
    fn test_scenario_page_break_splits_two_pages() {
        let fields = vec![
            FormField::new("name", "Name", FieldKind::Text).required(),
            FormField::page_break("br1"),
            FormField::new("age", "Age", FieldKind::Number),
        ];

        let pages = paginate(&fields, "Survey");

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].field_ids().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(pages[1].field_ids().collect::<Vec<_>>(), vec!["age"]);
    }

    // =============================================================================
    // SCENARIO 2: PIN HANDSHAKE
    // =============================================================================

    #[tokio::test]
    async fn test_scenario_pin_handshake_locks_device() {
        let mut record = TokenRecord::new("t1", "Amina");
        record.security_mode = SecurityMode::PinProtected;
        record.forms = vec![FormDefinition::new("f1", "Household", vec![])];
        let backend = Arc::new(
            MockTokenBackend::new()
                .with_token(record)
                .with_pin("t1", "4821"),
        );

        let store = Arc::new(InMemoryStore::new());
        let signal = ConnectivitySignal::new(true);
        let verifier = TokenVerifier::new(
            VerifierConfig::for_testing(),
            backend.clone(),
            Arc::new(KvLocalCache::new(store.clone())),
            store.clone(),
            signal.handle(),
        );

        let state = verifier.load("t1").await.unwrap();
        assert!(matches!(state, VerificationState::NeedsVerification(_)));

        let state = verifier.submit_pin("4821").await.unwrap();
        assert!(state.is_verified());
        assert!(backend.record("t1").unwrap().device_locked);

        let device = verifier.devices().get().unwrap().unwrap();
        let entries = verifier.verification_cache().entries().unwrap();
        assert_eq!(entries.get("t1"), Some(&device.device_id));
        assert_eq!(backend.locked_device("t1"), Some(device.device_id));
    }

    // =============================================================================
    // SCENARIO 3: OFFLINE SUBMIT
    // =============================================================================

    #[tokio::test]
    async fn test_scenario_offline_submit_is_queued() {
        let store = Arc::new(InMemoryStore::new());
        let cache: Arc<dyn LocalCache> = Arc::new(KvLocalCache::new(store.clone()));
        let monitor = ConnectivityMonitor::new(
            ConnectivityConfig::for_testing(),
            false,
            cache.clone(),
            Arc::new(MockSyncAgent::new()),
        );
        let backend = Arc::new(MockSubmissionBackend::new());

        let persistor = Arc::new(AutosavePersistor::new(
            AutosaveConfig::for_testing(),
            "f1",
            Some("t1".into()),
            store.clone(),
            Arc::new(MockSessionBackend::new()),
            monitor.handle(),
        ));
        let router = SubmissionRouter::new(
            SubmissionConfig::for_testing(),
            Some("t1".into()),
            DeviceIdentity::generate(DeviceProfile::default()),
            backend.clone(),
            cache.clone(),
            persistor.clone(),
            store.clone(),
            monitor.handle(),
            Arc::new(FixedLocation::default()),
        );
        let mut outcomes = router.subscribe();

        let form = FormDefinition::new(
            "f1",
            "Consent",
            vec![FormField::new("q1", "Do you agree?", FieldKind::Text)],
        );
        let session =
            Mutex::new(SessionPaginator::load(form, &PaginatorConfig::default()).unwrap());
        session.lock().set_response("q1", json!("yes")).unwrap();
        let state = session.lock().state().clone();
        persistor.persist(&state).await.unwrap();

        assert_eq!(monitor.refresh_pending_count().await.unwrap(), 0);
        let receipt = router.submit(&session).await.unwrap();
        assert_eq!(monitor.refresh_pending_count().await.unwrap(), 1);

        assert_eq!(receipt.outcome, SubmissionOutcome::Queued);
        assert_eq!(outcomes.recv().await.unwrap(), SubmissionOutcome::Queued);
        assert_eq!(backend.calls(), 0);

        let queued = cache.pending_submissions().await.unwrap();
        assert_eq!(queued[0].form_id, "f1");
        assert_eq!(queued[0].data.get("q1"), Some(&json!("yes")));

        assert!(!session.lock().has_responses());
        assert!(persistor.local_snapshot().unwrap().is_none());
    }

    // =============================================================================
    // SCENARIO 4: RESUME PRIORITY
    // =============================================================================

    #[tokio::test]
    async fn test_scenario_resume_id_beats_newer_local_snapshot() {
        let mut remote_answers = ResponseMap::new();
        remote_answers.insert("q1".into(), json!("remote"));
        let remote = RemoteSession {
            id: Some("s1".into()),
            form_id: "f1".into(),
            token: Some("t1".into()),
            responses: remote_answers,
            current_page: 2,
            status: SessionStatus::InProgress,
            updated_at: Some(Utc::now() - Duration::days(1)),
        };

        let store = Arc::new(InMemoryStore::new());
        let mut local_answers = ResponseMap::new();
        local_answers.insert("q1".into(), json!("local"));
        store
            .set_json(
                &session_snapshot_key("f1", Some("t1")),
                &SessionSnapshot {
                    responses: local_answers,
                    current_page: 4,
                    saved_at: Utc::now(),
                },
            )
            .unwrap();

        let signal = ConnectivitySignal::new(true);
        let persistor = AutosavePersistor::new(
            AutosaveConfig::for_testing(),
            "f1",
            Some("t1".into()),
            store,
            Arc::new(MockSessionBackend::new().with_session(remote)),
            signal.handle(),
        );

        let resumed = persistor.resume(Some("s1")).await.unwrap().unwrap();

        assert_eq!(resumed.source, ResumeSource::ResumeId("s1".into()));
        assert_eq!(resumed.current_page, 2);
        assert_eq!(resumed.responses.get("q1"), Some(&json!("remote")));
    }
}
