//! # Outbound Ports
//!
//! Backend contract for token metadata and device registration.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{BackendError, DeviceIdentity, FormDefinition, SecurityMode, TokenRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Backend answer to a device registration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceRegistration {
    /// Token is now bound to the registering device.
    pub device_locked: bool,
}

/// Token backend - outbound port.
#[async_trait]
pub trait TokenBackend: Send + Sync {
    /// `GET` token metadata. 404 means unknown, 403 carries the reason.
    async fn fetch_token(&self, token: &str) -> Result<TokenRecord, BackendError>;

    /// `POST` a device registration, with the PIN for `pin_protected` tokens.
    async fn register_device(
        &self,
        token: &str,
        device: &DeviceIdentity,
        pin: Option<&str>,
    ) -> Result<DeviceRegistration, BackendError>;

    /// `GET` one form assigned to the token.
    async fn fetch_form(&self, token: &str, form_id: &str)
        -> Result<FormDefinition, BackendError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

#[derive(Default)]
struct MockTokenState {
    records: HashMap<String, TokenRecord>,
    pins: HashMap<String, String>,
    locked_to: HashMap<String, String>,
    failure: Option<BackendError>,
}

/// In-memory backend that enforces device locks and PINs like the server.
#[derive(Default)]
pub struct MockTokenBackend {
    state: Mutex<MockTokenState>,
    fetch_calls: AtomicUsize,
    register_calls: AtomicUsize,
    form_calls: AtomicUsize,
}

impl MockTokenBackend {
    /// Empty backend: every token is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token.
    pub fn with_token(self, record: TokenRecord) -> Self {
        self.state
            .lock()
            .records
            .insert(record.token_id.clone(), record);
        self
    }

    /// Set the PIN of a `pin_protected` token.
    pub fn with_pin(self, token: &str, pin: &str) -> Self {
        self.state
            .lock()
            .pins
            .insert(token.to_string(), pin.to_string());
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

    /// Server-side view of a token.
    pub fn record(&self, token: &str) -> Option<TokenRecord> {
        self.state.lock().records.get(token).cloned()
    }

    /// Device a token is locked to.
    pub fn locked_device(&self, token: &str) -> Option<String> {
        self.state.lock().locked_to.get(token).cloned()
    }

    /// `fetch_token` calls so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// `register_device` calls so far.
    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    /// `fetch_form` calls so far.
    pub fn form_calls(&self) -> usize {
        self.form_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), BackendError> {
        match &self.state.lock().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TokenBackend for MockTokenBackend {
    async fn fetch_token(&self, token: &str) -> Result<TokenRecord, BackendError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.state
            .lock()
            .records
            .get(token)
            .cloned()
            .ok_or_else(|| BackendError::NotFound("Invalid token".to_string()))
    }

    async fn register_device(
        &self,
        token: &str,
        device: &DeviceIdentity,
        pin: Option<&str>,
    ) -> Result<DeviceRegistration, BackendError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut state = self.state.lock();
        let mode = state
            .records
            .get(token)
            .map(|r| r.security_mode)
            .ok_or_else(|| BackendError::NotFound("Invalid token".to_string()))?;

        if mode == SecurityMode::PinProtected {
            let expected = state.pins.get(token).map(String::as_str);
            if expected.is_none() || expected != pin {
                return Err(BackendError::from_status(403, "Invalid PIN"));
            }
        }
        if mode == SecurityMode::DeviceLocked {
            if let Some(owner) = state.locked_to.get(token) {
                if owner != &device.device_id {
                    return Err(BackendError::from_status(
                        403,
                        "Token is locked to another device",
                    ));
                }
            }
        }

        state
            .locked_to
            .insert(token.to_string(), device.device_id.clone());
        if let Some(record) = state.records.get_mut(token) {
            record.device_locked = true;
        }
        Ok(DeviceRegistration {
            device_locked: true,
        })
    }

    async fn fetch_form(
        &self,
        token: &str,
        form_id: &str,
    ) -> Result<FormDefinition, BackendError> {
        self.form_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let state = self.state.lock();
        let record = state
            .records
            .get(token)
            .ok_or_else(|| BackendError::NotFound("Invalid token".to_string()))?;
        record
            .form(form_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound("Form not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::DeviceProfile;

    fn locked_record() -> TokenRecord {
        let mut record = TokenRecord::new("t1", "Ana");
        record.security_mode = SecurityMode::DeviceLocked;
        record
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let backend = MockTokenBackend::new();
        let err = tokio_test::assert_err!(backend.fetch_token("nope").await);
        assert!(matches!(err, BackendError::NotFound(_)));
        assert_eq!(backend.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_device_lock_binds_first_device() {
        let backend = MockTokenBackend::new().with_token(locked_record());
        let first = DeviceIdentity::generate(DeviceProfile::default());
        let second = DeviceIdentity::generate(DeviceProfile::default());

        let reg = backend.register_device("t1", &first, None).await.unwrap();
        assert!(reg.device_locked);
        assert!(backend.record("t1").unwrap().device_locked);

        let err = backend
            .register_device("t1", &second, None)
            .await
            .unwrap_err();
        assert_eq!(err.detail(), Some("Token is locked to another device"));

        // Same device may register again.
        backend.register_device("t1", &first, None).await.unwrap();
        assert_eq!(backend.locked_device("t1"), Some(first.device_id));
    }

    #[tokio::test]
    async fn test_pin_checked() {
        let mut record = TokenRecord::new("t2", "Ana");
        record.security_mode = SecurityMode::PinProtected;
        let backend = MockTokenBackend::new()
            .with_token(record)
            .with_pin("t2", "4821");
        let device = DeviceIdentity::generate(DeviceProfile::default());

        assert!(backend
            .register_device("t2", &device, Some("0000"))
            .await
            .is_err());
        assert!(backend
            .register_device("t2", &device, Some("4821"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let backend = MockTokenBackend::new().with_token(locked_record());
        backend.fail_with(BackendError::Timeout);
        assert_eq!(backend.fetch_token("t1").await, Err(BackendError::Timeout));
        backend.clear_failure();
        assert!(backend.fetch_token("t1").await.is_ok());
    }
}
