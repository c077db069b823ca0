//! # Inbound Ports
//!
//! API trait defining what the Token Verifier can do.

use async_trait::async_trait;
use shared_types::FormDefinition;

use crate::domain::{VerificationState, VerifierError};

/// Token Verifier API - inbound port.
#[async_trait]
pub trait TokenVerifierApi: Send + Sync {
    /// Resolve a token into an access decision. Starts a new generation;
    /// any earlier in-flight load is discarded.
    async fn load(&self, token: &str) -> Result<VerificationState, VerifierError>;

    /// Register this device against a `device_locked` token.
    async fn register_device(&self) -> Result<VerificationState, VerifierError>;

    /// Complete a `pin_protected` handshake.
    async fn submit_pin(&self, pin: &str) -> Result<VerificationState, VerifierError>;

    /// Reload the last token after a retryable failure.
    async fn retry(&self) -> Result<VerificationState, VerifierError>;

    /// Open one assigned form, falling back to the Local Cache offline.
    async fn open_form(&self, form_id: &str) -> Result<FormDefinition, VerifierError>;

    /// Current state.
    fn state(&self) -> VerificationState;

    /// Invalidate every in-flight operation.
    fn teardown(&self);
}
