//! # Verifier Configuration

use serde::{Deserialize, Serialize};

/// Token verifier configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Timeout for each backend call, in seconds.
    pub request_timeout_secs: u64,
    /// Number of digits in a PIN.
    pub pin_length: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            pin_length: 4,
        }
    }
}

impl VerifierConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            request_timeout_secs: 1,
            ..Self::default()
        }
    }
}
