//! # Submission Configuration

use serde::{Deserialize, Serialize};
use shared_types::DEFAULT_SUBMISSION_SOURCE;
use std::time::Duration;

/// Submission router configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Timeout for the immediate delivery attempt, in seconds.
    pub request_timeout_secs: u64,
    /// How long to wait for a location fix, in seconds.
    pub location_timeout_secs: u64,
    /// `source` recorded on every submission.
    pub source: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 20,
            location_timeout_secs: 10,
            source: DEFAULT_SUBMISSION_SOURCE.to_string(),
        }
    }
}

impl SubmissionConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            request_timeout_secs: 1,
            location_timeout_secs: 1,
            ..Self::default()
        }
    }

    /// Delivery timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Location timeout.
    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SubmissionConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert_eq!(config.source, "token_collection");
    }
}
