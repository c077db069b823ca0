//! # Autosave Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Autosave configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Timer period, in seconds.
    pub interval_secs: u64,
    /// Timeout for each session-store call, in seconds.
    pub request_timeout_secs: u64,
    /// Post snapshots to the session store while online.
    pub remote_enabled: bool,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            request_timeout_secs: 10,
            remote_enabled: true,
        }
    }
}

impl AutosaveConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            interval_secs: 30,
            request_timeout_secs: 1,
            remote_enabled: true,
        }
    }

    /// Timer period.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// Request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
