//! # Connectivity Configuration

use serde::{Deserialize, Serialize};

/// Connectivity monitor configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// Upper bound for one Sync Agent pass, in seconds.
    pub sync_timeout_secs: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            sync_timeout_secs: 60,
        }
    }
}

impl ConnectivityConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            sync_timeout_secs: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(ConnectivityConfig::default().sync_timeout_secs, 60);
        assert_eq!(ConnectivityConfig::for_testing().sync_timeout_secs, 2);
    }
}
