//! # Paginator Configuration

use serde::{Deserialize, Serialize};

/// Session paginator configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginatorConfig {
    /// Title of the first page when the form has no name.
    pub default_title: String,
    /// Seed for question shuffling. `None` shuffles differently per load.
    pub shuffle_seed: Option<u64>,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            default_title: "Survey".to_string(),
            shuffle_seed: None,
        }
    }
}

impl PaginatorConfig {
    /// Create a config for testing (deterministic shuffle).
    pub fn for_testing() -> Self {
        Self {
            shuffle_seed: Some(7),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PaginatorConfig::default();
        assert_eq!(config.default_title, "Survey");
        assert!(config.shuffle_seed.is_none());
        assert!(PaginatorConfig::for_testing().shuffle_seed.is_some());
    }
}
