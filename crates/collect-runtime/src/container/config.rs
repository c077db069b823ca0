//! # Runtime Configuration
//!
//! Component configs plus the runtime's own settings, read from `FC_*`
//! environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `FC_BACKEND_URL` | `http://localhost:8001` |
//! | `FC_DATA_DIR` | `./.fieldforce` |
//! | `FC_LOG_LEVEL` / `RUST_LOG` | `info` |
//! | `FC_JSON_LOGS` | `false` |
//! | `FC_REQUEST_TIMEOUT_SECS` | per component |
//! | `FC_AUTOSAVE_INTERVAL_SECS` | `30` |
//! | `FC_START_OFFLINE` | `false` |

use fc_01_connectivity::ConnectivityConfig;
use fc_02_token_verifier::VerifierConfig;
use fc_03_session_paginator::PaginatorConfig;
use fc_04_autosave::AutosaveConfig;
use fc_05_submission_router::SubmissionConfig;
use std::path::PathBuf;
use tracing::warn;

/// File holding the key-value store inside the data directory.
pub const STORE_FILE_NAME: &str = "store.json";

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Backend base URL.
    pub backend_url: String,
    /// Directory for durable local state.
    pub data_dir: PathBuf,
    /// Log filter directive.
    pub log_level: String,
    /// Emit JSON log lines.
    pub json_logs: bool,
    /// Treat the device as offline from the start.
    pub start_offline: bool,
    /// Token Verifier.
    pub verifier: VerifierConfig,
    /// Session Paginator.
    pub paginator: PaginatorConfig,
    /// Autosave Persistor.
    pub autosave: AutosaveConfig,
    /// Submission Router.
    pub submission: SubmissionConfig,
    /// Connectivity Monitor.
    pub connectivity: ConnectivityConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8001".to_string(),
            data_dir: PathBuf::from("./.fieldforce"),
            log_level: "info".to_string(),
            json_logs: false,
            start_offline: false,
            verifier: VerifierConfig::default(),
            paginator: PaginatorConfig::default(),
            autosave: AutosaveConfig::default(),
            submission: SubmissionConfig::default(),
            connectivity: ConnectivityConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("FC_BACKEND_URL") {
            config.backend_url = url;
        }
        if let Some(dir) = lookup("FC_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup("FC_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.log_level = level;
        }
        if let Some(flag) = lookup("FC_JSON_LOGS") {
            config.json_logs = parse_flag(&flag);
        }
        if let Some(flag) = lookup("FC_START_OFFLINE") {
            config.start_offline = parse_flag(&flag);
        }
        if let Some(secs) = parse_secs(&lookup, "FC_REQUEST_TIMEOUT_SECS") {
            config.verifier.request_timeout_secs = secs;
            config.autosave.request_timeout_secs = secs;
            config.submission.request_timeout_secs = secs;
        }
        if let Some(secs) = parse_secs(&lookup, "FC_AUTOSAVE_INTERVAL_SECS") {
            config.autosave.interval_secs = secs;
        }

        config
    }

    /// Path of the key-value store file.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Some(secs),
        _ => {
            warn!(key, value = %raw, "Ignoring invalid duration");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config.backend_url, "http://localhost:8001");
        assert_eq!(config.store_path(), PathBuf::from("./.fieldforce/store.json"));
        assert_eq!(config.autosave.interval_secs, 30);
        assert!(!config.start_offline);
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("FC_BACKEND_URL", "https://collect.example.org"),
            ("FC_DATA_DIR", "/var/lib/fieldforce"),
            ("RUST_LOG", "debug"),
            ("FC_JSON_LOGS", "true"),
            ("FC_START_OFFLINE", "1"),
            ("FC_REQUEST_TIMEOUT_SECS", "5"),
            ("FC_AUTOSAVE_INTERVAL_SECS", "10"),
        ]));
        assert_eq!(config.backend_url, "https://collect.example.org");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/fieldforce"));
        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
        assert!(config.start_offline);
        assert_eq!(config.verifier.request_timeout_secs, 5);
        assert_eq!(config.submission.request_timeout_secs, 5);
        assert_eq!(config.autosave.interval_secs, 10);
    }

    #[test]
    fn test_invalid_numbers_are_ignored() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("FC_REQUEST_TIMEOUT_SECS", "soon"),
            ("FC_AUTOSAVE_INTERVAL_SECS", "0"),
        ]));
        assert_eq!(config.verifier.request_timeout_secs, 15);
        assert_eq!(config.autosave.interval_secs, 30);
    }
}
