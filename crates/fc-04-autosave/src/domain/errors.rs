//! # Domain Errors

use shared_store::StoreError;
use thiserror::Error;

/// Autosave errors. Remote failures never appear here; they are logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AutosaveError {
    /// Local snapshot could not be read or written.
    #[error("Local snapshot failed: {0}")]
    Storage(#[from] StoreError),

    /// A newer session or teardown invalidated this operation.
    #[error("Operation superseded by a newer session")]
    Superseded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_conversion() {
        let err: AutosaveError = StoreError::Io("disk full".into()).into();
        assert!(err.to_string().contains("disk full"));
    }
}
