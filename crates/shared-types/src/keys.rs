//! Storage key naming shared by every component that touches the
//! process-wide key-value store.

/// Persisted device identity.
pub const DEVICE_IDENTITY_KEY: &str = "fieldforce_device_identity";

/// Map of token id to the device id that passed verification.
pub const VERIFIED_DEVICES_KEY: &str = "fieldforce_verified_devices";

/// Last collection token opened on this device.
pub const COLLECTION_TOKEN_KEY: &str = "collection_token";

/// Local snapshot of an in-progress session.
pub fn session_snapshot_key(form_id: &str, token: Option<&str>) -> String {
    format!("cawi_{}_{}", form_id, token.unwrap_or("anon"))
}

/// Completion-screen settings recorded after a submission.
pub fn completion_settings_key(form_id: &str) -> String {
    format!("cawi_settings_{}", form_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_key() {
        assert_eq!(session_snapshot_key("f1", Some("tok")), "cawi_f1_tok");
        assert_eq!(session_snapshot_key("f1", None), "cawi_f1_anon");
    }
}
