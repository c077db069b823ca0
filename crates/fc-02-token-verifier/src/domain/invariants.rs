//! # Domain Invariants
//!
//! Rules checked locally before and after backend round-trips.

use chrono::{DateTime, Utc};
use shared_types::TokenRecord;

use super::errors::AccessDenied;

/// Enumerator label used when access was granted from cached forms.
pub const OFFLINE_ENUMERATOR: &str = "Offline Mode";

/// Shown when offline with nothing cached.
pub const OFFLINE_NO_CACHE_MESSAGE: &str =
    "Cannot verify token offline. Please connect to the internet.";

/// Shown when the backend is unreachable while online.
pub const VERIFY_FAILED_MESSAGE: &str = "Failed to verify token. Please try again.";

/// Invariant: a usable token is neither expired nor out of quota.
///
/// The backend enforces the same rules; this catches a stale snapshot.
pub fn check_token_usable(record: &TokenRecord, now: DateTime<Utc>) -> Result<(), AccessDenied> {
    if record.is_expired(now) {
        return Err(AccessDenied::Expired);
    }
    if record.submission_limit_reached() {
        return Err(AccessDenied::SubmissionLimitReached);
    }
    Ok(())
}

/// Invariant: a PIN is exactly `length` ASCII digits.
pub fn is_valid_pin(pin: &str, length: usize) -> bool {
    pin.len() == length && pin.bytes().all(|b| b.is_ascii_digit())
}

/// True if a refusal message concerns the PIN.
pub fn is_pin_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("pin") || lower.contains("code")
}

/// True if a refusal message concerns the device lock.
pub fn is_lock_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("locked") || lower.contains("another device") || lower.contains("other device")
}
