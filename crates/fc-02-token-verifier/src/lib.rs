//! # FC-02 Token Verifier
//!
//! Resolves an anonymous collection-link token into an access decision and
//! caches successful device handshakes.
//!
//! **Component ID:** 02  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## State Machine
//!
//! ```text
//!            ┌──────────────── load(token) ────────────────┐
//!            ▼                                             │
//!        Loading ──► Verified                              │
//!            │                                             │
//!            ├─────► NeedsVerification(mode) ──► Verified  │
//!            │            │    ▲                           │
//!            │            │    └─ wrong PIN / network      │
//!            │            ▼                                │
//!            └─────► Error ── Unavailable ─── retry() ─────┘
//!                      └──── Denied (terminal)
//! ```
//!
//! ## Security Modes
//!
//! | Mode | Handshake |
//! |------|-----------|
//! | `standard` | none, zero verification calls |
//! | `device_locked` | first registering device locks the token |
//! | `pin_protected` | 4-digit PIN once per device |
//!
//! A device that completed a handshake is recorded in the
//! [`VerificationCache`] and never prompted again for that token.
//!
//! ## Module Structure
//!
//! ```text
//! fc-02-token-verifier/
//! ├── domain/          # VerificationState, AccessDenied, PIN and token rules
//! ├── ports/           # TokenVerifierApi (in), TokenBackend (out) + mock
//! ├── adapters/        # DeviceRegistry, VerificationCache (key-value backed)
//! ├── application/     # TokenVerifier service
//! └── config.rs        # VerifierConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{DeviceRegistry, VerificationCache};
pub use application::TokenVerifier;
pub use config::VerifierConfig;
pub use domain::{
    AccessDenied, AccessFailure, PendingVerification, VerificationError, VerificationState,
    VerifiedAccess, VerifiedVia, VerifierError,
};
pub use ports::{DeviceRegistration, MockTokenBackend, TokenBackend, TokenVerifierApi};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
