//! # FC-05 Submission Router
//!
//! Turns a validated final page into a submission and decides where it
//! goes.
//!
//! **Component ID:** 05  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Routing
//!
//! ```text
//! final page valid?
//!     │ yes
//!     ▼
//!  online? ──yes──► POST submission ──ok──► SubmittedNow
//!     │ no                │ any failure
//!     ▼                   ▼
//!  Local Cache queue ◄────┘ ─────────────► Queued
//!     │
//!     ▼
//!  clear autosave + reset session, emit outcome
//! ```
//!
//! Submission loss is never acceptable: a backend failure is downgraded to
//! queueing, and only a failed queue write is reported as an error (the
//! session is then left intact).
//!
//! ## Module Structure
//!
//! ```text
//! fc-05-submission-router/
//! ├── domain/          # SubmissionOutcome, SubmissionReceipt, errors
//! ├── ports/           # SubmissionApi (in), SubmissionBackend, LocationProvider (out)
//! ├── application/     # SubmissionRouter
//! └── config.rs        # SubmissionConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::SubmissionRouter;
pub use config::SubmissionConfig;
pub use domain::{CompletionNotice, SubmissionOutcome, SubmissionReceipt, SubmitError};
pub use ports::{
    FixedLocation, LocationProvider, MockSubmissionBackend, SubmissionApi, SubmissionBackend,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
