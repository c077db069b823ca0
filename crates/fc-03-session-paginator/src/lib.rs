//! # FC-03 Session Paginator
//!
//! Splits a form's field list into ordered pages, holds the in-progress
//! responses, and validates the current page before letting the user move
//! forward.
//!
//! **Component ID:** 03  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Pagination
//!
//! ```text
//! [q1, q2, ─break─, q3, q4*, q5]       * = "start new page" flag
//!   │              │        │
//!   ▼              ▼        ▼
//! Page 1        Page 2    Page 3
//! [q1, q2]      [q3]      [q4, q5]
//! ```
//!
//! Markers are consumed; flagged fields open the new page and stay on it.
//! Markers never produce empty pages.
//!
//! ## Navigation
//!
//! Forward motion is gated by validation of the current page only;
//! backward motion is always allowed and never validates.
//!
//! ## Module Structure
//!
//! ```text
//! fc-03-session-paginator/
//! ├── domain/          # Page, paginate, shuffle, field rules, errors
//! ├── ports/           # SessionNavigation (inbound)
//! ├── application/     # SessionPaginator
//! └── config.rs        # PaginatorConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::SessionPaginator;
pub use config::PaginatorConfig;
pub use domain::{
    is_empty_value, paginate, shuffle_fields, FieldRules, Page, PaginatorError, ValidationErrors,
};
pub use ports::SessionNavigation;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
