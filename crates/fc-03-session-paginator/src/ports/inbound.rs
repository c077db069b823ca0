//! # Inbound Ports

use serde_json::Value;

use crate::domain::{PaginatorError, ValidationErrors};

/// Navigation through a paginated session - inbound port.
pub trait SessionNavigation {
    /// Record an answer and clear that field's error.
    fn set_response(&mut self, field_id: &str, value: Value) -> Result<(), PaginatorError>;

    /// Validate the fields of the current page only.
    fn validate_current_page(&mut self) -> Result<(), ValidationErrors>;

    /// Advance one page. Blocked, without moving, while the current page
    /// is invalid. Stays put on the last page.
    fn go_next(&mut self) -> Result<usize, PaginatorError>;

    /// Go back one page. Never validates.
    fn go_previous(&mut self) -> usize;

    /// Index of the current page.
    fn current_page_index(&self) -> usize;

    /// True on the last page.
    fn is_last_page(&self) -> bool;
}
