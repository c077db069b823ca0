//! # Domain Module
//!
//! Core domain types for the Session Paginator.

pub mod errors;
pub mod pages;
pub mod rules;

pub use errors::*;
pub use pages::*;
pub use rules::*;
