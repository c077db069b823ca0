//! # Application Module

pub mod paginator;

pub use paginator::SessionPaginator;
