//! # Domain Module
//!
//! Core domain types for the Connectivity Monitor.

pub mod errors;
pub mod signal;
pub mod value_objects;

pub use errors::*;
pub use signal::*;
pub use value_objects::*;
