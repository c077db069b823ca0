//! # Domain Module

pub mod errors;
pub mod outcome;

pub use errors::*;
pub use outcome::*;
