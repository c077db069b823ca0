//! # Integration Tests

pub mod flows;
pub mod scenarios;
