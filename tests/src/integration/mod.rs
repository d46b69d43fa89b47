//! # Integration Tests
//!
//! Cross-component properties of the deployment engine, exercised against
//! the in-memory chain executor.

pub mod harness;
pub mod properties;
