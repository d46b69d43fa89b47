//! # ISM Deployer Test Suite
//!
//! Unified test crate for the deployment engine.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs       # Shared engine + in-memory chain fixture
//!     ├── properties.rs    # Idempotence, canonicalization, matcher totality
//!     └── reconcile.rs     # Delta correctness, convergence, authority policy
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ism-tests
//!
//! # By category
//! cargo test -p ism-tests integration::properties::
//! cargo test -p ism-tests integration::reconcile::
//! ```

#![allow(dead_code)]

pub mod integration;
