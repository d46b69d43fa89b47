//! # Adapters Layer (Hexagonal Architecture)
//!
//! Wire encoding, the content-addressed factory adapter, and the in-memory
//! chain executor.

pub mod calldata;
pub mod factory;
pub mod memory_chain;

pub use factory::FactorySuite;
pub use memory_chain::{DeployedModule, InMemoryChainExecutor};
