//! # ISM Deployer
//!
//! Deployment and reconciliation engine for on-chain Interchain Security
//! Module (ISM) trees. An ISM tree is the verification policy deciding
//! whether a cross-chain message claiming to originate from chain X is
//! authentic; this engine keeps deployed trees synchronized with a desired
//! declarative configuration without blindly redeploying on every change.
//!
//! ## How it converges
//!
//! - Immutable modules (multisigs, aggregations) are content-addressed:
//!   their address is a pure function of the canonical member set and
//!   threshold, so deployment is an idempotent presence-check-then-deploy.
//! - The matcher is a conservative, never-failing structural equivalence
//!   test between a deployed address and a config subtree; any read failure
//!   biases to "no match" and a redeploy rather than accepting a wrong
//!   policy.
//! - Routing, the one mutable node kind, is reconciled by a minimal
//!   change-set. If the caller lacks owner authority or the mailbox binding
//!   changed, it falls back to a full redeploy instead.
//!
//! ## Module Structure
//!
//! ```text
//! ism-deployer/
//! ├── domain/          # IsmConfig tree, RoutingDelta, registry, errors
//! ├── algorithms/      # structural matcher, routing delta calculator
//! ├── ports/           # IsmModuleApi (inbound), ChainExecutor (outbound)
//! ├── adapters/        # calldata encoding, factory adapter, in-memory chain
//! └── service.rs       # recursive deployer + reconciler
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{DeployedModule, FactorySuite, InMemoryChainExecutor};
pub use algorithms::{module_matches_config, routing_module_delta, EngineContext};
pub use domain::{
    DomainRegistry, IsmConfig, IsmError, IsmResult, ModuleKind, ModuleType, MultisigKind,
    RoutingDelta, RoutingKind,
};
pub use ports::{
    ChainExecutor, DeployRequest, IsmModuleApi, IsmQuery, IsmValue, ModuleInit, TxAction,
    TxIntent, TxReceipt,
};
pub use service::IsmDeployerService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
