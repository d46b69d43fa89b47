//! # Domain Module
//!
//! Core domain types for ISM deployment: the recursive config model, the
//! routing change-set, chain name resolution, errors and invariants.

pub mod config;
pub mod delta;
pub mod errors;
pub mod invariants;
pub mod registry;

pub use config::{IsmConfig, ModuleKind, ModuleType, MultisigKind, RoutingKind};
pub use delta::RoutingDelta;
pub use errors::{IsmError, IsmResult};
pub use invariants::{canonical_address_set, invariant_nonempty, invariant_threshold_bounds};
pub use registry::DomainRegistry;
