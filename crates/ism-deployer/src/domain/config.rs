//! # ISM Configuration Model
//!
//! The recursive tagged union describing a desired ISM tree, plus the
//! on-chain `moduleType()` discriminant of the deployed contract set.
//!
//! A config subtree is declarative: it says what verification policy should
//! exist, not how to get there. The deployer walks it post-order, the matcher
//! compares it structurally against live modules.

use super::errors::IsmResult;
use super::invariants::{invariant_nonempty, invariant_threshold_bounds};
use primitive_types::H256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// On-chain `moduleType()` discriminant.
///
/// Numbering is fixed by the deployed contract set and must not be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModuleType {
    /// Reserved zero value.
    Unused = 0,
    /// Routes verification to a sub-module per origin domain.
    Routing = 1,
    /// Requires a threshold of sub-modules to approve.
    Aggregation = 2,
    /// Pre-merkle-proof multisig (not deployed by this engine).
    LegacyMultisig = 3,
    /// Multisig over merkle root checkpoints.
    MerkleRootMultisig = 4,
    /// Multisig over message-id checkpoints.
    MessageIdMultisig = 5,
    /// No-op verification (test, pausable and provenance-gated modules).
    Null = 6,
    /// Off-chain lookup verification (not deployed by this engine).
    CcipRead = 7,
}

impl ModuleType {
    /// Decode an on-chain discriminant. Unknown values map to `None`.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unused),
            1 => Some(Self::Routing),
            2 => Some(Self::Aggregation),
            3 => Some(Self::LegacyMultisig),
            4 => Some(Self::MerkleRootMultisig),
            5 => Some(Self::MessageIdMultisig),
            6 => Some(Self::Null),
            7 => Some(Self::CcipRead),
            _ => None,
        }
    }
}

/// Checkpoint flavour a multisig module signs over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MultisigKind {
    /// Validators sign merkle root checkpoints.
    MerkleRoot,
    /// Validators sign message-id checkpoints.
    MessageId,
}

impl MultisigKind {
    /// The `moduleType()` a deployed module of this kind reports.
    pub fn module_type(&self) -> ModuleType {
        match self {
            Self::MerkleRoot => ModuleType::MerkleRootMultisig,
            Self::MessageId => ModuleType::MessageIdMultisig,
        }
    }
}

/// Routing module flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoutingKind {
    /// Plain per-origin routing.
    Domain,
    /// Per-origin routing that falls back to the mailbox default module for
    /// unenrolled origins. Binds a mailbox address at construction.
    Fallback,
}

/// Flat discriminant over config node kinds.
///
/// Used for the per-call deployment cache key and for log/error context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// Opaque pre-deployed reference.
    Address,
    /// Multisig over merkle root checkpoints.
    MerkleRootMultisig,
    /// Multisig over message-id checkpoints.
    MessageIdMultisig,
    /// Per-origin routing.
    Routing,
    /// Per-origin routing with mailbox fallback.
    FallbackRouting,
    /// Threshold aggregation of sub-modules.
    Aggregation,
    /// Native-bridge provenance verification.
    OpStack,
    /// Always-verifying test module.
    Test,
    /// Ownable, pausable gate.
    Pausable,
}

/// Desired configuration of one ISM tree node.
///
/// Recursive: `Routing` and `Aggregation` hold child configs. Routing domain
/// keys are chain names, resolved against a [`DomainRegistry`] at deploy and
/// match time; keys that do not resolve are dropped with a warning.
///
/// [`DomainRegistry`]: super::registry::DomainRegistry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IsmConfig {
    /// An already-deployed module, referenced by address only.
    Address {
        /// Deployed module address.
        address: H256,
    },
    /// N-of-M named validators must have signed.
    Multisig {
        /// Checkpoint flavour.
        kind: MultisigKind,
        /// Validator addresses. Treated as a set; source order is irrelevant.
        validators: Vec<H256>,
        /// Required signature count, `1 <= threshold <= validators.len()`.
        threshold: u8,
    },
    /// Delegate verification to a different sub-module per origin chain.
    Routing {
        /// Routing flavour.
        kind: RoutingKind,
        /// Module owner, the only identity allowed to mutate enrollments.
        owner: H256,
        /// Desired sub-module per origin chain name.
        #[serde(default)]
        domains: BTreeMap<String, IsmConfig>,
    },
    /// Require a threshold of independent sub-modules to approve.
    Aggregation {
        /// Sub-module configs. List order is tracked only by the matcher's
        /// bijection, not for deployment identity.
        modules: Vec<IsmConfig>,
        /// Required approval count, `1 <= threshold <= modules.len()`.
        threshold: u8,
    },
    /// Verify by native-bridge provenance only. No sub-tree.
    #[serde(rename_all = "camelCase")]
    OpStack {
        /// The rollup's native bridge address.
        native_bridge: H256,
    },
    /// Always-verifying leaf. Non-production.
    Test,
    /// Ownable gate that can pause all verification.
    Pausable {
        /// Module owner.
        owner: H256,
        /// Desired paused state. Not part of deployment; a mutable runtime
        /// flag outside this engine's write path.
        paused: bool,
    },
}

impl IsmConfig {
    /// Flat kind discriminant for this node.
    pub fn kind(&self) -> ModuleKind {
        match self {
            Self::Address { .. } => ModuleKind::Address,
            Self::Multisig { kind, .. } => match kind {
                MultisigKind::MerkleRoot => ModuleKind::MerkleRootMultisig,
                MultisigKind::MessageId => ModuleKind::MessageIdMultisig,
            },
            Self::Routing { kind, .. } => match kind {
                RoutingKind::Domain => ModuleKind::Routing,
                RoutingKind::Fallback => ModuleKind::FallbackRouting,
            },
            Self::Aggregation { .. } => ModuleKind::Aggregation,
            Self::OpStack { .. } => ModuleKind::OpStack,
            Self::Test => ModuleKind::Test,
            Self::Pausable { .. } => ModuleKind::Pausable,
        }
    }

    /// Validate the whole subtree before any on-chain call.
    ///
    /// Checks non-empty populations and `1 <= threshold <= population` for
    /// every multisig and aggregation node, recursively.
    pub fn validate(&self) -> IsmResult<()> {
        match self {
            Self::Multisig {
                validators,
                threshold,
                ..
            } => {
                invariant_nonempty(validators.len(), self.kind())?;
                invariant_threshold_bounds(*threshold, validators.len())
            }
            Self::Aggregation { modules, threshold } => {
                invariant_nonempty(modules.len(), self.kind())?;
                invariant_threshold_bounds(*threshold, modules.len())?;
                for module in modules {
                    module.validate()?;
                }
                Ok(())
            }
            Self::Routing { domains, .. } => {
                for sub in domains.values() {
                    sub.validate()?;
                }
                Ok(())
            }
            Self::Address { .. } | Self::OpStack { .. } | Self::Test | Self::Pausable { .. } => {
                Ok(())
            }
        }
    }
}
