//! # Outbound Ports
//!
//! The chain executor boundary: everything this engine needs from a chain is
//! four calls: code presence, transaction submission, typed introspection
//! and the signer identity. Signing, gas, nonces and retry policy live
//! behind the implementation, never here.
//!
//! Each [`IsmQuery`] and [`TxAction`] maps 1:1 onto a function selector of
//! the deployed contract set; the raw calldata rendering lives in
//! [`crate::adapters::calldata`].

use crate::domain::{IsmResult, ModuleType};
use async_trait::async_trait;
use primitive_types::H256;

/// Typed read against a deployed module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IsmQuery {
    /// `moduleType()` discriminant.
    ModuleType,
    /// `owner()` of an ownable module.
    Owner,
    /// `paused()` flag of a pausable module.
    Paused,
    /// `mailbox()` bound by a fallback routing module.
    Mailbox,
    /// `domains()` enrolled on a routing module.
    Domains,
    /// `module(uint32)` enrolled for one origin domain.
    Module(u32),
    /// `modulesAndThreshold(bytes)` of an aggregation module.
    ModulesAndThreshold,
}

/// Value returned by an [`IsmQuery`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IsmValue {
    /// A `moduleType()` discriminant.
    ModuleType(ModuleType),
    /// A single address.
    Address(H256),
    /// A boolean flag.
    Bool(bool),
    /// Enrolled origin domains.
    Domains(Vec<u32>),
    /// Aggregation sub-modules and threshold.
    ModulesAndThreshold(Vec<H256>, u8),
}

impl IsmValue {
    /// Extract a module type, if that is what was read.
    pub fn as_module_type(&self) -> Option<ModuleType> {
        match self {
            Self::ModuleType(ty) => Some(*ty),
            _ => None,
        }
    }

    /// Extract an address, if that is what was read.
    pub fn as_address(&self) -> Option<H256> {
        match self {
            Self::Address(address) => Some(*address),
            _ => None,
        }
    }

    /// Extract a flag, if that is what was read.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Extract enrolled domains, if that is what was read.
    pub fn as_domains(&self) -> Option<&[u32]> {
        match self {
            Self::Domains(domains) => Some(domains),
            _ => None,
        }
    }

    /// Extract aggregation sub-modules and threshold, if that is what was read.
    pub fn as_modules_and_threshold(&self) -> Option<(&[H256], u8)> {
        match self {
            Self::ModulesAndThreshold(modules, threshold) => Some((modules, *threshold)),
            _ => None,
        }
    }
}

/// Constructor parameters for a fixed-shape module deployment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModuleInit {
    /// Per-origin routing module.
    Routing {
        /// Initial owner.
        owner: H256,
        /// Origin domains, paired index-wise with `modules`.
        domains: Vec<u32>,
        /// Sub-module address per domain.
        modules: Vec<H256>,
    },
    /// Per-origin routing module with mailbox fallback.
    FallbackRouting {
        /// Initial owner.
        owner: H256,
        /// Mailbox whose default module handles unenrolled origins.
        mailbox: H256,
        /// Origin domains, paired index-wise with `modules`.
        domains: Vec<u32>,
        /// Sub-module address per domain.
        modules: Vec<H256>,
    },
    /// Native-bridge provenance module.
    OpStack {
        /// The rollup's native bridge.
        native_bridge: H256,
    },
    /// Always-verifying test module.
    Test,
    /// Ownable pausable gate. The paused flag is runtime state, not a
    /// constructor parameter.
    Pausable {
        /// Initial owner.
        owner: H256,
    },
}

/// One transaction the engine wants included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxAction {
    /// Contract creation for a fixed-shape module.
    Create(ModuleInit),
    /// Content-addressed `deploy(address[],uint8)` on an address-set factory.
    FactoryDeploy {
        /// Factory contract address.
        factory: H256,
        /// Canonically sorted member set.
        values: Vec<H256>,
        /// Verification threshold.
        threshold: u8,
    },
    /// Routing `set(uint32,address)`.
    SetRoute {
        /// Routing module address.
        ism: H256,
        /// Origin domain to bind.
        domain: u32,
        /// Sub-module to bind it to.
        module: H256,
    },
    /// Routing `remove(uint32)`.
    RemoveRoute {
        /// Routing module address.
        ism: H256,
        /// Origin domain to unbind.
        domain: u32,
    },
    /// Ownable `transferOwnership(address)`.
    TransferOwnership {
        /// Target module address.
        ism: H256,
        /// New owner.
        new_owner: H256,
    },
}

/// A transaction intent handed to the executor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIntent {
    /// What the transaction does.
    pub action: TxAction,
    /// Human-readable purpose, for logs.
    pub description: String,
}

impl TxIntent {
    /// Build an intent.
    pub fn new(action: TxAction, description: impl Into<String>) -> Self {
        Self {
            action,
            description: description.into(),
        }
    }

    /// Call target, `None` for contract creations.
    pub fn to(&self) -> Option<H256> {
        match &self.action {
            TxAction::Create(_) => None,
            TxAction::FactoryDeploy { factory, .. } => Some(*factory),
            TxAction::SetRoute { ism, .. }
            | TxAction::RemoveRoute { ism, .. }
            | TxAction::TransferOwnership { ism, .. } => Some(*ism),
        }
    }
}

/// Inclusion receipt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    /// Hash of the included transaction.
    pub tx_hash: H256,
    /// Created contract address, for creations and factory deploys.
    pub contract_address: Option<H256>,
    /// Emitted log names.
    pub logs: Vec<String>,
}

/// Chain executor - outbound port.
///
/// One implementation per chain family. Suspends to inclusion on `submit`;
/// no internal retry, timeout or cancellation.
#[async_trait]
pub trait ChainExecutor: Send + Sync {
    /// Deployed code at an address. Empty means no contract.
    async fn get_code(&self, domain: u32, address: H256) -> IsmResult<Vec<u8>>;

    /// Submit a transaction and await inclusion.
    async fn submit(&self, domain: u32, intent: TxIntent) -> IsmResult<TxReceipt>;

    /// Typed introspection read.
    async fn read(&self, domain: u32, address: H256, query: IsmQuery) -> IsmResult<IsmValue>;

    /// Identity this executor signs with on the given chain.
    async fn signer_address(&self, domain: u32) -> IsmResult<H256>;
}
