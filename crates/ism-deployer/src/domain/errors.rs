//! # Domain Errors
//!
//! Error taxonomy for the ISM deployment engine.
//!
//! Three families: validation errors raised before any on-chain call, read
//! errors raised by introspection, and write errors propagated untouched from
//! reverted or unconfirmed transactions. The matcher swallows read errors
//! into `false`; the deployer and delta calculator propagate them.

use super::config::ModuleKind;
use primitive_types::H256;
use thiserror::Error;

/// ISM engine error types.
#[derive(Debug, Error)]
pub enum IsmError {
    /// Threshold outside `1 <= threshold <= population`.
    #[error("invalid threshold {threshold} for population {population}")]
    InvalidThreshold {
        /// Configured threshold.
        threshold: u8,
        /// Validator or sub-module count.
        population: usize,
    },

    /// Empty validator or sub-module set.
    #[error("empty module set for {kind:?} config")]
    EmptyModuleSet {
        /// Config node kind.
        kind: ModuleKind,
    },

    /// Destination or origin chain name missing from the domain registry.
    /// Routing domain keys are instead dropped with a warning.
    #[error("unknown chain: {name}")]
    UnknownChain {
        /// Unresolvable chain name.
        name: String,
    },

    /// Fallback routing constructed without a mailbox address.
    #[error("fallback routing requires a mailbox address")]
    MissingMailbox,

    /// No address-set factory registered for the destination domain.
    #[error("no {family} factory registered for domain {domain}")]
    MissingFactory {
        /// Destination protocol domain.
        domain: u32,
        /// Factory family name.
        family: &'static str,
    },

    /// On-chain introspection failed (no code, wrong type, revert).
    #[error("chain read failed on domain {domain} at {address:?}: {reason}")]
    ChainRead {
        /// Protocol domain the read targeted.
        domain: u32,
        /// Contract address the read targeted.
        address: H256,
        /// Underlying failure.
        reason: String,
    },

    /// Transaction reverted or was never confirmed. Propagated untouched;
    /// retry policy belongs to the caller.
    #[error("chain write failed on domain {domain}: {reason}")]
    ChainWrite {
        /// Protocol domain the transaction targeted.
        domain: u32,
        /// Underlying failure.
        reason: String,
    },

    /// Factory deployment receipt does not carry the derived address.
    #[error("factory deployed to {actual:?}, expected {expected:?}")]
    AddressMismatch {
        /// Content-addressed derivation.
        expected: H256,
        /// Address the receipt reported.
        actual: H256,
    },

    /// Introspection returned a value shape the caller cannot use.
    #[error("unexpected value for {query} read at {address:?}")]
    UnexpectedValue {
        /// Query that produced the value.
        query: &'static str,
        /// Contract address that was read.
        address: H256,
    },

    /// Routing delta requested for a non-routing config.
    #[error("routing delta requested for a non-routing config")]
    NotRouting,
}

/// Result type for ISM engine operations.
pub type IsmResult<T> = Result<T, IsmError>;
