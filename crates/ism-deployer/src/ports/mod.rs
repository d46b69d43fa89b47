//! # Ports Module
//!
//! Hexagonal architecture ports (inbound API, outbound chain executor).

pub mod inbound;
pub mod outbound;

pub use inbound::{DeployRequest, IsmModuleApi};
pub use outbound::{ChainExecutor, IsmQuery, IsmValue, ModuleInit, TxAction, TxIntent, TxReceipt};
