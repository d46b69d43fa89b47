//! # Algorithms Module
//!
//! The matching and diffing core: structural equivalence between deployed
//! modules and configs, and the routing change-set calculator. Pure logic
//! over the outbound ports; no transaction submission happens here.

pub mod delta;
pub mod matcher;

pub use delta::routing_module_delta;
pub use matcher::module_matches_config;

use crate::adapters::factory::FactorySuite;
use crate::domain::{DomainRegistry, IsmConfig, IsmError, IsmResult, ModuleType};
use crate::ports::outbound::{ChainExecutor, IsmQuery};
use primitive_types::H256;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Borrowed engine collaborators threaded through the recursive algorithms.
///
/// An explicit value, never ambient state: built per call from the service's
/// injected executor, factory table and registry.
pub struct EngineContext<'a, E> {
    /// Chain executor.
    pub executor: &'a E,
    /// Content-addressed factory suite per destination domain.
    pub factories: &'a HashMap<u32, FactorySuite>,
    /// Chain name resolution.
    pub registry: &'a DomainRegistry,
}

/// Resolve routing config keys to protocol domains.
///
/// Keys that do not resolve are dropped with a warning; partial trees are
/// legal. The result is sorted by domain for deterministic iteration.
pub(crate) fn resolve_domains<'c>(
    registry: &DomainRegistry,
    domains: &'c BTreeMap<String, IsmConfig>,
) -> Vec<(u32, &'c IsmConfig)> {
    let mut resolved = Vec::with_capacity(domains.len());
    for (name, sub) in domains {
        match registry.domain(name) {
            Some(domain) => resolved.push((domain, sub)),
            None => warn!(
                "[ism] dropping routing entry for unknown chain {:?}",
                name
            ),
        }
    }
    resolved.sort_by_key(|(domain, _)| *domain);
    resolved
}

pub(crate) async fn read_module_type<E: ChainExecutor>(
    executor: &E,
    domain: u32,
    address: H256,
) -> IsmResult<ModuleType> {
    executor
        .read(domain, address, IsmQuery::ModuleType)
        .await?
        .as_module_type()
        .ok_or(IsmError::UnexpectedValue {
            query: "moduleType()",
            address,
        })
}

pub(crate) async fn read_owner<E: ChainExecutor>(
    executor: &E,
    domain: u32,
    address: H256,
) -> IsmResult<H256> {
    executor
        .read(domain, address, IsmQuery::Owner)
        .await?
        .as_address()
        .ok_or(IsmError::UnexpectedValue {
            query: "owner()",
            address,
        })
}

pub(crate) async fn read_mailbox<E: ChainExecutor>(
    executor: &E,
    domain: u32,
    address: H256,
) -> IsmResult<H256> {
    executor
        .read(domain, address, IsmQuery::Mailbox)
        .await?
        .as_address()
        .ok_or(IsmError::UnexpectedValue {
            query: "mailbox()",
            address,
        })
}

pub(crate) async fn read_paused<E: ChainExecutor>(
    executor: &E,
    domain: u32,
    address: H256,
) -> IsmResult<bool> {
    executor
        .read(domain, address, IsmQuery::Paused)
        .await?
        .as_bool()
        .ok_or(IsmError::UnexpectedValue {
            query: "paused()",
            address,
        })
}

pub(crate) async fn read_domains<E: ChainExecutor>(
    executor: &E,
    domain: u32,
    address: H256,
) -> IsmResult<Vec<u32>> {
    match executor.read(domain, address, IsmQuery::Domains).await? {
        crate::ports::outbound::IsmValue::Domains(domains) => Ok(domains),
        _ => Err(IsmError::UnexpectedValue {
            query: "domains()",
            address,
        }),
    }
}

pub(crate) async fn read_route<E: ChainExecutor>(
    executor: &E,
    domain: u32,
    address: H256,
    origin: u32,
) -> IsmResult<H256> {
    executor
        .read(domain, address, IsmQuery::Module(origin))
        .await?
        .as_address()
        .ok_or(IsmError::UnexpectedValue {
            query: "module(uint32)",
            address,
        })
}

pub(crate) async fn read_modules_and_threshold<E: ChainExecutor>(
    executor: &E,
    domain: u32,
    address: H256,
) -> IsmResult<(Vec<H256>, u8)> {
    match executor
        .read(domain, address, IsmQuery::ModulesAndThreshold)
        .await?
    {
        crate::ports::outbound::IsmValue::ModulesAndThreshold(modules, threshold) => {
            Ok((modules, threshold))
        }
        _ => Err(IsmError::UnexpectedValue {
            query: "modulesAndThreshold()",
            address,
        }),
    }
}
