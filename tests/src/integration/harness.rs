//! # Test Harness
//!
//! Shared fixture: one engine wired to an in-memory chain with a local
//! destination chain, four origin chains and a registered factory suite.

use ism_deployer::{
    DomainRegistry, FactorySuite, InMemoryChainExecutor, IsmConfig, IsmDeployerService,
    MultisigKind, RoutingKind,
};
use primitive_types::H256;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Destination chain name.
pub const LOCAL: &str = "testchain";
/// Destination protocol domain.
pub const LOCAL_DOMAIN: u32 = 1000;

/// Origin chains enrolled in routing tests.
pub const ALPHA: &str = "alpha";
pub const ALPHA_DOMAIN: u32 = 1;
pub const BETA: &str = "beta";
pub const BETA_DOMAIN: u32 = 2;
pub const GAMMA: &str = "gamma";
pub const GAMMA_DOMAIN: u32 = 3;
pub const DELTA: &str = "delta";
pub const DELTA_DOMAIN: u32 = 4;

/// Default signing identity of the in-memory executor.
pub fn signer() -> H256 {
    H256::repeat_byte(0xee)
}

/// Deterministic test address.
pub fn addr(byte: u8) -> H256 {
    H256::repeat_byte(byte)
}

/// The factory suite registered on the local chain.
pub fn suite() -> FactorySuite {
    FactorySuite {
        merkle_root_multisig: addr(0xf1),
        message_id_multisig: addr(0xf2),
        aggregation: addr(0xf3),
    }
}

/// Engine plus its in-memory chain.
pub struct Harness {
    pub executor: Arc<InMemoryChainExecutor>,
    pub service: IsmDeployerService<InMemoryChainExecutor>,
}

/// Build a fresh harness.
pub fn harness() -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let executor = Arc::new(InMemoryChainExecutor::new());
    executor.register_suite(LOCAL_DOMAIN, &suite());

    let registry = DomainRegistry::from_pairs([
        (LOCAL, LOCAL_DOMAIN),
        (ALPHA, ALPHA_DOMAIN),
        (BETA, BETA_DOMAIN),
        (GAMMA, GAMMA_DOMAIN),
        (DELTA, DELTA_DOMAIN),
    ]);
    let factories = [(LOCAL_DOMAIN, suite())].into_iter().collect();
    let service = IsmDeployerService::new(executor.clone(), registry, factories);

    Harness { executor, service }
}

/// A message-id multisig config over repeated-byte validator addresses.
pub fn multisig(validators: &[u8], threshold: u8) -> IsmConfig {
    IsmConfig::Multisig {
        kind: MultisigKind::MessageId,
        validators: validators.iter().map(|b| addr(*b)).collect(),
        threshold,
    }
}

/// A plain routing config from `(chain name, sub-config)` pairs.
pub fn routing(owner: H256, entries: &[(&str, IsmConfig)]) -> IsmConfig {
    IsmConfig::Routing {
        kind: RoutingKind::Domain,
        owner,
        domains: to_domains(entries),
    }
}

/// A fallback routing config from `(chain name, sub-config)` pairs.
pub fn fallback_routing(owner: H256, entries: &[(&str, IsmConfig)]) -> IsmConfig {
    IsmConfig::Routing {
        kind: RoutingKind::Fallback,
        owner,
        domains: to_domains(entries),
    }
}

fn to_domains(entries: &[(&str, IsmConfig)]) -> BTreeMap<String, IsmConfig> {
    entries
        .iter()
        .map(|(name, config)| (name.to_string(), config.clone()))
        .collect()
}
