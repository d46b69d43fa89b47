//! # In-Memory Chain Executor
//!
//! A chain executor over in-memory module state. In production the port is
//! implemented by an RPC-backed executor rendering [`calldata`]; this adapter
//! interprets the same typed intents directly and enforces the same contract
//! rules (code presence, ownership gates, factory determinism), which makes
//! it faithful enough to exercise every engine path in tests and local
//! simulation.
//!
//! [`calldata`]: crate::adapters::calldata

use crate::adapters::calldata;
use crate::adapters::factory::{self, FactorySuite};
use crate::domain::{IsmError, IsmResult, ModuleType};
use crate::ports::outbound::{
    ChainExecutor, IsmQuery, IsmValue, ModuleInit, TxAction, TxIntent, TxReceipt,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use primitive_types::H256;
use sha3::{Digest, Keccak256};
use std::collections::{BTreeMap, HashMap};

/// State of one deployed module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedModule {
    /// `moduleType()` discriminant.
    pub module_type: ModuleType,
    /// Owner, for ownable modules.
    pub owner: Option<H256>,
    /// Bound mailbox, for fallback routing.
    pub mailbox: Option<H256>,
    /// Paused flag, for pausable modules.
    pub paused: Option<bool>,
    /// Member set, for factory-deployed set modules.
    pub values: Vec<H256>,
    /// Threshold, for factory-deployed set modules.
    pub threshold: u8,
    /// Enrolled routes, for routing modules.
    pub routes: BTreeMap<u32, H256>,
    /// Native bridge, for provenance modules.
    pub native_bridge: Option<H256>,
}

impl DeployedModule {
    fn bare(module_type: ModuleType) -> Self {
        Self {
            module_type,
            owner: None,
            mailbox: None,
            paused: None,
            values: Vec::new(),
            threshold: 0,
            routes: BTreeMap::new(),
            native_bridge: None,
        }
    }

    /// A routing module with enrolled routes.
    pub fn routing(owner: H256, routes: BTreeMap<u32, H256>) -> Self {
        Self {
            owner: Some(owner),
            routes,
            ..Self::bare(ModuleType::Routing)
        }
    }

    /// A fallback routing module bound to a mailbox.
    pub fn fallback_routing(owner: H256, mailbox: H256, routes: BTreeMap<u32, H256>) -> Self {
        Self {
            owner: Some(owner),
            mailbox: Some(mailbox),
            routes,
            ..Self::bare(ModuleType::Routing)
        }
    }

    /// A factory-deployed set module (multisig or aggregation).
    pub fn set_module(module_type: ModuleType, values: Vec<H256>, threshold: u8) -> Self {
        Self {
            values,
            threshold,
            ..Self::bare(module_type)
        }
    }

    /// An ownable pausable gate in the given paused state.
    pub fn pausable(owner: H256, paused: bool) -> Self {
        Self {
            owner: Some(owner),
            paused: Some(paused),
            ..Self::bare(ModuleType::Null)
        }
    }

    /// A no-op null module (test or provenance leaf).
    pub fn null_module() -> Self {
        Self::bare(ModuleType::Null)
    }
}

#[derive(Default)]
struct ChainState {
    modules: HashMap<u32, HashMap<H256, DeployedModule>>,
    factories: HashMap<(u32, H256), ModuleType>,
    submitted: Vec<(u32, TxIntent)>,
    wire: Vec<Vec<u8>>,
    read_count: usize,
    nonce: u64,
    signer: H256,
}

/// In-memory chain executor.
pub struct InMemoryChainExecutor {
    state: RwLock<ChainState>,
}

impl Default for InMemoryChainExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryChainExecutor {
    /// Create an empty chain with a default signer.
    pub fn new() -> Self {
        let state = ChainState {
            signer: H256::repeat_byte(0xee),
            ..Default::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Register the three content-addressed factories for one domain.
    pub fn register_suite(&self, domain: u32, suite: &FactorySuite) {
        let mut state = self.state.write();
        state.factories.insert(
            (domain, suite.merkle_root_multisig),
            ModuleType::MerkleRootMultisig,
        );
        state.factories.insert(
            (domain, suite.message_id_multisig),
            ModuleType::MessageIdMultisig,
        );
        state
            .factories
            .insert((domain, suite.aggregation), ModuleType::Aggregation);
    }

    /// Change the signing identity.
    pub fn set_signer(&self, signer: H256) {
        self.state.write().signer = signer;
    }

    /// Pre-populate a deployed module, for reconciliation tests.
    pub fn seed_module(&self, domain: u32, address: H256, module: DeployedModule) {
        self.state
            .write()
            .modules
            .entry(domain)
            .or_default()
            .insert(address, module);
    }

    /// Snapshot of one deployed module.
    pub fn module(&self, domain: u32, address: H256) -> Option<DeployedModule> {
        self.state
            .read()
            .modules
            .get(&domain)
            .and_then(|chain| chain.get(&address))
            .cloned()
    }

    /// Every transaction submitted so far, in order.
    pub fn submitted(&self) -> Vec<(u32, TxIntent)> {
        self.state.read().submitted.clone()
    }

    /// The calldata rendered for each submitted transaction, in order. This
    /// is the exact byte stream an RPC-backed executor would put on the wire.
    pub fn submitted_calldata(&self) -> Vec<Vec<u8>> {
        self.state.read().wire.clone()
    }

    /// Number of introspection reads served so far.
    pub fn read_count(&self) -> usize {
        self.state.read().read_count
    }

    /// Reset transaction and read counters, keeping chain state.
    pub fn clear_activity(&self) {
        let mut state = self.state.write();
        state.submitted.clear();
        state.wire.clear();
        state.read_count = 0;
    }

    fn next_address(state: &mut ChainState, domain: u32) -> H256 {
        state.nonce += 1;
        let mut hasher = Keccak256::new();
        hasher.update(b"create");
        hasher.update(domain.to_be_bytes());
        hasher.update(state.nonce.to_be_bytes());
        H256::from_slice(&hasher.finalize())
    }

    fn tx_hash(state: &ChainState) -> H256 {
        let mut hasher = Keccak256::new();
        hasher.update(b"tx");
        hasher.update(state.nonce.to_be_bytes());
        hasher.update((state.submitted.len() as u64).to_be_bytes());
        H256::from_slice(&hasher.finalize())
    }

    fn revert(domain: u32, reason: &str) -> IsmError {
        IsmError::ChainWrite {
            domain,
            reason: format!("revert: {reason}"),
        }
    }
}

#[async_trait]
impl ChainExecutor for InMemoryChainExecutor {
    async fn get_code(&self, domain: u32, address: H256) -> IsmResult<Vec<u8>> {
        let state = self.state.read();
        let present = state
            .modules
            .get(&domain)
            .is_some_and(|chain| chain.contains_key(&address));
        // One marker byte stands in for runtime bytecode.
        Ok(if present { vec![0xfe] } else { Vec::new() })
    }

    async fn submit(&self, domain: u32, intent: TxIntent) -> IsmResult<TxReceipt> {
        let mut state = self.state.write();
        state.wire.push(calldata::action_calldata(&intent.action));
        state.submitted.push((domain, intent.clone()));
        let signer = state.signer;

        let (contract_address, logs) = match intent.action {
            TxAction::Create(init) => {
                let address = Self::next_address(&mut state, domain);
                let module = match init {
                    ModuleInit::Routing {
                        owner,
                        domains,
                        modules,
                    } => DeployedModule::routing(
                        owner,
                        domains.into_iter().zip(modules).collect(),
                    ),
                    ModuleInit::FallbackRouting {
                        owner,
                        mailbox,
                        domains,
                        modules,
                    } => DeployedModule::fallback_routing(
                        owner,
                        mailbox,
                        domains.into_iter().zip(modules).collect(),
                    ),
                    ModuleInit::OpStack { native_bridge } => DeployedModule {
                        native_bridge: Some(native_bridge),
                        ..DeployedModule::null_module()
                    },
                    ModuleInit::Test => DeployedModule::null_module(),
                    ModuleInit::Pausable { owner } => DeployedModule::pausable(owner, false),
                };
                state
                    .modules
                    .entry(domain)
                    .or_default()
                    .insert(address, module);
                (Some(address), vec!["ModuleDeployed".to_string()])
            }
            TxAction::FactoryDeploy {
                factory,
                values,
                threshold,
            } => {
                let module_type = *state
                    .factories
                    .get(&(domain, factory))
                    .ok_or_else(|| Self::revert(domain, "unknown factory"))?;
                let derived = factory::get_address(factory, &values, threshold);
                state.modules.entry(domain).or_default().insert(
                    derived,
                    DeployedModule::set_module(module_type, values, threshold),
                );
                (Some(derived), vec!["ModuleDeployed".to_string()])
            }
            TxAction::SetRoute {
                ism,
                domain: origin,
                module,
            } => {
                let target = state
                    .modules
                    .get_mut(&domain)
                    .and_then(|chain| chain.get_mut(&ism))
                    .ok_or_else(|| Self::revert(domain, "no code at target"))?;
                if target.module_type != ModuleType::Routing {
                    return Err(Self::revert(domain, "not a routing module"));
                }
                if target.owner != Some(signer) {
                    return Err(Self::revert(domain, "caller is not the owner"));
                }
                target.routes.insert(origin, module);
                (None, vec!["RouteSet".to_string()])
            }
            TxAction::RemoveRoute {
                ism,
                domain: origin,
            } => {
                let target = state
                    .modules
                    .get_mut(&domain)
                    .and_then(|chain| chain.get_mut(&ism))
                    .ok_or_else(|| Self::revert(domain, "no code at target"))?;
                if target.owner != Some(signer) {
                    return Err(Self::revert(domain, "caller is not the owner"));
                }
                if target.routes.remove(&origin).is_none() {
                    return Err(Self::revert(domain, "route not enrolled"));
                }
                (None, vec!["RouteRemoved".to_string()])
            }
            TxAction::TransferOwnership { ism, new_owner } => {
                let target = state
                    .modules
                    .get_mut(&domain)
                    .and_then(|chain| chain.get_mut(&ism))
                    .ok_or_else(|| Self::revert(domain, "no code at target"))?;
                if target.owner != Some(signer) {
                    return Err(Self::revert(domain, "caller is not the owner"));
                }
                target.owner = Some(new_owner);
                (None, vec!["OwnershipTransferred".to_string()])
            }
        };

        Ok(TxReceipt {
            tx_hash: Self::tx_hash(&state),
            contract_address,
            logs,
        })
    }

    async fn read(&self, domain: u32, address: H256, query: IsmQuery) -> IsmResult<IsmValue> {
        let mut state = self.state.write();
        state.read_count += 1;

        let read_err = |reason: &str| IsmError::ChainRead {
            domain,
            address,
            reason: reason.to_string(),
        };
        let module = state
            .modules
            .get(&domain)
            .and_then(|chain| chain.get(&address))
            .ok_or_else(|| read_err("no code at address"))?;

        match query {
            IsmQuery::ModuleType => Ok(IsmValue::ModuleType(module.module_type)),
            IsmQuery::Owner => module
                .owner
                .map(IsmValue::Address)
                .ok_or_else(|| read_err("owner() reverted")),
            IsmQuery::Paused => module
                .paused
                .map(IsmValue::Bool)
                .ok_or_else(|| read_err("paused() reverted")),
            IsmQuery::Mailbox => module
                .mailbox
                .map(IsmValue::Address)
                .ok_or_else(|| read_err("mailbox() reverted")),
            IsmQuery::Domains => {
                if module.module_type != ModuleType::Routing {
                    return Err(read_err("domains() reverted"));
                }
                Ok(IsmValue::Domains(module.routes.keys().copied().collect()))
            }
            IsmQuery::Module(origin) => {
                if module.module_type != ModuleType::Routing {
                    return Err(read_err("module(uint32) reverted"));
                }
                module
                    .routes
                    .get(&origin)
                    .copied()
                    .map(IsmValue::Address)
                    .ok_or_else(|| read_err("module(uint32) reverted: not enrolled"))
            }
            IsmQuery::ModulesAndThreshold => {
                if module.module_type != ModuleType::Aggregation {
                    return Err(read_err("modulesAndThreshold() reverted"));
                }
                Ok(IsmValue::ModulesAndThreshold(
                    module.values.clone(),
                    module.threshold,
                ))
            }
        }
    }

    async fn signer_address(&self, _domain: u32) -> IsmResult<H256> {
        Ok(self.state.read().signer)
    }
}
