//! # ISM Deployer Service
//!
//! The engine's application service: recursive post-order deployment of a
//! config tree, and authority-gated reconciliation of existing routing
//! modules. Implements the inbound [`IsmModuleApi`] port over an injected
//! [`ChainExecutor`].

use crate::adapters::factory::{self, FactorySuite};
use crate::algorithms::{
    self, read_owner, resolve_domains, routing_module_delta, EngineContext,
};
use crate::domain::{
    DomainRegistry, IsmConfig, IsmError, IsmResult, ModuleKind, MultisigKind, RoutingDelta,
    RoutingKind,
};
use crate::ports::inbound::{DeployRequest, IsmModuleApi};
use crate::ports::outbound::{ChainExecutor, ModuleInit, TxAction, TxIntent};
use async_trait::async_trait;
use futures::future::BoxFuture;
use primitive_types::H256;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Per-call deployment cache key: `(destination, origin, constructor params)`.
///
/// Lets an identical leaf reused by multiple tree positions deploy once,
/// while same-kind leaves with different parameters stay distinct. Scoped to
/// one top-level call and threaded through the recursion; never global state.
type CacheKey = (u32, Option<u32>, ModuleInit);
type DeployCache = HashMap<CacheKey, H256>;

/// ISM deployment and reconciliation engine.
pub struct IsmDeployerService<E> {
    executor: Arc<E>,
    registry: DomainRegistry,
    factories: HashMap<u32, FactorySuite>,
}

impl<E: ChainExecutor> IsmDeployerService<E> {
    /// Build an engine over an executor, a chain registry and the
    /// content-addressed factory table.
    pub fn new(
        executor: Arc<E>,
        registry: DomainRegistry,
        factories: HashMap<u32, FactorySuite>,
    ) -> Self {
        Self {
            executor,
            registry,
            factories,
        }
    }

    fn context(&self) -> EngineContext<'_, E> {
        EngineContext {
            executor: self.executor.as_ref(),
            factories: &self.factories,
            registry: &self.registry,
        }
    }

    fn suite(&self, domain: u32) -> IsmResult<&FactorySuite> {
        self.factories
            .get(&domain)
            .ok_or(IsmError::MissingFactory {
                domain,
                family: "address-set",
            })
    }

    fn resolve_chain(&self, name: &str) -> IsmResult<u32> {
        self.registry
            .domain(name)
            .ok_or_else(|| IsmError::UnknownChain {
                name: name.to_string(),
            })
    }

    /// Recursive post-order deployment of one config subtree.
    ///
    /// `existing` is only honored by the routing arm and is cleared before
    /// recursing into children: sub-modules are always freshly resolved.
    fn deploy_config<'a>(
        &'a self,
        destination: u32,
        config: &'a IsmConfig,
        origin: Option<u32>,
        existing: Option<H256>,
        mailbox: Option<H256>,
        cache: &'a mut DeployCache,
    ) -> BoxFuture<'a, IsmResult<H256>> {
        Box::pin(async move {
            match config {
                IsmConfig::Address { address } => Ok(*address),

                IsmConfig::Multisig {
                    kind,
                    validators,
                    threshold,
                } => {
                    // Content-addressed, so deploy_if_absent is already
                    // idempotent; no cache entry needed.
                    let suite = self.suite(destination)?;
                    let factory_address = match kind {
                        MultisigKind::MerkleRoot => suite.merkle_root_multisig,
                        MultisigKind::MessageId => suite.message_id_multisig,
                    };
                    factory::deploy_if_absent(
                        self.executor.as_ref(),
                        destination,
                        factory_address,
                        validators,
                        *threshold,
                    )
                    .await
                }

                IsmConfig::Aggregation { modules, threshold } => {
                    // Children first, in config order; identity is derived
                    // from the sorted address set afterwards.
                    let mut children = Vec::with_capacity(modules.len());
                    for module in modules {
                        let child = self
                            .deploy_config(destination, module, origin, None, mailbox, &mut *cache)
                            .await?;
                        children.push(child);
                    }
                    let suite = self.suite(destination)?;
                    factory::deploy_if_absent(
                        self.executor.as_ref(),
                        destination,
                        suite.aggregation,
                        &children,
                        *threshold,
                    )
                    .await
                }

                IsmConfig::Routing {
                    kind,
                    owner,
                    domains,
                } => {
                    let resolved = resolve_domains(&self.registry, domains);
                    match existing {
                        Some(existing) => {
                            self.reconcile_routing(
                                destination,
                                existing,
                                config,
                                *kind,
                                *owner,
                                &resolved,
                                mailbox,
                                cache,
                            )
                            .await
                        }
                        None => {
                            self.deploy_routing_fresh(
                                destination,
                                *kind,
                                *owner,
                                &resolved,
                                mailbox,
                                cache,
                            )
                            .await
                        }
                    }
                }

                IsmConfig::OpStack { native_bridge } => {
                    self.deploy_leaf(
                        destination,
                        origin,
                        config.kind(),
                        ModuleInit::OpStack {
                            native_bridge: *native_bridge,
                        },
                        cache,
                    )
                    .await
                }

                IsmConfig::Test => {
                    self.deploy_leaf(destination, origin, config.kind(), ModuleInit::Test, cache)
                        .await
                }

                IsmConfig::Pausable { owner, .. } => {
                    // The paused flag is runtime state; deployment only sets
                    // the owner.
                    self.deploy_leaf(
                        destination,
                        origin,
                        config.kind(),
                        ModuleInit::Pausable { owner: *owner },
                        cache,
                    )
                    .await
                }
            }
        })
    }

    /// Deploy a fixed-shape leaf, consulting the per-call cache first.
    async fn deploy_leaf(
        &self,
        destination: u32,
        origin: Option<u32>,
        kind: ModuleKind,
        init: ModuleInit,
        cache: &mut DeployCache,
    ) -> IsmResult<H256> {
        let key = (destination, origin, init.clone());
        if let Some(cached) = cache.get(&key) {
            debug!("[ism] cache hit for {:?} on domain {}", kind, destination);
            return Ok(*cached);
        }

        info!("[ism] deploying {:?} module on domain {}", kind, destination);
        let intent = TxIntent::new(
            TxAction::Create(init),
            format!("deploy {kind:?} module on domain {destination}"),
        );
        let receipt = self.executor.submit(destination, intent).await?;
        let address = receipt.contract_address.ok_or(IsmError::ChainWrite {
            domain: destination,
            reason: "deployment returned no contract address".to_string(),
        })?;
        cache.insert(key, address);
        Ok(address)
    }

    /// Deploy the sub-module for every resolved routing domain.
    ///
    /// Each sub-module is cached under its origin domain, so a leaf shared
    /// across origins still deploys per origin, matching the cache scoping.
    async fn deploy_submodules(
        &self,
        destination: u32,
        resolved: &[(u32, &IsmConfig)],
        mailbox: Option<H256>,
        cache: &mut DeployCache,
    ) -> IsmResult<(Vec<u32>, Vec<H256>)> {
        let mut origins = Vec::with_capacity(resolved.len());
        let mut modules = Vec::with_capacity(resolved.len());
        for (origin, sub_config) in resolved {
            let address = self
                .deploy_config(destination, sub_config, Some(*origin), None, mailbox, &mut *cache)
                .await?;
            origins.push(*origin);
            modules.push(address);
        }
        Ok((origins, modules))
    }

    /// Construct a fresh routing module from scratch.
    async fn deploy_routing_fresh(
        &self,
        destination: u32,
        kind: RoutingKind,
        owner: H256,
        resolved: &[(u32, &IsmConfig)],
        mailbox: Option<H256>,
        cache: &mut DeployCache,
    ) -> IsmResult<H256> {
        let (origins, modules) = self
            .deploy_submodules(destination, resolved, mailbox, cache)
            .await?;

        let init = match kind {
            RoutingKind::Domain => ModuleInit::Routing {
                owner,
                domains: origins,
                modules,
            },
            RoutingKind::Fallback => ModuleInit::FallbackRouting {
                owner,
                mailbox: mailbox.ok_or(IsmError::MissingMailbox)?,
                domains: origins,
                modules,
            },
        };

        info!(
            "[ism] deploying {:?} routing module with {} domains on domain {}",
            kind,
            resolved.len(),
            destination
        );
        let intent = TxIntent::new(
            TxAction::Create(init),
            format!("deploy routing module on domain {destination}"),
        );
        let receipt = self.executor.submit(destination, intent).await?;
        receipt.contract_address.ok_or(IsmError::ChainWrite {
            domain: destination,
            reason: "deployment returned no contract address".to_string(),
        })
    }

    /// Reconcile an existing routing module toward its config.
    ///
    /// Without owner authority, or with a mailbox change, in-place mutation
    /// is impossible: silently fall through to a full redeploy, as expected
    /// policy rather than an error. Otherwise apply the delta in place; ownership
    /// transfer goes last so enrollments land under the current owner.
    #[allow(clippy::too_many_arguments)]
    async fn reconcile_routing(
        &self,
        destination: u32,
        existing: H256,
        config: &IsmConfig,
        kind: RoutingKind,
        owner: H256,
        resolved: &[(u32, &IsmConfig)],
        mailbox: Option<H256>,
        cache: &mut DeployCache,
    ) -> IsmResult<H256> {
        let ctx = self.context();
        let delta = routing_module_delta(&ctx, destination, existing, config, mailbox).await?;

        let signer = self.executor.signer_address(destination).await?;
        let live_owner = read_owner(self.executor.as_ref(), destination, existing).await?;
        if signer != live_owner || delta.mailbox.is_some() {
            info!(
                "[ism] cannot update routing module {:?} in place (owner {:?}, signer {:?}, \
                 mailbox change: {}); redeploying",
                existing,
                live_owner,
                signer,
                delta.mailbox.is_some()
            );
            return self
                .deploy_routing_fresh(destination, kind, owner, resolved, mailbox, cache)
                .await;
        }

        if delta.is_empty() {
            debug!("[ism] routing module {:?} already in sync", existing);
            return Ok(existing);
        }

        for origin in &delta.domains_to_enroll {
            let Some((_, sub_config)) = resolved.iter().find(|(domain, _)| domain == origin)
            else {
                continue;
            };
            let module = self
                .deploy_config(destination, sub_config, Some(*origin), None, mailbox, &mut *cache)
                .await?;
            info!(
                "[ism] enrolling origin {} -> {:?} on routing module {:?}",
                origin, module, existing
            );
            let intent = TxIntent::new(
                TxAction::SetRoute {
                    ism: existing,
                    domain: *origin,
                    module,
                },
                format!("enroll origin {origin}"),
            );
            self.executor.submit(destination, intent).await?;
        }

        for origin in &delta.domains_to_unenroll {
            info!(
                "[ism] unenrolling origin {} from routing module {:?}",
                origin, existing
            );
            let intent = TxIntent::new(
                TxAction::RemoveRoute {
                    ism: existing,
                    domain: *origin,
                },
                format!("unenroll origin {origin}"),
            );
            self.executor.submit(destination, intent).await?;
        }

        if let Some(new_owner) = delta.owner {
            info!(
                "[ism] transferring ownership of {:?} to {:?}",
                existing, new_owner
            );
            let intent = TxIntent::new(
                TxAction::TransferOwnership {
                    ism: existing,
                    new_owner,
                },
                "transfer routing module ownership".to_string(),
            );
            self.executor.submit(destination, intent).await?;
        }

        Ok(existing)
    }
}

#[async_trait]
impl<E: ChainExecutor> IsmModuleApi for IsmDeployerService<E> {
    async fn deploy(&self, request: DeployRequest) -> IsmResult<H256> {
        request.config.validate()?;
        let destination = self.resolve_chain(&request.destination_chain)?;
        let origin = match &request.origin_chain {
            Some(name) => Some(self.resolve_chain(name)?),
            None => None,
        };

        info!(
            "[ism] deploying {:?} tree on {}",
            request.config.kind(),
            request.destination_chain
        );
        let mut cache = DeployCache::new();
        self.deploy_config(
            destination,
            &request.config,
            origin,
            request.existing_module,
            request.mailbox,
            &mut cache,
        )
        .await
    }

    async fn module_matches_config(
        &self,
        chain: &str,
        address: H256,
        config: &IsmConfig,
        mailbox: Option<H256>,
    ) -> bool {
        let Some(domain) = self.registry.domain(chain) else {
            return false;
        };
        let ctx = self.context();
        algorithms::module_matches_config(&ctx, domain, address, config, mailbox).await
    }

    async fn routing_module_delta(
        &self,
        chain: &str,
        address: H256,
        config: &IsmConfig,
        mailbox: Option<H256>,
    ) -> IsmResult<RoutingDelta> {
        let domain = self.resolve_chain(chain)?;
        let ctx = self.context();
        algorithms::routing_module_delta(&ctx, domain, address, config, mailbox).await
    }
}
