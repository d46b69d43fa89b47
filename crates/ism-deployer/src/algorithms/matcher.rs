//! # Module Matcher
//!
//! Structural equivalence between a deployed module and a desired config
//! subtree. Doubles as the post-deploy assertion and as the emptiness test
//! behind the routing delta.
//!
//! Total by construction: a well-formed config never produces an error
//! against any address. Every on-chain read failure (no code, wrong contract
//! type, revert) collapses to `false`, biasing toward an unnecessary
//! redeploy over silently accepting a wrong verification policy.

use super::{
    read_mailbox, read_module_type, read_modules_and_threshold, read_owner, read_paused,
    routing_module_delta, EngineContext,
};
use crate::adapters::factory;
use crate::domain::{IsmConfig, ModuleType, MultisigKind, RoutingKind};
use crate::ports::outbound::ChainExecutor;
use futures::future::BoxFuture;
use primitive_types::H256;
use tracing::debug;

/// Does the module at `address` implement `config`?
///
/// The zero address never matches an object-shaped config and short-circuits
/// before any read.
pub fn module_matches_config<'a, E: ChainExecutor>(
    ctx: &'a EngineContext<'a, E>,
    domain: u32,
    address: H256,
    config: &'a IsmConfig,
    mailbox: Option<H256>,
) -> BoxFuture<'a, bool> {
    Box::pin(async move {
        if address.is_zero() {
            return false;
        }

        match config {
            IsmConfig::Address { address: expected } => address == *expected,

            IsmConfig::Test => true,

            // Multisig modules are immutable and content-addressed: identity
            // is recomputed from the config, not introspected.
            IsmConfig::Multisig {
                kind,
                validators,
                threshold,
            } => {
                let Some(suite) = ctx.factories.get(&domain) else {
                    return false;
                };
                let factory_address = match kind {
                    MultisigKind::MerkleRoot => suite.merkle_root_multisig,
                    MultisigKind::MessageId => suite.message_id_multisig,
                };
                factory::get_address(factory_address, validators, *threshold) == address
            }

            IsmConfig::OpStack { .. } => matches!(
                read_module_type(ctx.executor, domain, address).await,
                Ok(ModuleType::Null)
            ),

            IsmConfig::Pausable { owner, paused } => {
                let Ok(live_owner) = read_owner(ctx.executor, domain, address).await else {
                    return false;
                };
                if live_owner != *owner {
                    return false;
                }
                // Asymmetric: a desired paused module must be live-paused,
                // but a desired unpaused module is accepted either way.
                if *paused {
                    matches!(read_paused(ctx.executor, domain, address).await, Ok(true))
                } else {
                    true
                }
            }

            IsmConfig::Aggregation { modules, threshold } => {
                aggregation_matches(ctx, domain, address, modules, *threshold, mailbox).await
            }

            IsmConfig::Routing { kind, owner, .. } => {
                let Ok(live_type) = read_module_type(ctx.executor, domain, address).await else {
                    return false;
                };
                if live_type != ModuleType::Routing {
                    return false;
                }
                let Ok(live_owner) = read_owner(ctx.executor, domain, address).await else {
                    return false;
                };
                if live_owner != *owner {
                    return false;
                }
                if *kind == RoutingKind::Fallback {
                    if let Some(expected) = mailbox {
                        let Ok(live_mailbox) = read_mailbox(ctx.executor, domain, address).await
                        else {
                            return false;
                        };
                        if live_mailbox != expected {
                            return false;
                        }
                    }
                }
                match routing_module_delta(ctx, domain, address, config, mailbox).await {
                    Ok(delta) => delta.is_empty(),
                    Err(err) => {
                        debug!("[ism] routing delta failed during match: {err}");
                        false
                    }
                }
            }
        }
    })
}

/// Greedy bijection between live aggregation sub-modules and config entries.
///
/// Each live sub-module consumes the first still-unconsumed config entry it
/// structurally matches. A sub-module with zero matches, or any leftover
/// entry, fails the whole match. Order-independent, but deliberately not a
/// maximum-matching solver: ambiguous duplicate entries can bias toward
/// "no match" and a redeploy.
async fn aggregation_matches<'a, E: ChainExecutor>(
    ctx: &'a EngineContext<'a, E>,
    domain: u32,
    address: H256,
    modules: &'a [IsmConfig],
    threshold: u8,
    mailbox: Option<H256>,
) -> bool {
    let Ok((live_modules, live_threshold)) =
        read_modules_and_threshold(ctx.executor, domain, address).await
    else {
        return false;
    };
    if live_threshold != threshold || live_modules.len() != modules.len() {
        return false;
    }

    let mut consumed = vec![false; modules.len()];
    for live in live_modules {
        let mut found = false;
        for (index, candidate) in modules.iter().enumerate() {
            if consumed[index] {
                continue;
            }
            if module_matches_config(ctx, domain, live, candidate, mailbox).await {
                consumed[index] = true;
                found = true;
                break;
            }
        }
        if !found {
            return false;
        }
    }
    // Population equality plus a complete pass means every entry is consumed.
    true
}
