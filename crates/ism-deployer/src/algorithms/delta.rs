//! # Routing Delta Calculator
//!
//! Computes the minimal change-set between a live routing module and its
//! desired config. Mismatched domains are always redeployed-and-rebound,
//! never patched inside the enrolled sub-module: a mismatch is treated
//! identically to a missing enrollment.
//!
//! Unlike the matcher, read failures propagate here: the deployer cannot
//! safely plan transactions without the reads.

use super::{
    module_matches_config, read_domains, read_mailbox, read_owner, read_route, resolve_domains,
    EngineContext,
};
use crate::domain::{IsmConfig, IsmError, IsmResult, RoutingDelta, RoutingKind};
use crate::ports::outbound::ChainExecutor;
use primitive_types::H256;
use std::collections::HashSet;
use tracing::debug;

/// Diff the live routing module at `address` against `config`.
pub async fn routing_module_delta<'a, E: ChainExecutor>(
    ctx: &'a EngineContext<'a, E>,
    domain: u32,
    address: H256,
    config: &'a IsmConfig,
    mailbox: Option<H256>,
) -> IsmResult<RoutingDelta> {
    let IsmConfig::Routing {
        kind,
        owner,
        domains,
    } = config
    else {
        return Err(IsmError::NotRouting);
    };

    let mut delta = RoutingDelta::default();

    let live_owner = read_owner(ctx.executor, domain, address).await?;
    if live_owner != *owner {
        delta.owner = Some(*owner);
    }

    if *kind == RoutingKind::Fallback {
        if let Some(expected) = mailbox {
            let live_mailbox = read_mailbox(ctx.executor, domain, address).await?;
            if live_mailbox != expected {
                delta.mailbox = Some(expected);
            }
        }
    }

    let desired = resolve_domains(ctx.registry, domains);
    let desired_set: HashSet<u32> = desired.iter().map(|(origin, _)| *origin).collect();

    let live_domains = read_domains(ctx.executor, domain, address).await?;
    let live_set: HashSet<u32> = live_domains.iter().copied().collect();

    for live in &live_domains {
        if !desired_set.contains(live) {
            delta.domains_to_unenroll.push(*live);
        }
    }

    for (origin, sub_config) in &desired {
        if !live_set.contains(origin) {
            delta.domains_to_enroll.push(*origin);
            continue;
        }
        let enrolled = read_route(ctx.executor, domain, address, *origin).await?;
        if !module_matches_config(ctx, domain, enrolled, sub_config, mailbox).await {
            debug!(
                "[ism] enrolled module {:?} for origin {} no longer matches config",
                enrolled, origin
            );
            delta.domains_to_enroll.push(*origin);
        }
    }

    delta.domains_to_enroll.sort_unstable();
    delta.domains_to_unenroll.sort_unstable();
    Ok(delta)
}
