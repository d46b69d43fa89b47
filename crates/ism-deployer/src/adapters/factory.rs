//! # Address-Set Factory Adapter
//!
//! Content-addressed deployment of immutable set modules (multisigs and
//! aggregations). The factory derives the module address purely from the
//! canonical member set and threshold, so "is it already deployed" is a
//! code-presence check and repeated deployment is a no-op.

use crate::adapters::calldata::{encode_tokens, AbiToken};
use crate::domain::{canonical_address_set, IsmError, IsmResult};
use crate::ports::outbound::{ChainExecutor, TxAction, TxIntent};
use primitive_types::H256;
use sha3::{Digest, Keccak256};
use tracing::{debug, info};

/// The three per-chain factory addresses for content-addressed families.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FactorySuite {
    /// Factory for merkle-root multisig modules.
    pub merkle_root_multisig: H256,
    /// Factory for message-id multisig modules.
    pub message_id_multisig: H256,
    /// Factory for aggregation modules.
    pub aggregation: H256,
}

/// Pure content-addressed derivation: `keccak(0xff ++ factory ++ salt)` with
/// `salt = keccak(abi(sorted values, threshold))`.
///
/// Identical inputs always yield the identical address, independent of
/// deployment history. Values are canonicalized here, so callers may pass
/// any ordering.
pub fn get_address(factory: H256, values: &[H256], threshold: u8) -> H256 {
    let canonical = canonical_address_set(values);
    let salt = Keccak256::digest(encode_tokens(&[
        AbiToken::AddressArray(canonical),
        AbiToken::Uint(u64::from(threshold)),
    ]));

    let mut hasher = Keccak256::new();
    hasher.update([0xff]);
    hasher.update(factory.as_bytes());
    hasher.update(salt);
    H256::from_slice(&hasher.finalize())
}

/// Idempotent content-addressed deployment.
///
/// Derives the address, checks for code, and submits exactly one factory
/// transaction when absent. Deployment failures propagate untouched.
pub async fn deploy_if_absent<E: ChainExecutor>(
    executor: &E,
    domain: u32,
    factory: H256,
    values: &[H256],
    threshold: u8,
) -> IsmResult<H256> {
    let canonical = canonical_address_set(values);
    let derived = get_address(factory, &canonical, threshold);

    let code = executor.get_code(domain, derived).await?;
    if !code.is_empty() {
        debug!(
            "[ism] set module already deployed at {:?} on domain {}",
            derived, domain
        );
        return Ok(derived);
    }

    info!(
        "[ism] deploying {}-of-{} set module via factory {:?} on domain {}",
        threshold,
        canonical.len(),
        factory,
        domain
    );
    let intent = TxIntent::new(
        TxAction::FactoryDeploy {
            factory,
            values: canonical,
            threshold,
        },
        format!("deploy {threshold}-of-n set module on domain {domain}"),
    );
    let receipt = executor.submit(domain, intent).await?;
    let actual = receipt.contract_address.ok_or(IsmError::ChainWrite {
        domain,
        reason: "factory deployment returned no contract address".to_string(),
    })?;
    if actual != derived {
        return Err(IsmError::AddressMismatch {
            expected: derived,
            actual,
        });
    }
    Ok(derived)
}
