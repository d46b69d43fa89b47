//! # Domain Invariants
//!
//! Business rules shared by validation, deployment and matching.

use super::config::ModuleKind;
use super::errors::{IsmError, IsmResult};
use primitive_types::H256;

/// Invariant: thresholds satisfy `1 <= threshold <= population`.
pub fn invariant_threshold_bounds(threshold: u8, population: usize) -> IsmResult<()> {
    if threshold == 0 || threshold as usize > population {
        return Err(IsmError::InvalidThreshold {
            threshold,
            population,
        });
    }
    Ok(())
}

/// Invariant: validator and sub-module sets are non-empty.
pub fn invariant_nonempty(population: usize, kind: ModuleKind) -> IsmResult<()> {
    if population == 0 {
        return Err(IsmError::EmptyModuleSet { kind });
    }
    Ok(())
}

/// Canonical ordering for a set used in content-addressed derivation.
///
/// Sorted and deduplicated: source ordering is irrelevant to identity, so
/// `[A, B, C]` and `[C, B, A]` derive the identical address.
pub fn canonical_address_set(values: &[H256]) -> Vec<H256> {
    let mut sorted = values.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
}
