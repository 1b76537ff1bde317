//! Criteria resolution for wildcard items.
//!
//! ## Criteria Trees
//!
//! A criteria-based item stores the root of a Merkle tree over the
//! identifiers it accepts. Leaves are `H(identifier)`; interior nodes hash
//! the two children in sorted order, so a proof is just the list of sibling
//! hashes from leaf to root:
//!
//! ```text
//!              root = H(min(a,b) || max(a,b))
//!             /                        \
//!     a = H(min(l0,l1)||max(..))     b = H(l2)   (odd node carried up)
//!        /        \
//!   l0 = H(id0)  l1 = H(id1)
//! ```
//!
//! A zero root is a wildcard: any identifier is accepted with an empty proof.
//!
//! ## Resolution
//!
//! Resolving rewrites the referenced item in the caller's working copy of the
//! order: the identifier replaces the root and the item type drops its
//! criteria flag. Every criteria item of every participating order must be
//! resolved exactly once.
//!
//! ## Example
//!
//! ```
//! use dark_settlement::criteria::{merkle_proof, merkle_root, verify_proof};
//! use dark_settlement::types::identifier;
//!
//! let ids: Vec<_> = (1..=5).map(identifier).collect();
//! let root = merkle_root(&ids);
//! let proof = merkle_proof(&ids, 3).unwrap();
//! assert!(verify_proof(&ids[3], &root, &proof));
//! assert!(!verify_proof(&identifier(9), &root, &proof));
//! ```

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::SettlementError;
use crate::types::{sha256, AdvancedOrder, CriteriaResolver, Hash, ItemSide, Word, ZERO_WORD};

// ============================================================================
// Merkle helpers
// ============================================================================

fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(low);
    hasher.update(high);
    hasher.finalize().into()
}

/// Check that `identifier` is a member of the set committed to by `root`.
///
/// A zero root accepts any identifier, but only with an empty proof.
pub fn verify_proof(identifier: &Word, root: &Word, proof: &[Word]) -> bool {
    if *root == ZERO_WORD {
        return proof.is_empty();
    }
    let computed = proof
        .iter()
        .fold(sha256(identifier), |node, sibling| hash_pair(&node, sibling));
    computed == *root
}

fn next_level(level: &[Hash]) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [single] => *single,
            _ => unreachable!("chunks(2) yields one or two nodes"),
        })
        .collect()
}

/// Root of the criteria tree over `identifiers`.
///
/// Returns the zero word (wildcard) for an empty set.
pub fn merkle_root(identifiers: &[Word]) -> Word {
    if identifiers.is_empty() {
        return ZERO_WORD;
    }
    let mut level: Vec<Hash> = identifiers.iter().map(|id| sha256(id)).collect();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

/// Inclusion proof for `identifiers[index]`, or `None` if out of range.
pub fn merkle_proof(identifiers: &[Word], mut index: usize) -> Option<Vec<Word>> {
    if index >= identifiers.len() {
        return None;
    }
    let mut level: Vec<Hash> = identifiers.iter().map(|id| sha256(id)).collect();
    let mut proof = Vec::new();
    while level.len() > 1 {
        let sibling = index ^ 1;
        if sibling < level.len() {
            proof.push(level[sibling]);
        }
        level = next_level(&level);
        index /= 2;
    }
    Some(proof)
}

// ============================================================================
// Resolution
// ============================================================================

/// Apply criteria resolvers to working copies of the orders.
///
/// Orders with a zero numerator are skipped for this call: resolvers that
/// target them are ignored and they are exempt from the unresolved check.
///
/// # Errors
///
/// - `OrderIndexOutOfRange` / `ItemIndexOutOfRange` for bad pointers
/// - `CriteriaNotEnabledForItem` if the item is not (or no longer) criteria-based
/// - `ProofTooLong` if a proof exceeds `max_proof_length`
/// - `CriteriaNotMet` if the proof does not reach the item's root
/// - `UnresolvedCriteria` if a participating order keeps a criteria item
pub fn apply_criteria_resolvers(
    orders: &mut [AdvancedOrder],
    resolvers: &[CriteriaResolver],
    max_proof_length: usize,
) -> Result<(), SettlementError> {
    let total = orders.len();
    for resolver in resolvers {
        let order_index = resolver.order_index;
        let order = orders
            .get_mut(order_index)
            .ok_or(SettlementError::OrderIndexOutOfRange { order_index, orders: total })?;

        if order.numerator == 0 {
            continue;
        }

        if resolver.criteria_proof.len() > max_proof_length {
            return Err(SettlementError::ProofTooLong {
                length: resolver.criteria_proof.len(),
                max: max_proof_length,
            });
        }

        let item_index = resolver.index;
        let parameters = &mut order.parameters;
        let items = parameters.item_count(resolver.side);
        let (item_type, identifier_or_criteria) = match resolver.side {
            ItemSide::Offer => parameters
                .offer
                .get_mut(item_index)
                .map(|item| (&mut item.item_type, &mut item.identifier_or_criteria)),
            ItemSide::Consideration => parameters
                .consideration
                .get_mut(item_index)
                .map(|item| (&mut item.item_type, &mut item.identifier_or_criteria)),
        }
        .ok_or(SettlementError::ItemIndexOutOfRange {
            order_index,
            side: resolver.side,
            item_index,
            items,
        })?;

        if !item_type.is_criteria_based() {
            return Err(SettlementError::CriteriaNotEnabledForItem {
                order_index,
                side: resolver.side,
                item_index,
            });
        }

        if !verify_proof(&resolver.identifier, identifier_or_criteria, &resolver.criteria_proof) {
            return Err(SettlementError::CriteriaNotMet {
                order_index,
                side: resolver.side,
                item_index,
            });
        }

        *item_type = item_type.resolved();
        *identifier_or_criteria = resolver.identifier;
        debug!(order_index, side = ?resolver.side, item_index, "criteria resolved");
    }

    ensure_resolved(orders)
}

fn ensure_resolved(orders: &[AdvancedOrder]) -> Result<(), SettlementError> {
    for (order_index, order) in orders.iter().enumerate() {
        if order.numerator == 0 {
            continue;
        }
        let parameters = &order.parameters;
        if let Some(item_index) = parameters
            .offer
            .iter()
            .position(|item| item.item_type.is_criteria_based())
        {
            return Err(SettlementError::UnresolvedCriteria {
                order_index,
                side: ItemSide::Offer,
                item_index,
            });
        }
        if let Some(item_index) = parameters
            .consideration
            .iter()
            .position(|item| item.item_type.is_criteria_based())
        {
            return Err(SettlementError::UnresolvedCriteria {
                order_index,
                side: ItemSide::Consideration,
                item_index,
            });
        }
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================
