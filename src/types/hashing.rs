//! Deterministic order hashing.
//!
//! ## Encoding
//!
//! Each item is encoded as a fixed-size SSZ container and hashed with
//! SHA-256. Item hashes are concatenated and hashed again to commit to the
//! offer and consideration lists, and the order header (which embeds both
//! list hashes and the offerer's counter) is hashed last:
//!
//! ```text
//! offer_hash         = H(H(ssz(offer[0])) || H(ssz(offer[1])) || ...)
//! consideration_hash = H(H(ssz(consideration[0])) || ...)   (original items only)
//! order_hash         = H(ssz(header{offerer, zone, offer_hash, ..., counter}))
//! ```
//!
//! Under SSZ, fixed-size containers are the concatenation of their
//! little-endian fields, so the encoding is identical on every platform.
//! Amounts are encoded as 32-byte big-endian words.
//!
//! ## Signing Digest
//!
//! Signatures cover `H(0x19 || 0x01 || domain_separator || order_hash)`, which
//! binds an order to one settlement deployment.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::config::EngineConfig;
use crate::error::SettlementError;
use crate::types::item::{ConsiderationItem, OfferItem};
use crate::types::order::OrderParameters;
use crate::types::primitives::{amount_word, Hash, OrderHash};

// ============================================================================
// SSZ containers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
struct OfferItemLeaf {
    item_type: u8,
    token: [u8; 32],
    identifier_or_criteria: [u8; 32],
    start_amount: [u8; 32],
    end_amount: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
struct ConsiderationItemLeaf {
    item_type: u8,
    token: [u8; 32],
    identifier_or_criteria: [u8; 32],
    start_amount: [u8; 32],
    end_amount: [u8; 32],
    recipient: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
struct OrderHeader {
    offerer: [u8; 32],
    zone: [u8; 32],
    offer_hash: [u8; 32],
    consideration_hash: [u8; 32],
    order_type: u8,
    start_time: u64,
    end_time: u64,
    zone_hash: [u8; 32],
    salt: [u8; 32],
    conduit_key: [u8; 32],
    counter: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
struct DomainHeader {
    name_hash: [u8; 32],
    version_hash: [u8; 32],
    chain_id: u64,
    settlement_address: [u8; 32],
}

// ============================================================================
// Hash helpers
// ============================================================================

/// Compute SHA-256 of the given data
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn ssz_hash<T: SimpleSerialize>(value: &T) -> Result<Hash, SettlementError> {
    let bytes = ssz_rs::serialize(value)
        .map_err(|e| SettlementError::Encoding(format!("{:?}", e)))?;
    Ok(sha256(&bytes))
}

fn offer_item_hash(item: &OfferItem) -> Result<Hash, SettlementError> {
    ssz_hash(&OfferItemLeaf {
        item_type: item.item_type.to_u8(),
        token: item.token,
        identifier_or_criteria: item.identifier_or_criteria,
        start_amount: amount_word(item.start_amount),
        end_amount: amount_word(item.end_amount),
    })
}

fn consideration_item_hash(item: &ConsiderationItem) -> Result<Hash, SettlementError> {
    ssz_hash(&ConsiderationItemLeaf {
        item_type: item.item_type.to_u8(),
        token: item.token,
        identifier_or_criteria: item.identifier_or_criteria,
        start_amount: amount_word(item.start_amount),
        end_amount: amount_word(item.end_amount),
        recipient: item.recipient,
    })
}

// ============================================================================
// Public API
// ============================================================================

/// Hash of an order's parameters bound to the offerer's counter.
///
/// Only the first `total_original_consideration_items` consideration items
/// are committed to; items appended by a fulfiller do not change the hash.
///
/// # Example
///
/// ```
/// use dark_settlement::types::{order_hash, OrderParameters};
///
/// let params = OrderParameters::new([1u8; 32], vec![], vec![], 0, 100);
/// let h0 = order_hash(&params, 0).unwrap();
/// let h1 = order_hash(&params, 1).unwrap();
/// assert_ne!(h0, h1);
/// ```
pub fn order_hash(parameters: &OrderParameters, counter: u64) -> Result<OrderHash, SettlementError> {
    let mut offer_hasher = Sha256::new();
    for item in &parameters.offer {
        offer_hasher.update(offer_item_hash(item)?);
    }

    let mut consideration_hasher = Sha256::new();
    for item in parameters
        .consideration
        .iter()
        .take(parameters.total_original_consideration_items)
    {
        consideration_hasher.update(consideration_item_hash(item)?);
    }

    ssz_hash(&OrderHeader {
        offerer: parameters.offerer,
        zone: parameters.zone,
        offer_hash: offer_hasher.finalize().into(),
        consideration_hash: consideration_hasher.finalize().into(),
        order_type: parameters.order_type.to_u8(),
        start_time: parameters.start_time,
        end_time: parameters.end_time,
        zone_hash: parameters.zone_hash,
        salt: parameters.salt,
        conduit_key: parameters.conduit_key,
        counter,
    })
}

/// Domain separator for the configured settlement deployment
pub fn domain_separator(config: &EngineConfig) -> Result<Hash, SettlementError> {
    ssz_hash(&DomainHeader {
        name_hash: sha256(config.name.as_bytes()),
        version_hash: sha256(config.version.as_bytes()),
        chain_id: config.chain_id,
        settlement_address: config.settlement_address,
    })
}

/// The digest an offerer signs for `order_hash`
pub fn signing_digest(domain_separator: &Hash, order_hash: &OrderHash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([0x19, 0x01]);
    hasher.update(domain_separator);
    hasher.update(order_hash);
    hasher.finalize().into()
}

// ============================================================================
// Unit Tests
// ============================================================================
