//! Persistent settlement state and the per-call staging overlay.
//!
//! ## Layout
//!
//! - **Statuses**: `BTreeMap<OrderHash, OrderStatus>`. The order hash
//!   already commits to the offerer and the offerer's counter.
//! - **Counters**: `BTreeMap<Address, u64>`, absent = 0.
//!
//! `BTreeMap` keeps iteration sorted, so the state root is a pure function
//! of the contents.
//!
//! ## Staging
//!
//! A call never writes to [`SettlementState`] directly. It reads and writes
//! through a [`StagedState`] overlay, and the engine applies the overlay's
//! changes only after every check and every transfer succeeded. Dropping the
//! overlay discards the call.
//!
//! ```text
//!   StagedState ──read miss──> SettlementState
//!        │
//!        └── into_changes() ──> SettlementState::apply()   (commit)
//! ```

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::error::SettlementError;
use crate::types::{amount_word, Address, Hash, OrderHash, OrderStatus};

// ============================================================================
// State root leaves
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
struct StatusLeaf {
    order_hash: [u8; 32],
    is_validated: u8,
    is_cancelled: u8,
    numerator: [u8; 32],
    denominator: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
struct CounterLeaf {
    offerer: [u8; 32],
    counter: u64,
}

fn encode<T: SimpleSerialize>(value: &T) -> Result<Vec<u8>, SettlementError> {
    ssz_rs::serialize(value).map_err(|e| SettlementError::Encoding(format!("{:?}", e)))
}

// ============================================================================
// SettlementState
// ============================================================================

/// Order statuses and offerer counters, surviving across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementState {
    statuses: BTreeMap<OrderHash, OrderStatus>,
    counters: BTreeMap<Address, u64>,
    /// Number of committed calls
    batches_settled: u64,
}

impl SettlementState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of an order; untouched orders read as the default 0/0 status
    pub fn order_status(&self, order_hash: &OrderHash) -> OrderStatus {
        self.statuses.get(order_hash).copied().unwrap_or_default()
    }

    /// Current counter of an offerer
    pub fn counter(&self, offerer: &Address) -> u64 {
        self.counters.get(offerer).copied().unwrap_or(0)
    }

    #[inline]
    pub fn batches_settled(&self) -> u64 {
        self.batches_settled
    }

    /// Number of orders with a stored status
    #[inline]
    pub fn order_count(&self) -> usize {
        self.statuses.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.counters.is_empty()
    }

    /// SHA-256 commitment over every status and counter, in key order.
    pub fn state_root(&self) -> Result<Hash, SettlementError> {
        let mut hasher = Sha256::new();
        hasher.update(b"statuses");
        for (order_hash, status) in &self.statuses {
            hasher.update(encode(&StatusLeaf {
                order_hash: *order_hash,
                is_validated: u8::from(status.is_validated),
                is_cancelled: u8::from(status.is_cancelled),
                numerator: amount_word(status.numerator),
                denominator: amount_word(status.denominator),
            })?);
        }
        hasher.update(b"counters");
        for (offerer, counter) in &self.counters {
            hasher.update(encode(&CounterLeaf { offerer: *offerer, counter: *counter })?);
        }
        Ok(hasher.finalize().into())
    }

    /// Commit staged changes and count the call. Returns the new batch id.
    pub(crate) fn apply(&mut self, changes: StateChanges) -> u64 {
        self.statuses.extend(changes.statuses);
        self.counters.extend(changes.counters);
        self.batches_settled += 1;
        self.batches_settled
    }
}

// ============================================================================
// Staging overlay
// ============================================================================

/// Writes collected by a [`StagedState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StateChanges {
    pub statuses: BTreeMap<OrderHash, OrderStatus>,
    pub counters: BTreeMap<Address, u64>,
}

impl StateChanges {
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.counters.is_empty()
    }
}

/// Copy-on-write view of a [`SettlementState`] for one call.
#[derive(Debug)]
pub(crate) struct StagedState<'a> {
    base: &'a SettlementState,
    changes: StateChanges,
}

impl<'a> StagedState<'a> {
    pub fn new(base: &'a SettlementState) -> Self {
        Self { base, changes: StateChanges::default() }
    }

    pub fn order_status(&self, order_hash: &OrderHash) -> OrderStatus {
        match self.changes.statuses.get(order_hash) {
            Some(status) => *status,
            None => self.base.order_status(order_hash),
        }
    }

    pub fn set_order_status(&mut self, order_hash: OrderHash, status: OrderStatus) {
        self.changes.statuses.insert(order_hash, status);
    }

    pub fn counter(&self, offerer: &Address) -> u64 {
        match self.changes.counters.get(offerer) {
            Some(counter) => *counter,
            None => self.base.counter(offerer),
        }
    }

    pub fn set_counter(&mut self, offerer: Address, counter: u64) {
        self.changes.counters.insert(offerer, counter);
    }

    pub fn into_changes(self) -> StateChanges {
        self.changes
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(numerator: u128, denominator: u128) -> OrderStatus {
        OrderStatus { is_validated: true, is_cancelled: false, numerator, denominator }
    }

    #[test]
    fn test_defaults() {
        let state = SettlementState::new();
        assert_eq!(state.order_status(&[1u8; 32]), OrderStatus::default());
        assert_eq!(state.counter(&[1u8; 32]), 0);
        assert!(state.is_empty());
    }

    #[test]
    fn test_staged_reads_through() {
        let mut state = SettlementState::new();
        state.apply(StateChanges {
            statuses: BTreeMap::from([([1u8; 32], filled(1, 2))]),
            counters: BTreeMap::new(),
        });

        let mut staged = StagedState::new(&state);
        assert_eq!(staged.order_status(&[1u8; 32]), filled(1, 2));
        staged.set_order_status([1u8; 32], filled(1, 1));
        assert_eq!(staged.order_status(&[1u8; 32]), filled(1, 1));
        // Base untouched until commit
        assert_eq!(state.order_status(&[1u8; 32]), filled(1, 2));
    }

    #[test]
    fn test_dropped_stage_leaves_state() {
        let state = SettlementState::new();
        let root = state.state_root().unwrap();
        {
            let mut staged = StagedState::new(&state);
            staged.set_counter([2u8; 32], 5);
        }
        assert_eq!(state.state_root().unwrap(), root);
        assert_eq!(state.counter(&[2u8; 32]), 0);
    }

    #[test]
    fn test_apply_commits_and_counts() {
        let mut state = SettlementState::new();
        let mut staged = StagedState::new(&state);
        staged.set_counter([2u8; 32], 1);
        staged.set_order_status([3u8; 32], filled(3, 10));
        let changes = staged.into_changes();
        assert!(!changes.is_empty());

        assert_eq!(state.apply(changes), 1);
        assert_eq!(state.counter(&[2u8; 32]), 1);
        assert_eq!(state.order_status(&[3u8; 32]), filled(3, 10));
        assert_eq!(state.order_count(), 1);
    }

    #[test]
    fn test_state_root_tracks_contents() {
        let mut a = SettlementState::new();
        let mut b = SettlementState::new();
        let empty = a.state_root().unwrap();

        let changes = StateChanges {
            statuses: BTreeMap::from([([1u8; 32], filled(1, 3)), ([2u8; 32], filled(1, 1))]),
            counters: BTreeMap::from([([9u8; 32], 2)]),
        };
        a.apply(changes.clone());
        b.apply(changes);

        assert_ne!(a.state_root().unwrap(), empty);
        assert_eq!(a.state_root().unwrap(), b.state_root().unwrap());

        b.apply(StateChanges {
            statuses: BTreeMap::from([([1u8; 32], filled(2, 3))]),
            counters: BTreeMap::new(),
        });
        assert_ne!(a.state_root().unwrap(), b.state_root().unwrap());
    }
}
