//! Settlement receipt for a committed batch.
//!
//! The receipt summarizes a batch call and carries the state root of the
//! settlement state after commit, so two replicas replaying the same calls
//! can compare a single 32-byte value.

use ssz_rs::prelude::*;

/// Summary of a committed settlement batch.
///
/// ## State Root
///
/// The 32-byte state root is a SHA-256 hash over every order status and
/// offerer counter (see `SettlementState::state_root`).
///
/// ## Example
///
/// ```
/// use dark_settlement::types::SettlementReceipt;
///
/// let receipt = SettlementReceipt::new(1, 2, 4, [0u8; 32], 1_700_000_000);
/// assert!(!receipt.is_empty());
/// assert_eq!(receipt.state_root_hex().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct SettlementReceipt {
    /// Batch sequence number
    pub batch_id: u64,

    /// Number of orders that received a fill in this batch
    pub orders_fulfilled: u64,

    /// Number of executions dispatched
    pub executions: u64,

    /// State root after commit
    pub state_root: [u8; 32],

    /// Settlement time (unix seconds)
    pub timestamp: u64,
}

impl SettlementReceipt {
    pub fn new(
        batch_id: u64,
        orders_fulfilled: u64,
        executions: u64,
        state_root: [u8; 32],
        timestamp: u64,
    ) -> Self {
        Self {
            batch_id,
            orders_fulfilled,
            executions,
            state_root,
            timestamp,
        }
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// Whether no order was fulfilled
    pub fn is_empty(&self) -> bool {
        self.orders_fulfilled == 0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
