//! Execution type: one concrete transfer derived by the engine.
//!
//! Executions are never supplied by callers. They are the output of
//! fulfillment aggregation or direct order fulfillment and are handed to the
//! transfer executor in order.

use serde::{Deserialize, Serialize};

use crate::types::item::ReceivedItem;
use crate::types::primitives::{short_hex, Address, ConduitKey, ZERO_WORD};

/// A single asset transfer.
///
/// ## Example
///
/// ```
/// use dark_settlement::types::{Execution, ItemType, ReceivedItem};
///
/// let item = ReceivedItem {
///     item_type: ItemType::Fungible,
///     token: [3u8; 32],
///     identifier: [0u8; 32],
///     amount: 10,
///     recipient: [1u8; 32],
/// };
/// let execution = Execution::new(item, [2u8; 32], [0u8; 32]);
/// assert!(execution.is_direct());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Execution {
    /// What moves, how much, and to whom
    pub item: ReceivedItem,
    /// Account the item is taken from
    pub offerer: Address,
    /// Transfer path; zero for a direct transfer
    pub conduit_key: ConduitKey,
}

impl Execution {
    pub fn new(item: ReceivedItem, offerer: Address, conduit_key: ConduitKey) -> Self {
        Self { item, offerer, conduit_key }
    }

    /// Whether the transfer bypasses conduits
    pub fn is_direct(&self) -> bool {
        self.conduit_key == ZERO_WORD
    }

    /// Whether source and destination are the same account
    pub fn is_self_transfer(&self) -> bool {
        self.offerer == self.item.recipient
    }

    /// Compact description for logs
    pub fn summary(&self) -> String {
        format!(
            "{:?} {} x{} {} -> {}",
            self.item.item_type,
            short_hex(&self.item.token),
            self.item.amount,
            short_hex(&self.offerer),
            short_hex(&self.item.recipient),
        )
    }
}
