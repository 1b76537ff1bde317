//! Settlement events.
//!
//! Events are immutable records of state changes made by a committed call.
//! They are returned to the caller in the outcome rather than pushed to a
//! handler, so a failed call emits nothing.

use serde::{Deserialize, Serialize};

use crate::types::{short_hex, Address, OrderHash, ReceivedItem, SpentItem};

/// Events emitted by the settlement engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementEvent {
    /// An order received a fill
    OrderFulfilled {
        order_hash: OrderHash,
        offerer: Address,
        zone: Address,
        /// Receiver of the offer items; zero when matched against other orders
        recipient: Address,
        /// Offer items with the amounts filled
        offer: Vec<SpentItem>,
        /// Consideration items with the amounts paid
        consideration: Vec<ReceivedItem>,
    },

    /// A set of orders was matched against each other
    OrdersMatched { order_hashes: Vec<OrderHash> },

    /// An order was cancelled by its offerer or zone
    OrderCancelled {
        order_hash: OrderHash,
        offerer: Address,
        zone: Address,
    },

    /// An order's signature was checked ahead of fulfillment
    OrderValidated {
        order_hash: OrderHash,
        offerer: Address,
        zone: Address,
    },

    /// An offerer's counter moved, invalidating every order signed before
    CounterIncremented { offerer: Address, counter: u64 },
}

impl SettlementEvent {
    /// Order hash the event refers to, if any
    pub fn order_hash(&self) -> Option<&OrderHash> {
        match self {
            SettlementEvent::OrderFulfilled { order_hash, .. }
            | SettlementEvent::OrderCancelled { order_hash, .. }
            | SettlementEvent::OrderValidated { order_hash, .. } => Some(order_hash),
            SettlementEvent::OrdersMatched { .. } | SettlementEvent::CounterIncremented { .. } => {
                None
            }
        }
    }

    /// Short event name
    pub fn name(&self) -> &'static str {
        match self {
            SettlementEvent::OrderFulfilled { .. } => "OrderFulfilled",
            SettlementEvent::OrdersMatched { .. } => "OrdersMatched",
            SettlementEvent::OrderCancelled { .. } => "OrderCancelled",
            SettlementEvent::OrderValidated { .. } => "OrderValidated",
            SettlementEvent::CounterIncremented { .. } => "CounterIncremented",
        }
    }

    /// Compact description for logs
    pub fn summary(&self) -> String {
        match self {
            SettlementEvent::CounterIncremented { offerer, counter } => {
                format!("{} {} -> {}", self.name(), short_hex(offerer), counter)
            }
            SettlementEvent::OrdersMatched { order_hashes } => {
                format!("{} ({} orders)", self.name(), order_hashes.len())
            }
            other => match other.order_hash() {
                Some(hash) => format!("{} {}", other.name(), short_hex(hash)),
                None => other.name().to_string(),
            },
        }
    }
}
