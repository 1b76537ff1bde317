//! Call inputs and outputs for the settlement engine.

use crate::events::SettlementEvent;
use crate::types::{
    Address, AdvancedOrder, ConduitKey, CriteriaResolver, Execution, Fulfillment,
    FulfillmentComponent, OrderHash, OrderStatus, SettlementReceipt, ZERO_WORD,
};

/// Who is calling and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    /// Current time (unix seconds)
    pub now: u64,
}

impl CallContext {
    pub fn new(caller: Address, now: u64) -> Self {
        Self { caller, now }
    }
}

/// Fill one advanced order directly.
#[derive(Debug, Clone, Default)]
pub struct FulfillOrder {
    pub order: AdvancedOrder,
    pub criteria_resolvers: Vec<CriteriaResolver>,
    /// Conduit the fulfiller pays consideration through
    pub fulfiller_conduit_key: ConduitKey,
    /// Receiver of the offer items; zero means the caller
    pub recipient: Address,
}

impl FulfillOrder {
    pub fn new(order: AdvancedOrder) -> Self {
        Self { order, ..Default::default() }
    }

    pub fn with_resolvers(mut self, criteria_resolvers: Vec<CriteriaResolver>) -> Self {
        self.criteria_resolvers = criteria_resolvers;
        self
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = recipient;
        self
    }

    pub fn with_conduit_key(mut self, fulfiller_conduit_key: ConduitKey) -> Self {
        self.fulfiller_conduit_key = fulfiller_conduit_key;
        self
    }
}

/// Fill as many of a set of orders as are available.
#[derive(Debug, Clone, Default)]
pub struct FulfillAvailableOrders {
    pub orders: Vec<AdvancedOrder>,
    pub criteria_resolvers: Vec<CriteriaResolver>,
    /// Each entry groups offer items into one transfer to the recipient
    pub offer_fulfillments: Vec<Vec<FulfillmentComponent>>,
    /// Each entry groups consideration items into one payment by the caller
    pub consideration_fulfillments: Vec<Vec<FulfillmentComponent>>,
    pub fulfiller_conduit_key: ConduitKey,
    /// Receiver of the offer items; zero means the caller
    pub recipient: Address,
    /// Stop after this many orders received a fill
    pub maximum_fulfilled: usize,
}

impl FulfillAvailableOrders {
    /// Request every order, with no cap on the number filled
    pub fn new(
        orders: Vec<AdvancedOrder>,
        offer_fulfillments: Vec<Vec<FulfillmentComponent>>,
        consideration_fulfillments: Vec<Vec<FulfillmentComponent>>,
    ) -> Self {
        let maximum_fulfilled = orders.len();
        Self {
            orders,
            offer_fulfillments,
            consideration_fulfillments,
            maximum_fulfilled,
            ..Default::default()
        }
    }

    pub fn with_resolvers(mut self, criteria_resolvers: Vec<CriteriaResolver>) -> Self {
        self.criteria_resolvers = criteria_resolvers;
        self
    }

    pub fn with_maximum_fulfilled(mut self, maximum_fulfilled: usize) -> Self {
        self.maximum_fulfilled = maximum_fulfilled;
        self
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = recipient;
        self
    }
}

/// Match orders against each other.
#[derive(Debug, Clone, Default)]
pub struct MatchOrders {
    pub orders: Vec<AdvancedOrder>,
    pub criteria_resolvers: Vec<CriteriaResolver>,
    pub fulfillments: Vec<Fulfillment>,
    /// Receiver of leftover offer amounts; zero means the caller
    pub recipient: Address,
}

impl MatchOrders {
    pub fn new(orders: Vec<AdvancedOrder>, fulfillments: Vec<Fulfillment>) -> Self {
        Self { orders, fulfillments, ..Default::default() }
    }

    pub fn with_resolvers(mut self, criteria_resolvers: Vec<CriteriaResolver>) -> Self {
        self.criteria_resolvers = criteria_resolvers;
        self
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = recipient;
        self
    }
}

/// Result of a committed call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettlementOutcome {
    /// Transfers dispatched, in execution order
    pub executions: Vec<Execution>,
    /// Final status of each order named by the call, in input order
    pub statuses: Vec<(OrderHash, OrderStatus)>,
    pub events: Vec<SettlementEvent>,
    pub receipt: SettlementReceipt,
}

impl SettlementOutcome {
    /// Status of the order at `index` in the call's input
    pub fn status(&self, index: usize) -> Option<&OrderStatus> {
        self.statuses.get(index).map(|(_, status)| status)
    }

    /// Hash of the order at `index` in the call's input
    pub fn order_hash(&self, index: usize) -> Option<&OrderHash> {
        self.statuses.get(index).map(|(hash, _)| hash)
    }
}

/// Resolve a zero recipient to the caller
pub(crate) fn recipient_or_caller(recipient: Address, ctx: &CallContext) -> Address {
    if recipient == ZERO_WORD {
        ctx.caller
    } else {
        recipient
    }
}
