//! Fulfillment aggregation.
//!
//! Reduces fulfillment components to executions against the per-call working
//! amounts of each order. Every order taking part in a batch is first turned
//! into an [`ActiveOrder`]: its offer and consideration items with amounts
//! already interpolated and scaled by the fill fraction. Aggregation then
//! consumes those amounts, so an item can be split across fulfillments but
//! never spent twice.
//!
//! ## Modes
//!
//! ```text
//! match:      offer components ──┐
//!                                ├── min(offer sum, consideration sum) ──> 1 execution
//!             consid. components ┘
//!
//! available:  offer components ─────────> 1 execution to the fulfiller's recipient
//!             consid. components ───────> 1 execution paid by the fulfiller
//! ```
//!
//! After aggregation, [`ensure_consideration_met`] rejects any consideration
//! left unpaid and [`sweep_unspent_offer`] hands leftover offer amounts to a
//! recipient (match mode only).

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::SettlementError;
use crate::types::{
    Address, Amount, ConduitKey, Execution, Fulfillment, FulfillmentComponent, ItemSide,
    ItemType, OrderHash, ReceivedItem, SpentItem, Word,
};

// ============================================================================
// ActiveOrder
// ============================================================================

/// An order's working amounts for the current call.
///
/// Offer amounts are what remains to be given; consideration amounts are what
/// remains to be paid. Both only go down during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveOrder {
    pub order_hash: OrderHash,
    pub offerer: Address,
    pub conduit_key: ConduitKey,
    pub offer: Vec<SpentItem>,
    pub consideration: Vec<ReceivedItem>,
    /// False when the order is skipped in this call (available mode)
    pub available: bool,
}

impl ActiveOrder {
    /// Placeholder for an order that does not take part in this call.
    pub fn skipped(order_hash: OrderHash, offerer: Address) -> Self {
        Self {
            order_hash,
            offerer,
            available: false,
            ..Default::default()
        }
    }
}

// ============================================================================
// Component lookup
// ============================================================================

fn locate(
    orders: &[ActiveOrder],
    component: &FulfillmentComponent,
    side: ItemSide,
) -> Result<(), SettlementError> {
    let order = orders
        .get(component.order_index)
        .ok_or(SettlementError::OrderIndexOutOfRange {
            order_index: component.order_index,
            orders: orders.len(),
        })?;
    let items = match side {
        ItemSide::Offer => order.offer.len(),
        ItemSide::Consideration => order.consideration.len(),
    };
    // Skipped orders carry no items; their components are bounds-checked
    // against the order list only.
    if order.available && component.item_index >= items {
        return Err(SettlementError::ItemIndexOutOfRange {
            order_index: component.order_index,
            side,
            item_index: component.item_index,
            items,
        });
    }
    Ok(())
}

/// The asset and source every offer component of a fulfillment must share.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OfferGroup {
    offerer: Address,
    conduit_key: ConduitKey,
    item_type: ItemType,
    token: Address,
    identifier: Word,
    total: Amount,
}

/// The asset and destination every consideration component must share.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConsiderationGroup {
    item_type: ItemType,
    token: Address,
    identifier: Word,
    recipient: Address,
    total: Amount,
}

/// Sum the offer side, checking uniformity.
///
/// Returns `None` when every component points at a skipped order. A
/// component repeated within the list contributes only once.
fn collect_offer(
    orders: &[ActiveOrder],
    components: &[FulfillmentComponent],
    fulfillment_index: usize,
) -> Result<Option<OfferGroup>, SettlementError> {
    let mut group: Option<OfferGroup> = None;
    let mut seen = BTreeSet::new();

    for component in components {
        locate(orders, component, ItemSide::Offer)?;
        let order = &orders[component.order_index];
        if !order.available || !seen.insert(*component) {
            continue;
        }
        let item = &order.offer[component.item_index];

        match group.as_mut() {
            None => {
                group = Some(OfferGroup {
                    offerer: order.offerer,
                    conduit_key: order.conduit_key,
                    item_type: item.item_type,
                    token: item.token,
                    identifier: item.identifier,
                    total: item.amount,
                })
            }
            Some(group) => {
                let uniform = group.offerer == order.offerer
                    && group.conduit_key == order.conduit_key
                    && group.item_type == item.item_type
                    && group.token == item.token
                    && group.identifier == item.identifier;
                if !uniform {
                    return Err(SettlementError::MismatchedFulfillmentComponents {
                        fulfillment_index,
                        side: ItemSide::Offer,
                    });
                }
                group.total = group
                    .total
                    .checked_add(item.amount)
                    .ok_or(SettlementError::ArithmeticError("offer aggregate overflow"))?;
            }
        }
    }
    Ok(group)
}

/// Sum the consideration side, checking uniformity.
fn collect_consideration(
    orders: &[ActiveOrder],
    components: &[FulfillmentComponent],
    fulfillment_index: usize,
) -> Result<Option<ConsiderationGroup>, SettlementError> {
    let mut group: Option<ConsiderationGroup> = None;
    let mut seen = BTreeSet::new();

    for component in components {
        locate(orders, component, ItemSide::Consideration)?;
        let order = &orders[component.order_index];
        if !order.available || !seen.insert(*component) {
            continue;
        }
        let item = &order.consideration[component.item_index];

        match group.as_mut() {
            None => {
                group = Some(ConsiderationGroup {
                    item_type: item.item_type,
                    token: item.token,
                    identifier: item.identifier,
                    recipient: item.recipient,
                    total: item.amount,
                })
            }
            Some(group) => {
                if !item.same_asset(group.item_type, &group.token, &group.identifier)
                    || item.recipient != group.recipient
                {
                    return Err(SettlementError::MismatchedFulfillmentComponents {
                        fulfillment_index,
                        side: ItemSide::Consideration,
                    });
                }
                group.total = group
                    .total
                    .checked_add(item.amount)
                    .ok_or(SettlementError::ArithmeticError("consideration aggregate overflow"))?;
            }
        }
    }
    Ok(group)
}

/// Deduct `amount` from the offer components in the order given.
fn drain_offer(orders: &mut [ActiveOrder], components: &[FulfillmentComponent], mut amount: Amount) {
    for component in components {
        if amount == 0 {
            break;
        }
        let order = &mut orders[component.order_index];
        if !order.available {
            continue;
        }
        let item = &mut order.offer[component.item_index];
        let take = item.amount.min(amount);
        item.amount -= take;
        amount -= take;
    }
}

/// Deduct `amount` from the consideration components in the order given.
fn drain_consideration(
    orders: &mut [ActiveOrder],
    components: &[FulfillmentComponent],
    mut amount: Amount,
) {
    for component in components {
        if amount == 0 {
            break;
        }
        let order = &mut orders[component.order_index];
        if !order.available {
            continue;
        }
        let item = &mut order.consideration[component.item_index];
        let take = item.amount.min(amount);
        item.amount -= take;
        amount -= take;
    }
}

fn ensure_non_empty(
    components: &[FulfillmentComponent],
    fulfillment_index: usize,
    side: ItemSide,
) -> Result<(), SettlementError> {
    if components.is_empty() {
        return Err(SettlementError::EmptyFulfillmentComponents { fulfillment_index, side });
    }
    Ok(())
}

// ============================================================================
// Match mode
// ============================================================================

/// Aggregate one two-sided fulfillment into at most one execution.
///
/// The execution moves `min(offer sum, consideration sum)` of the shared
/// asset from the offer side's offerer to the consideration side's
/// recipient. Consumed amounts are deducted greedily from the components in
/// the order given; leftovers stay available for later fulfillments.
///
/// # Returns
///
/// `None` when the computed amount is zero.
///
/// # Errors
///
/// - `EmptyFulfillmentComponents` if either side is empty
/// - `OrderIndexOutOfRange` / `ItemIndexOutOfRange` for bad components
/// - `MismatchedFulfillmentComponents` if a side is not uniform
/// - `MismatchedOfferAndConsideration` if the two sides name different assets
pub fn aggregate(
    orders: &mut [ActiveOrder],
    fulfillment: &Fulfillment,
    fulfillment_index: usize,
) -> Result<Option<Execution>, SettlementError> {
    ensure_non_empty(&fulfillment.offer_components, fulfillment_index, ItemSide::Offer)?;
    ensure_non_empty(
        &fulfillment.consideration_components,
        fulfillment_index,
        ItemSide::Consideration,
    )?;

    let offer = collect_offer(orders, &fulfillment.offer_components, fulfillment_index)?;
    let consideration =
        collect_consideration(orders, &fulfillment.consideration_components, fulfillment_index)?;

    let (offer, consideration) = match (offer, consideration) {
        (Some(offer), Some(consideration)) => (offer, consideration),
        _ => return Ok(None),
    };

    if offer.item_type != consideration.item_type
        || offer.token != consideration.token
        || offer.identifier != consideration.identifier
    {
        return Err(SettlementError::MismatchedOfferAndConsideration { fulfillment_index });
    }

    let amount = offer.total.min(consideration.total);
    drain_offer(orders, &fulfillment.offer_components, amount);
    drain_consideration(orders, &fulfillment.consideration_components, amount);

    debug!(
        fulfillment_index,
        offered = offer.total,
        required = consideration.total,
        amount,
        "fulfillment aggregated"
    );

    if amount == 0 {
        return Ok(None);
    }

    let item = ReceivedItem {
        item_type: offer.item_type,
        token: offer.token,
        identifier: offer.identifier,
        amount,
        recipient: consideration.recipient,
    };
    Ok(Some(Execution::new(item, offer.offerer, offer.conduit_key)))
}

// ============================================================================
// Available mode
// ============================================================================

/// Aggregate offer components into one execution to `recipient`.
///
/// The whole remaining amount of each component is consumed. Components
/// pointing at skipped orders contribute nothing.
pub fn aggregate_offer_components(
    orders: &mut [ActiveOrder],
    components: &[FulfillmentComponent],
    fulfillment_index: usize,
    recipient: Address,
) -> Result<Option<Execution>, SettlementError> {
    ensure_non_empty(components, fulfillment_index, ItemSide::Offer)?;
    let group = match collect_offer(orders, components, fulfillment_index)? {
        Some(group) if group.total > 0 => group,
        _ => return Ok(None),
    };
    drain_offer(orders, components, group.total);

    let item = ReceivedItem {
        item_type: group.item_type,
        token: group.token,
        identifier: group.identifier,
        amount: group.total,
        recipient,
    };
    Ok(Some(Execution::new(item, group.offerer, group.conduit_key)))
}

/// Aggregate consideration components into one execution paid by the
/// fulfiller through the fulfiller's conduit.
pub fn aggregate_consideration_components(
    orders: &mut [ActiveOrder],
    components: &[FulfillmentComponent],
    fulfillment_index: usize,
    fulfiller: Address,
    fulfiller_conduit_key: ConduitKey,
) -> Result<Option<Execution>, SettlementError> {
    ensure_non_empty(components, fulfillment_index, ItemSide::Consideration)?;
    let group = match collect_consideration(orders, components, fulfillment_index)? {
        Some(group) if group.total > 0 => group,
        _ => return Ok(None),
    };
    drain_consideration(orders, components, group.total);

    let item = ReceivedItem {
        item_type: group.item_type,
        token: group.token,
        identifier: group.identifier,
        amount: group.total,
        recipient: group.recipient,
    };
    Ok(Some(Execution::new(item, fulfiller, fulfiller_conduit_key)))
}

// ============================================================================
// Post-aggregation checks
// ============================================================================

/// Fail if any available order still has unpaid consideration.
pub fn ensure_consideration_met(orders: &[ActiveOrder]) -> Result<(), SettlementError> {
    for (order_index, order) in orders.iter().enumerate() {
        if !order.available {
            continue;
        }
        if let Some((item_index, item)) = order
            .consideration
            .iter()
            .enumerate()
            .find(|(_, item)| item.amount > 0)
        {
            return Err(SettlementError::ConsiderationNotMet {
                order_index,
                item_index,
                shortfall: item.amount,
            });
        }
    }
    Ok(())
}

/// Send every leftover offer amount to `recipient`, in order/item order.
pub fn sweep_unspent_offer(orders: &mut [ActiveOrder], recipient: Address) -> Vec<Execution> {
    let mut executions = Vec::new();
    for order in orders.iter_mut().filter(|order| order.available) {
        for item in order.offer.iter_mut().filter(|item| item.amount > 0) {
            executions.push(Execution::new(
                item.to_received(recipient),
                order.offerer,
                order.conduit_key,
            ));
            item.amount = 0;
        }
    }
    executions
}

// ============================================================================
// Unit Tests
// ============================================================================
