//! Error taxonomy for settlement calls.
//!
//! Every rejection surfaces a distinct variant. Groups:
//! - input shape: bad indices, empty or mismatched fulfillments, bad proofs
//! - authorization: invalid signature, zone rejection, wrong canceller
//! - lifecycle: cancelled, already filled, partial fill on a full order, expired
//! - conservation: arithmetic overflow, inexact fractions, unmet consideration
//! - external: transfer executor failure
//!
//! Validation always precedes mutation, so any error leaves state untouched.

use thiserror::Error;

use crate::types::{Amount, ItemSide, OrderHash};

/// Errors raised by a transfer executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Transfer rejected: {reason}")]
    Rejected { reason: String },

    #[error("Conduit not open: {conduit}")]
    UnknownConduit { conduit: String },

    #[error("Invalid amount {amount} for unique token transfer")]
    InvalidUniqueAmount { amount: Amount },
}

/// Errors raised by the settlement engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    // ------------------------------------------------------------------
    // Input shape
    // ------------------------------------------------------------------
    #[error("Order index {order_index} out of range ({orders} orders)")]
    OrderIndexOutOfRange { order_index: usize, orders: usize },

    #[error("{side:?} item index {item_index} out of range for order {order_index} ({items} items)")]
    ItemIndexOutOfRange {
        order_index: usize,
        side: ItemSide,
        item_index: usize,
        items: usize,
    },

    #[error("Fulfillment {fulfillment_index} has no {side:?} components")]
    EmptyFulfillmentComponents { fulfillment_index: usize, side: ItemSide },

    #[error("Fulfillment {fulfillment_index} has mismatched {side:?} components")]
    MismatchedFulfillmentComponents { fulfillment_index: usize, side: ItemSide },

    #[error("Fulfillment {fulfillment_index} pairs an offer with a different consideration asset")]
    MismatchedOfferAndConsideration { fulfillment_index: usize },

    #[error("Criteria not enabled for {side:?} item {item_index} of order {order_index}")]
    CriteriaNotEnabledForItem { order_index: usize, side: ItemSide, item_index: usize },

    #[error("Criteria proof failed for {side:?} item {item_index} of order {order_index}")]
    CriteriaNotMet { order_index: usize, side: ItemSide, item_index: usize },

    #[error("Unresolved criteria on {side:?} item {item_index} of order {order_index}")]
    UnresolvedCriteria { order_index: usize, side: ItemSide, item_index: usize },

    #[error("Criteria proof of length {length} exceeds maximum {max}")]
    ProofTooLong { length: usize, max: usize },

    #[error("Bad fill fraction {numerator}/{denominator}")]
    BadFraction { numerator: u128, denominator: u128 },

    #[error("Order {order_index} supplies {supplied} consideration items, {required} are original")]
    MissingOriginalConsiderationItems { order_index: usize, supplied: usize, required: usize },

    #[error("Batch of {count} orders exceeds maximum {max}")]
    TooManyOrders { count: usize, max: usize },

    // ------------------------------------------------------------------
    // Authorization
    // ------------------------------------------------------------------
    #[error("Invalid signature for order {}", hex::encode(.order_hash))]
    InvalidSignature { order_hash: OrderHash },

    #[error("Zone rejected restricted order {}", hex::encode(.order_hash))]
    InvalidRestrictedOrder { order_hash: OrderHash },

    #[error("Caller may not cancel order {}", hex::encode(.order_hash))]
    InvalidCanceller { order_hash: OrderHash },

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------
    #[error("Order {} is cancelled", hex::encode(.order_hash))]
    OrderIsCancelled { order_hash: OrderHash },

    #[error("Order {} is already filled", hex::encode(.order_hash))]
    OrderAlreadyFilled { order_hash: OrderHash },

    #[error("Partial fills not enabled for order {}", hex::encode(.order_hash))]
    PartialFillsNotEnabledForOrder { order_hash: OrderHash },

    #[error("Order not active at {now} (window {start_time}..{end_time})")]
    InvalidTime { start_time: u64, end_time: u64, now: u64 },

    #[error("No specified orders available")]
    NoSpecifiedOrdersAvailable,

    // ------------------------------------------------------------------
    // Conservation
    // ------------------------------------------------------------------
    #[error("Arithmetic error: {0}")]
    ArithmeticError(&'static str),

    #[error("Inexact fraction: {amount} * {numerator} / {denominator}")]
    InexactFraction { amount: Amount, numerator: u128, denominator: u128 },

    #[error("Consideration item {item_index} of order {order_index} short by {shortfall}")]
    ConsiderationNotMet { order_index: usize, item_index: usize, shortfall: Amount },

    #[error("Encoding error: {0}")]
    Encoding(String),

    // ------------------------------------------------------------------
    // Configuration / external
    // ------------------------------------------------------------------
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),
}
