//! Core data types for the settlement engine
//!
//! Items and orders are plain value types. Anything hashed or committed goes
//! through a fixed-size SSZ container first so the encoding is deterministic.
//!
//! ## Types
//!
//! - [`OfferItem`] / [`ConsiderationItem`]: what an order gives and requires
//! - [`SpentItem`] / [`ReceivedItem`]: items with amounts fixed for one call
//! - [`OrderParameters`], [`Order`], [`AdvancedOrder`]: signed order terms
//! - [`OrderStatus`]: persistent lifecycle record
//! - [`CriteriaResolver`], [`Fulfillment`]: per-call instructions
//! - [`Execution`]: a derived transfer
//! - [`SettlementReceipt`]: batch summary with state root

pub mod amount;
mod execution;
mod hashing;
mod item;
mod order;
mod primitives;
mod receipt;

pub use amount::{apply_fraction, gcd, locate_current_amount, Fraction};
pub use execution::Execution;
pub use hashing::{domain_separator, order_hash, sha256, signing_digest};
pub use item::{ConsiderationItem, ItemSide, ItemType, OfferItem, ReceivedItem, SpentItem};
pub use order::{
    AdvancedOrder, CriteriaResolver, FillState, Fulfillment, FulfillmentComponent, Order,
    OrderParameters, OrderStatus, OrderType,
};
pub use primitives::{
    amount_word, identifier, identifier_to_u128, short_hex, Address, Amount, ConduitKey, Hash,
    OrderHash, Word, ZERO_WORD,
};
pub use receipt::SettlementReceipt;
