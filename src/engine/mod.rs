//! Settlement engine module.
//!
//! ## Design Principles
//!
//! 1. **Atomicity**: A call commits every status change and transfer, or none
//! 2. **Explicit State**: Statuses and counters live in a [`SettlementState`]
//!    passed into each call
//! 3. **Injected Capabilities**: Signatures, zones and transfers go through
//!    traits, so the core runs without a chain
//! 4. **Determinism**: Same state and inputs give the same executions and
//!    state root
//!
//! ## Entry Points
//!
//! | Call                        | Orders | Executions derived from          |
//! |-----------------------------|--------|----------------------------------|
//! | `fulfill_basic_order`       | 1      | every item, whole order          |
//! | `fulfill_order`             | 1      | every item, requested fraction   |
//! | `fulfill_available_orders`  | many   | one-sided fulfillments           |
//! | `match_orders`              | many   | two-sided fulfillments + sweep   |
//! | `validate` / `cancel`       | many   | none (status only)               |
//! | `increment_counter`         | -      | none (counter only)              |
//!
//! ## Example
//!
//! ```
//! use dark_settlement::config::EngineConfig;
//! use dark_settlement::engine::{CallContext, FulfillOrder, SettlementEngine, SettlementState};
//! use dark_settlement::interfaces::RecordingExecutor;
//! use dark_settlement::types::{
//!     identifier, AdvancedOrder, ConsiderationItem, ItemType, OfferItem, Order, OrderParameters,
//!     ZERO_WORD,
//! };
//!
//! let engine = SettlementEngine::with_defaults(EngineConfig::default()).unwrap();
//! let mut state = SettlementState::new();
//! let mut executor = RecordingExecutor::new();
//!
//! let seller = [1u8; 32];
//! let params = OrderParameters::new(
//!     seller,
//!     vec![OfferItem::new(ItemType::Unique, [7u8; 32], identifier(5), 1)],
//!     vec![ConsiderationItem::new(ItemType::Fungible, [8u8; 32], ZERO_WORD, 10, seller)],
//!     0,
//!     1_000,
//! );
//!
//! // The offerer filling their own order needs no signature
//! let order = AdvancedOrder::from(Order::new(params, vec![]));
//! let outcome = engine
//!     .fulfill_order(&mut state, &mut executor, CallContext::new(seller, 10), FulfillOrder::new(order))
//!     .unwrap();
//!
//! assert_eq!(outcome.executions.len(), 2);
//! assert!(outcome.status(0).unwrap().is_fully_filled());
//! ```

mod request;
mod settlement;
mod state;

pub use request::{CallContext, FulfillAvailableOrders, FulfillOrder, MatchOrders, SettlementOutcome};
pub use settlement::SettlementEngine;
pub use state::SettlementState;
