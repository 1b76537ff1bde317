//! # Dark Settlement
//!
//! Deterministic order settlement engine for peer-to-peer asset exchange.
//!
//! ## Architecture
//!
//! - **Types**: Items, orders, statuses, executions, order hashing
//! - **Criteria**: Merkle proofs resolving wildcard items to identifiers
//! - **Fulfillment**: Aggregation of fulfillment components into executions
//! - **Engine**: Validation, fill accounting, staging and commit
//! - **Interfaces**: Signature verifier, zones, transfer executor
//!
//! ## Design Principles
//!
//! 1. **Determinism**: All operations produce identical results for identical inputs
//! 2. **Integer Math**: Amounts are `u128`, all arithmetic is checked
//! 3. **All-or-Nothing**: A failed call leaves the settlement state untouched
//! 4. **Conservation**: No execution moves more than its items make available

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: items, orders, executions, receipts
pub mod types;

/// Criteria resolution via Merkle proofs
pub mod criteria;

/// Fulfillment aggregation
pub mod fulfillment;

/// Settlement engine: orchestration and state
pub mod engine;

/// Injected capabilities
pub mod interfaces;

/// Settlement events
pub mod events;

/// Error types
pub mod error;

/// Engine configuration
pub mod config;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::EngineConfig;
pub use engine::{
    CallContext, FulfillAvailableOrders, FulfillOrder, MatchOrders, SettlementEngine,
    SettlementOutcome, SettlementState,
};
pub use error::{SettlementError, TransferError};
pub use events::SettlementEvent;
pub use types::{
    AdvancedOrder, ConsiderationItem, CriteriaResolver, Execution, Fulfillment,
    FulfillmentComponent, ItemSide, ItemType, OfferItem, Order, OrderParameters, OrderStatus,
    OrderType,
};
