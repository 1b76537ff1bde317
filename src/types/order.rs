//! Order types for the settlement engine.
//!
//! ## Static Terms vs. Lifecycle
//!
//! [`OrderParameters`] are the signed, immutable terms of an order.
//! [`OrderStatus`] is the mutable lifecycle record kept by the engine's state
//! store, keyed by the order hash.
//!
//! ## Lifecycle
//!
//! ```text
//! validation:  Unvalidated ──> Validated                  (one-way)
//! filling:     Open (0/0) ──> PartiallyFilled ──> FullyFilled
//!                  │                 │
//!                  └──────┬──────────┘
//!                         v
//!                     Cancelled                           (terminal)
//! ```

use crate::error::SettlementError;
use crate::types::amount::Fraction;
use crate::types::item::{ConsiderationItem, ItemSide, OfferItem};
use crate::types::primitives::{Address, ConduitKey, OrderHash, Word, ZERO_WORD};

// ============================================================================
// OrderType enum
// ============================================================================

/// Order type: fillability (full or partial) x zone restriction.
///
/// Represented as u8 for hashing:
/// - FullOpen = 0
/// - PartialOpen = 1
/// - FullRestricted = 2
/// - PartialRestricted = 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderType {
    /// Must be filled in one shot; no zone check
    #[default]
    FullOpen,
    /// Partial fills allowed; no zone check
    PartialOpen,
    /// Must be filled in one shot; zone must approve third-party fills
    FullRestricted,
    /// Partial fills allowed; zone must approve third-party fills
    PartialRestricted,
}

impl OrderType {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            OrderType::FullOpen => 0,
            OrderType::PartialOpen => 1,
            OrderType::FullRestricted => 2,
            OrderType::PartialRestricted => 3,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderType::FullOpen),
            1 => Some(OrderType::PartialOpen),
            2 => Some(OrderType::FullRestricted),
            3 => Some(OrderType::PartialRestricted),
            _ => None,
        }
    }

    pub fn allows_partial_fills(self) -> bool {
        match self {
            OrderType::PartialOpen | OrderType::PartialRestricted => true,
            OrderType::FullOpen | OrderType::FullRestricted => false,
        }
    }

    pub fn is_restricted(self) -> bool {
        match self {
            OrderType::FullRestricted | OrderType::PartialRestricted => true,
            OrderType::FullOpen | OrderType::PartialOpen => false,
        }
    }
}

// ============================================================================
// OrderParameters
// ============================================================================

/// The signed terms of an order.
///
/// Consideration items beyond `total_original_consideration_items` are
/// appended by the fulfiller (tips). They are not part of the order hash and
/// can only add consideration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderParameters {
    pub offerer: Address,
    pub zone: Address,
    pub offer: Vec<OfferItem>,
    pub consideration: Vec<ConsiderationItem>,
    pub order_type: OrderType,
    /// Inclusive start of the active window (unix seconds)
    pub start_time: u64,
    /// Exclusive end of the active window (unix seconds)
    pub end_time: u64,
    /// Opaque value passed to the zone
    pub zone_hash: Word,
    pub salt: Word,
    pub conduit_key: ConduitKey,
    pub total_original_consideration_items: usize,
}

impl OrderParameters {
    /// Create parameters for an open, full-fill order with no conduit.
    ///
    /// All supplied consideration items count as original.
    pub fn new(
        offerer: Address,
        offer: Vec<OfferItem>,
        consideration: Vec<ConsiderationItem>,
        start_time: u64,
        end_time: u64,
    ) -> Self {
        let total_original_consideration_items = consideration.len();
        Self {
            offerer,
            zone: ZERO_WORD,
            offer,
            consideration,
            order_type: OrderType::FullOpen,
            start_time,
            end_time,
            zone_hash: ZERO_WORD,
            salt: ZERO_WORD,
            conduit_key: ZERO_WORD,
            total_original_consideration_items,
        }
    }

    /// Whether `now` falls inside `[start_time, end_time)`
    pub fn is_active(&self, now: u64) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Number of items on the given side
    pub fn item_count(&self, side: ItemSide) -> usize {
        match side {
            ItemSide::Offer => self.offer.len(),
            ItemSide::Consideration => self.consideration.len(),
        }
    }
}

// ============================================================================
// Order / AdvancedOrder
// ============================================================================

/// Order parameters with the offerer's signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Order {
    pub parameters: OrderParameters,
    pub signature: Vec<u8>,
}

impl Order {
    pub fn new(parameters: OrderParameters, signature: Vec<u8>) -> Self {
        Self { parameters, signature }
    }
}

/// An order plus the fraction to fill in this call and zone extra data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvancedOrder {
    pub parameters: OrderParameters,
    pub numerator: u128,
    pub denominator: u128,
    pub signature: Vec<u8>,
    pub extra_data: Vec<u8>,
}

impl AdvancedOrder {
    /// Request the given fraction of the order
    pub fn with_fraction(mut self, numerator: u128, denominator: u128) -> Self {
        self.numerator = numerator;
        self.denominator = denominator;
        self
    }

    /// Attach extra data for the zone
    pub fn with_extra_data(mut self, extra_data: Vec<u8>) -> Self {
        self.extra_data = extra_data;
        self
    }

    pub fn requested_fraction(&self) -> Fraction {
        Fraction::new(self.numerator, self.denominator)
    }
}

impl From<Order> for AdvancedOrder {
    fn from(order: Order) -> Self {
        Self {
            parameters: order.parameters,
            numerator: 1,
            denominator: 1,
            signature: order.signature,
            extra_data: Vec::new(),
        }
    }
}

// ============================================================================
// OrderStatus
// ============================================================================

/// Fill state derived from an [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillState {
    Open,
    PartiallyFilled,
    FullyFilled,
    Cancelled,
}

/// Persistent lifecycle record of an order.
///
/// `numerator / denominator` is the cumulative fraction filled; 0/0 means
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderStatus {
    pub is_validated: bool,
    pub is_cancelled: bool,
    pub numerator: u128,
    pub denominator: u128,
}

impl OrderStatus {
    pub fn fill_state(&self) -> FillState {
        if self.is_cancelled {
            FillState::Cancelled
        } else if self.numerator == 0 {
            FillState::Open
        } else if self.numerator >= self.denominator {
            FillState::FullyFilled
        } else {
            FillState::PartiallyFilled
        }
    }

    pub fn is_fully_filled(&self) -> bool {
        self.denominator != 0 && self.numerator >= self.denominator
    }

    /// Fraction filled so far
    pub fn filled(&self) -> Fraction {
        Fraction::new(self.numerator, self.denominator)
    }

    /// Apply a requested fill fraction to this status.
    ///
    /// The filled and requested fractions are brought to a common
    /// denominator by cross multiplication (skipped when the denominators
    /// already agree), the request is capped at the remaining capacity, and
    /// both results are reduced by their GCD.
    ///
    /// # Returns
    ///
    /// `(fill, next)`: the fraction of the order filled by this request and
    /// the cumulative status after it. The status is marked validated.
    ///
    /// # Errors
    ///
    /// - `BadFraction` for 0 numerator, 0 denominator or numerator > denominator
    /// - `OrderAlreadyFilled` if no capacity remains
    /// - `ArithmeticError` if cross multiplication overflows
    pub fn apply_fill(
        &self,
        requested: Fraction,
        order_hash: &OrderHash,
    ) -> Result<(Fraction, OrderStatus), SettlementError> {
        if requested.numerator == 0
            || requested.denominator == 0
            || requested.numerator > requested.denominator
        {
            return Err(SettlementError::BadFraction {
                numerator: requested.numerator,
                denominator: requested.denominator,
            });
        }
        if self.is_fully_filled() {
            return Err(SettlementError::OrderAlreadyFilled { order_hash: *order_hash });
        }

        let (filled, wanted, denominator) = if self.denominator == 0 {
            (0, requested.numerator, requested.denominator)
        } else if self.denominator == requested.denominator {
            (self.numerator, requested.numerator, self.denominator)
        } else {
            let overflow = SettlementError::ArithmeticError("fill fraction overflow");
            (
                self.numerator
                    .checked_mul(requested.denominator)
                    .ok_or(overflow.clone())?,
                requested
                    .numerator
                    .checked_mul(self.denominator)
                    .ok_or(overflow.clone())?,
                self.denominator
                    .checked_mul(requested.denominator)
                    .ok_or(overflow)?,
            )
        };

        let fill_numerator = wanted.min(denominator - filled);
        let fill = Fraction::new(fill_numerator, denominator).reduced();
        let total = Fraction::new(filled + fill_numerator, denominator).reduced();

        let next = OrderStatus {
            is_validated: true,
            is_cancelled: false,
            numerator: total.numerator,
            denominator: total.denominator,
        };
        Ok((fill, next))
    }
}

// ============================================================================
// Criteria resolvers and fulfillments
// ============================================================================

/// Resolves one criteria-based item to a concrete identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CriteriaResolver {
    pub order_index: usize,
    pub side: ItemSide,
    pub index: usize,
    pub identifier: Word,
    /// Sibling hashes from the leaf up to the root
    pub criteria_proof: Vec<Word>,
}

impl CriteriaResolver {
    pub fn new(order_index: usize, side: ItemSide, index: usize, identifier: Word, criteria_proof: Vec<Word>) -> Self {
        Self { order_index, side, index, identifier, criteria_proof }
    }
}

/// Pointer to an item: (order index, item index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FulfillmentComponent {
    pub order_index: usize,
    pub item_index: usize,
}

impl FulfillmentComponent {
    pub fn new(order_index: usize, item_index: usize) -> Self {
        Self { order_index, item_index }
    }
}

/// Offer components paired with the consideration components they pay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fulfillment {
    pub offer_components: Vec<FulfillmentComponent>,
    pub consideration_components: Vec<FulfillmentComponent>,
}

impl Fulfillment {
    pub fn new(
        offer_components: Vec<FulfillmentComponent>,
        consideration_components: Vec<FulfillmentComponent>,
    ) -> Self {
        Self { offer_components, consideration_components }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
