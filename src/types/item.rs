//! Item types for offers, considerations and derived transfers.
//!
//! ## Item Kinds
//!
//! An item is tagged with one of six [`ItemType`]s. The two criteria-based
//! variants are capability markers: their `identifier_or_criteria` field
//! holds a Merkle root until a criteria resolver rewrites it to a concrete
//! identifier and the item becomes its plain sibling.
//!
//! ## Amounts
//!
//! Offer and consideration items carry a start and end amount. The effective
//! amount at a point in time is derived by [`crate::types::amount`]:
//! offer amounts round down, consideration amounts round up.

use serde::{Deserialize, Serialize};

use crate::types::primitives::{Address, Amount, Word};

// ============================================================================
// ItemType enum
// ============================================================================

/// Asset class of an item.
///
/// Represented as u8 for hashing:
/// - Native = 0
/// - Fungible = 1
/// - Unique = 2
/// - SemiFungible = 3
/// - UniqueWithCriteria = 4
/// - SemiFungibleWithCriteria = 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemType {
    /// Native currency of the host chain
    #[default]
    Native,
    /// Fungible token (identifier unused)
    Fungible,
    /// Unique token with a fixed identifier
    Unique,
    /// Semi-fungible token with a fixed identifier
    SemiFungible,
    /// Unique token whose identifier is chosen from a criteria set
    UniqueWithCriteria,
    /// Semi-fungible token whose identifier is chosen from a criteria set
    SemiFungibleWithCriteria,
}

impl ItemType {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            ItemType::Native => 0,
            ItemType::Fungible => 1,
            ItemType::Unique => 2,
            ItemType::SemiFungible => 3,
            ItemType::UniqueWithCriteria => 4,
            ItemType::SemiFungibleWithCriteria => 5,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ItemType::Native),
            1 => Some(ItemType::Fungible),
            2 => Some(ItemType::Unique),
            3 => Some(ItemType::SemiFungible),
            4 => Some(ItemType::UniqueWithCriteria),
            5 => Some(ItemType::SemiFungibleWithCriteria),
            _ => None,
        }
    }

    /// Whether `identifier_or_criteria` is a criteria root for this type
    pub fn is_criteria_based(self) -> bool {
        match self {
            ItemType::UniqueWithCriteria | ItemType::SemiFungibleWithCriteria => true,
            ItemType::Native
            | ItemType::Fungible
            | ItemType::Unique
            | ItemType::SemiFungible => false,
        }
    }

    /// The concrete item type a criteria-based type becomes once resolved.
    ///
    /// Non-criteria types are returned unchanged.
    pub fn resolved(self) -> Self {
        match self {
            ItemType::UniqueWithCriteria => ItemType::Unique,
            ItemType::SemiFungibleWithCriteria => ItemType::SemiFungible,
            other => other,
        }
    }
}

// ============================================================================
// ItemSide enum
// ============================================================================

/// Which list of an order an index points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemSide {
    /// The offer list
    #[default]
    Offer,
    /// The consideration list
    Consideration,
}

// ============================================================================
// Order items
// ============================================================================

/// An asset the offerer is willing to give up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OfferItem {
    pub item_type: ItemType,
    /// Token contract (ignored for native currency)
    pub token: Address,
    /// Concrete identifier, or Merkle root for criteria-based items
    pub identifier_or_criteria: Word,
    pub start_amount: Amount,
    pub end_amount: Amount,
}

impl OfferItem {
    /// Create an offer item with a constant amount
    pub fn new(item_type: ItemType, token: Address, identifier_or_criteria: Word, amount: Amount) -> Self {
        Self {
            item_type,
            token,
            identifier_or_criteria,
            start_amount: amount,
            end_amount: amount,
        }
    }

    /// Set a linearly changing amount (start -> end over the order window)
    pub fn with_amounts(mut self, start_amount: Amount, end_amount: Amount) -> Self {
        self.start_amount = start_amount;
        self.end_amount = end_amount;
        self
    }
}

/// An asset that must be delivered to `recipient` for the order to be valid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConsiderationItem {
    pub item_type: ItemType,
    pub token: Address,
    pub identifier_or_criteria: Word,
    pub start_amount: Amount,
    pub end_amount: Amount,
    pub recipient: Address,
}

impl ConsiderationItem {
    /// Create a consideration item with a constant amount
    pub fn new(
        item_type: ItemType,
        token: Address,
        identifier_or_criteria: Word,
        amount: Amount,
        recipient: Address,
    ) -> Self {
        Self {
            item_type,
            token,
            identifier_or_criteria,
            start_amount: amount,
            end_amount: amount,
            recipient,
        }
    }

    /// Set a linearly changing amount (start -> end over the order window)
    pub fn with_amounts(mut self, start_amount: Amount, end_amount: Amount) -> Self {
        self.start_amount = start_amount;
        self.end_amount = end_amount;
        self
    }
}

// ============================================================================
// Derived items
// ============================================================================

/// An offer item with its amount fixed for the current fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpentItem {
    pub item_type: ItemType,
    pub token: Address,
    pub identifier: Word,
    pub amount: Amount,
}

impl SpentItem {
    /// Turn this spent item into a received item delivered to `recipient`
    pub fn to_received(&self, recipient: Address) -> ReceivedItem {
        ReceivedItem {
            item_type: self.item_type,
            token: self.token,
            identifier: self.identifier,
            amount: self.amount,
            recipient,
        }
    }
}

/// A consideration item with its amount fixed for the current fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReceivedItem {
    pub item_type: ItemType,
    pub token: Address,
    pub identifier: Word,
    pub amount: Amount,
    pub recipient: Address,
}

impl ReceivedItem {
    /// Whether two items refer to the same asset (type, token, identifier)
    pub fn same_asset(&self, item_type: ItemType, token: &Address, identifier: &Word) -> bool {
        self.item_type == item_type && self.token == *token && self.identifier == *identifier
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
