// ============================================================================
// Zone Interface
// External approval for restricted orders
// ============================================================================

use std::collections::BTreeMap;

use crate::types::{Address, OrderHash, ReceivedItem, SpentItem, Word};

/// Everything a zone sees when asked to approve a fill.
#[derive(Debug, Clone, Copy)]
pub struct ZoneValidation<'a> {
    pub order_hash: OrderHash,
    pub caller: Address,
    pub offerer: Address,
    /// Offer items with the amounts being filled
    pub offer: &'a [SpentItem],
    /// Consideration items with the amounts being filled
    pub consideration: &'a [ReceivedItem],
    pub zone_hash: Word,
    pub extra_data: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneDecision {
    Accept,
    Reject,
}

/// A zone's validation callback.
pub trait Zone: Send + Sync {
    fn validate_order(&self, validation: &ZoneValidation<'_>) -> ZoneDecision;
}

/// Looks up the zone deployed at an address.
pub trait ZoneRegistry: Send + Sync {
    fn zone(&self, address: &Address) -> Option<&dyn Zone>;
}

/// In-memory zone registry. Unknown addresses have no zone, so restricted
/// orders naming them are rejected.
#[derive(Default)]
pub struct StaticZoneRegistry {
    zones: BTreeMap<Address, Box<dyn Zone>>,
}

impl StaticZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, address: Address, zone: Box<dyn Zone>) {
        self.zones.insert(address, zone);
    }
}

impl ZoneRegistry for StaticZoneRegistry {
    fn zone(&self, address: &Address) -> Option<&dyn Zone> {
        self.zones.get(address).map(|zone| zone.as_ref())
    }
}
