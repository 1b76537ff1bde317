//! Engine configuration.
//!
//! The configuration names the settlement deployment (used for the signing
//! domain) and bounds per-call work. It can be built in code or loaded from
//! JSON; every field has a default.
//!
//! ```
//! use dark_settlement::config::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "chain_id": 10, "max_proof_length": 16 }"#).unwrap();
//! assert_eq!(config.chain_id, 10);
//! assert_eq!(config.name, "DarkSettlement");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SettlementError;
use crate::types::{Address, ZERO_WORD};

/// Default maximum criteria proof length (a tree of 2^32 identifiers)
pub const DEFAULT_MAX_PROOF_LENGTH: usize = 32;

/// Default maximum number of orders per batch call
pub const DEFAULT_MAX_ORDERS_PER_BATCH: usize = 256;

/// Settlement engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deployment name bound into the signing domain
    pub name: String,
    /// Deployment version bound into the signing domain
    pub version: String,
    pub chain_id: u64,
    /// Address of this settlement deployment (hex encoded in JSON)
    #[serde(with = "hex_address")]
    pub settlement_address: Address,
    pub max_proof_length: usize,
    pub max_orders_per_batch: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "DarkSettlement".to_string(),
            version: "1.0".to_string(),
            chain_id: 1,
            settlement_address: ZERO_WORD,
            max_proof_length: DEFAULT_MAX_PROOF_LENGTH,
            max_orders_per_batch: DEFAULT_MAX_ORDERS_PER_BATCH,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, SettlementError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| SettlementError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make every call fail
    pub fn validate(&self) -> Result<(), SettlementError> {
        if self.max_orders_per_batch == 0 {
            return Err(SettlementError::InvalidConfig(
                "max_orders_per_batch must be positive".to_string(),
            ));
        }
        if self.name.is_empty() {
            return Err(SettlementError::InvalidConfig("name must not be empty".to_string()));
        }
        Ok(())
    }
}

mod hex_address {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::Address;

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(address))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(text.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("address must be 32 bytes"))
    }
}
