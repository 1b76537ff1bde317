//! Primitive value types shared by every settlement structure.
//!
//! ## Representation
//!
//! Accounts, token contracts, identifiers, criteria roots and hashes are all
//! 32-byte words. Fixed-size byte arrays keep every structure SSZ-friendly
//! and make hashing byte-exact across platforms.
//!
//! An account doubles as its Ed25519 verifying key for externally owned
//! offerers; contract accounts are plain identifiers.
//!
//! ## Example
//!
//! ```
//! use dark_settlement::types::{identifier, identifier_to_u128};
//!
//! let id = identifier(5);
//! assert_eq!(id[31], 5);
//! assert_eq!(identifier_to_u128(&id), Some(5));
//! ```

/// A 32-byte word (token identifier, criteria root, salt, zone hash).
pub type Word = [u8; 32];

/// Account or contract address.
pub type Address = [u8; 32];

/// Key selecting the transfer path. All zeroes means direct transfer.
pub type ConduitKey = [u8; 32];

/// SHA-256 digest.
pub type Hash = [u8; 32];

/// Hash of an order's parameters bound to the offerer's counter.
pub type OrderHash = [u8; 32];

/// Token amounts. Wide enough for 18-decimal fungible tokens.
pub type Amount = u128;

/// The all-zero word.
pub const ZERO_WORD: Word = [0u8; 32];

/// Encode an integer identifier as a big-endian 32-byte word.
pub fn identifier(value: u128) -> Word {
    let mut word = ZERO_WORD;
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Decode a word back to an integer identifier.
///
/// Returns `None` if the upper 16 bytes are not zero.
pub fn identifier_to_u128(word: &Word) -> Option<u128> {
    if word[..16].iter().any(|b| *b != 0) {
        return None;
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Some(u128::from_be_bytes(low))
}

/// Encode an amount as a big-endian 32-byte word (used for hashing).
pub fn amount_word(amount: Amount) -> Word {
    identifier(amount)
}

/// Short hex rendering used in logs: first 4 bytes of the word.
pub fn short_hex(word: &Word) -> String {
    hex::encode(&word[..4])
}
