// ============================================================================
// Signature Verifier Interface
// Checks an offerer's authorization over an order's signing digest
// ============================================================================

use std::collections::BTreeMap;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use tracing::debug;

use crate::types::{short_hex, Address, Hash};

/// Verifies that `offerer` authorized the given signing digest.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, digest: &Hash, offerer: &Address, signature: &[u8]) -> bool;
}

/// Callback-style verification for offerers that are programmable accounts
/// rather than raw keys.
pub trait ContractAccount: Send + Sync {
    fn is_valid_signature(&self, digest: &Hash, signature: &[u8]) -> bool;
}

impl<F> ContractAccount for F
where
    F: Fn(&Hash, &[u8]) -> bool + Send + Sync,
{
    fn is_valid_signature(&self, digest: &Hash, signature: &[u8]) -> bool {
        self(digest, signature)
    }
}

/// Default verifier.
///
/// An offerer address is an Ed25519 verifying key and the signature is the
/// 64-byte Ed25519 signature over the digest. Offerers registered as
/// contract accounts are checked through their callback instead.
#[derive(Default)]
pub struct Ed25519Verifier {
    contracts: BTreeMap<Address, Box<dyn ContractAccount>>,
}

impl Ed25519Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route verification for `address` through a contract callback.
    pub fn register_contract(&mut self, address: Address, account: Box<dyn ContractAccount>) {
        self.contracts.insert(address, account);
    }

    fn verify_raw(digest: &Hash, offerer: &Address, signature: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(offerer) else {
            debug!(offerer = %short_hex(offerer), "offerer is not a valid verifying key");
            return false;
        };
        let Ok(bytes) = <[u8; 64]>::try_from(signature) else {
            return false;
        };
        verifying_key
            .verify(digest, &Signature::from_bytes(&bytes))
            .is_ok()
    }
}

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, digest: &Hash, offerer: &Address, signature: &[u8]) -> bool {
        match self.contracts.get(offerer) {
            Some(account) => account.is_valid_signature(digest, signature),
            None => Self::verify_raw(digest, offerer, signature),
        }
    }
}

/// Address of the offerer controlled by `signing_key`.
pub fn address_of(signing_key: &SigningKey) -> Address {
    signing_key.verifying_key().to_bytes()
}

/// Sign a digest the way [`Ed25519Verifier`] expects.
pub fn sign_digest(signing_key: &SigningKey, digest: &Hash) -> Vec<u8> {
    signing_key.sign(digest).to_bytes().to_vec()
}
