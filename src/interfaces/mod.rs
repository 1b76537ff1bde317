// ============================================================================
// Interfaces Module
// Capabilities injected into the settlement engine
// ============================================================================

mod executor;
mod signature;
mod zone;

pub use executor::{RecordingExecutor, TransferExecutor};
pub use signature::{address_of, sign_digest, ContractAccount, Ed25519Verifier, SignatureVerifier};
pub use zone::{StaticZoneRegistry, Zone, ZoneDecision, ZoneRegistry, ZoneValidation};
