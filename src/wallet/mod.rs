//! Wallet Module
//!
//! Handles key generation, address validation and transaction parameter
//! validation.

mod address_validation;
mod keygen;
mod validation;

pub use address_validation::*;
pub use keygen::*;
pub use validation::*;

use crate::error::WalletResult;
use crate::stellar::keypair::StellarKeys;

/// Create a new random keypair
pub fn create_new_keypair() -> StellarKeys {
    keygen::generate_keypair()
}

/// Restore the public key for an S... secret
pub fn restore_from_secret(secret: &str) -> WalletResult<StellarKeys> {
    keygen::import_secret(secret)
}

/// Validate a Stellar address
/// Returns (is_valid, trimmed_address)
pub fn validate_address(address: &str) -> (bool, Option<String>) {
    let detail = address_validation::validate_address_detailed(address);
    (detail.is_valid, detail.is_valid.then(|| address.trim().to_string()))
}
