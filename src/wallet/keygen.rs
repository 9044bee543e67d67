//! Key Generation
//!
//! Creates Stellar keypairs from OS randomness or an existing secret.
//!
//! SECURITY: seeds are zeroized on drop (see `stellar::keypair`).

use crate::error::WalletResult;
use crate::stellar::keypair::{Keypair, StellarKeys};

/// Create a new keypair from random entropy
pub fn generate_keypair() -> StellarKeys {
    Keypair::random().export()
}

/// Restore a keypair from an S... secret
pub fn import_secret(secret: &str) -> WalletResult<StellarKeys> {
    Ok(Keypair::from_secret(secret)?.export())
}
