//! Stellar Wallet Core Library
//!
//! Transaction core for a Stellar wallet.
//!
//! # Architecture
//!
//! This crate provides:
//! - **stellar**: StrKey, XDR, keypairs, assets and transaction types
//! - **wallet**: Key generation, address and parameter validation
//! - **tx**: Transaction building, Soroban preparation, signing, submission
//! - **memo**: Memo-required detection for exchange destinations
//! - **fees**: Recommended fee and congestion level
//! - **api**: Horizon and Soroban RPC clients
//! - **ffi**: C-ABI exports for mobile shells
//!
//! # FFI Usage
//!
//! All public FFI functions are in the `ffi` module and follow this pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `stellar_free_string`)
//!
//! # Security
//!
//! Secret seeds are held in `zeroize` wrappers and cleared when dropped.
//! The logger redacts secret keys from every field it prints.
//!
//! # Example
//!
//! ```rust,ignore
//! use stellar_wallet_core::api::HorizonClient;
//! use stellar_wallet_core::{tx, Network};
//!
//! let horizon = HorizonClient::for_network(&Network::Testnet.details(), 30)?;
//! let built = tx::build_payment_transaction(&horizon, &params)?;
//! let signed = tx::sign_transaction(&built.xdr, secret, Network::Testnet)?;
//! ```

pub mod api;
pub mod error;
pub mod ffi;
pub mod fees;
pub mod memo;
pub mod stellar;
pub mod tx;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use error::{ErrorCode, ValidationError, WalletError, WalletResult};
pub use types::*;

pub use wallet::{create_new_keypair, restore_from_secret, validate_address};

pub use ffi::{
    stellar_build_payment,
    stellar_build_swap,
    stellar_change_trust,
    stellar_check_memo,
    stellar_decode_transaction,
    stellar_free_string,
    stellar_generate_keypair,
    stellar_import_secret,
    stellar_network_fees,
    stellar_sign_transaction,
    stellar_submit_transaction,
    stellar_validate_address,
};
