//! Transaction Module
//!
//! Handles transaction building, Soroban preparation, signing and
//! submission.

mod broadcaster;
mod builder;
mod session;
mod signer;
mod soroban;

pub use broadcaster::*;
pub use builder::*;
pub use session::*;
pub use signer::*;
pub use soroban::*;
