//! Ed25519 keypairs
//!
//! SECURITY: seeds are wrapped in `Zeroizing` and the dalek signing key is
//! zeroized on drop.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::account::AccountId;
use super::strkey;
use super::transaction::DecoratedSignature;
use crate::error::{ErrorCode, WalletError, WalletResult};

/// Generated key material for export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StellarKeys {
    pub public_key: String, // G... format
    pub secret_key: String, // S... format
}

pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Load from an S... secret seed
    pub fn from_secret(secret: &str) -> WalletResult<Self> {
        let seed = Zeroizing::new(strkey::decode_seed(secret.trim())?);
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    pub fn random() -> Self {
        let mut seed = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(seed.as_mut());
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn account_id(&self) -> AccountId {
        AccountId(self.signing_key.verifying_key().to_bytes())
    }

    pub fn public_key(&self) -> String {
        self.account_id().address()
    }

    pub fn secret(&self) -> Zeroizing<String> {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        Zeroizing::new(strkey::encode_seed(&seed))
    }

    pub fn export(&self) -> StellarKeys {
        StellarKeys {
            public_key: self.public_key(),
            secret_key: (*self.secret()).clone(),
        }
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Sign a transaction hash and attach this key's hint
    pub fn sign_decorated(&self, hash: &[u8; 32]) -> DecoratedSignature {
        DecoratedSignature::new(&self.account_id(), self.sign(hash))
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keypair({})", self.public_key())
    }
}

/// Verify an ed25519 signature made by `account`
pub fn verify(account: &AccountId, message: &[u8], signature: &[u8]) -> WalletResult<()> {
    let key = VerifyingKey::from_bytes(account.as_bytes())
        .map_err(|e| WalletError::crypto_error(format!("Invalid public key: {}", e)))?;
    let signature = Signature::from_slice(signature)
        .map_err(|e| WalletError::crypto_error(format!("Invalid signature: {}", e)))?;
    key.verify(message, &signature)
        .map_err(|_| WalletError::new(ErrorCode::SigningFailed, "Signature verification failed"))
}
