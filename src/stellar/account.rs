//! Account identities: G (ed25519) and M (muxed) addresses

use std::fmt;
use std::str::FromStr;

use super::strkey;
use super::xdr::{XdrCodec, XdrReader, XdrWriter};
use crate::error::{WalletError, WalletResult};

const PUBLIC_KEY_TYPE_ED25519: u32 = 0;
const KEY_TYPE_ED25519: u32 = 0;
const KEY_TYPE_MUXED_ED25519: u32 = 0x100;

/// Ed25519 account id (G...)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub fn from_address(address: &str) -> WalletResult<Self> {
        Ok(Self(strkey::decode_account(address)?))
    }

    pub fn address(&self) -> String {
        strkey::encode_account(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Signature hint: last four bytes of the key
    pub fn hint(&self) -> [u8; 4] {
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.0[28..]);
        hint
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.address())
    }
}

impl FromStr for AccountId {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

impl XdrCodec for AccountId {
    fn encode(&self, w: &mut XdrWriter) {
        w.u32(PUBLIC_KEY_TYPE_ED25519);
        w.fixed(&self.0);
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        match r.u32()? {
            PUBLIC_KEY_TYPE_ED25519 => Ok(Self(r.fixed::<32>()?)),
            t => Err(WalletError::xdr_error(format!("Unknown public key type {}", t))),
        }
    }
}

/// Transaction source or payment destination
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuxedAccount {
    Ed25519([u8; 32]),
    Muxed { id: u64, key: [u8; 32] },
}

impl MuxedAccount {
    /// Accepts G and M addresses
    pub fn from_address(address: &str) -> WalletResult<Self> {
        if address.starts_with('M') {
            let (key, id) = strkey::decode_muxed(address)?;
            Ok(MuxedAccount::Muxed { id, key })
        } else {
            Ok(MuxedAccount::Ed25519(strkey::decode_account(address)?))
        }
    }

    pub fn address(&self) -> String {
        match self {
            MuxedAccount::Ed25519(key) => strkey::encode_account(key),
            MuxedAccount::Muxed { id, key } => strkey::encode_muxed(key, *id),
        }
    }

    /// Underlying G account
    pub fn account_id(&self) -> AccountId {
        match self {
            MuxedAccount::Ed25519(key) | MuxedAccount::Muxed { key, .. } => AccountId(*key),
        }
    }

    pub fn is_muxed(&self) -> bool {
        matches!(self, MuxedAccount::Muxed { .. })
    }
}

impl From<AccountId> for MuxedAccount {
    fn from(account: AccountId) -> Self {
        MuxedAccount::Ed25519(account.0)
    }
}

impl fmt::Display for MuxedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

impl fmt::Debug for MuxedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MuxedAccount({})", self.address())
    }
}

impl FromStr for MuxedAccount {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

impl XdrCodec for MuxedAccount {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            MuxedAccount::Ed25519(key) => {
                w.u32(KEY_TYPE_ED25519);
                w.fixed(key);
            }
            MuxedAccount::Muxed { id, key } => {
                w.u32(KEY_TYPE_MUXED_ED25519);
                w.u64(*id);
                w.fixed(key);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        match r.u32()? {
            KEY_TYPE_ED25519 => Ok(MuxedAccount::Ed25519(r.fixed::<32>()?)),
            KEY_TYPE_MUXED_ED25519 => {
                let id = r.u64()?;
                let key = r.fixed::<32>()?;
                Ok(MuxedAccount::Muxed { id, key })
            }
            t => Err(WalletError::xdr_error(format!("Unknown muxed account type {}", t))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "GDMTVHLWJTHSUDMZVVMXXH6VJHA2ZV3HNG5LYNAZ6RTWB7GISM6PGTUV";

    #[test]
    fn test_muxed_resolves_to_base_account() {
        let base = AccountId::from_address(ADDRESS).unwrap();
        let muxed_address = strkey::encode_muxed(base.as_bytes(), 42);
        let muxed = MuxedAccount::from_address(&muxed_address).unwrap();

        assert!(muxed.is_muxed());
        assert_eq!(muxed.account_id(), base);
        assert_eq!(muxed.address(), muxed_address);
    }

    #[test]
    fn test_muxed_xdr_layout() {
        let base = AccountId::from_address(ADDRESS).unwrap();
        let muxed = MuxedAccount::Muxed { id: 7, key: base.0 };
        let bytes = muxed.to_xdr();
        assert_eq!(bytes.len(), 4 + 8 + 32);
        assert_eq!(&bytes[..4], &[0, 0, 1, 0]);
        assert_eq!(MuxedAccount::from_xdr(&bytes).unwrap(), muxed);
    }

    #[test]
    fn test_contract_address_is_not_an_account() {
        let contract = strkey::encode_contract(&[1u8; 32]);
        assert!(MuxedAccount::from_address(&contract).is_err());
    }
}
