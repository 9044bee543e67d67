//! Stellar Address Validation
//!
//! Classifies G (account), M (muxed) and C (contract) addresses and
//! resolves muxed addresses to their underlying account.

use serde::{Deserialize, Serialize};

use crate::stellar::{strkey, AccountId, MuxedAccount};

/// Address type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    /// Ed25519 account (G...)
    Account,
    /// Multiplexed account (M...)
    Muxed,
    /// Soroban contract (C...)
    Contract,
    Unknown,
}

/// Detailed address validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressValidation {
    pub is_valid: bool,
    pub address_type: AddressType,
    /// Underlying G account for G and M addresses
    pub base_account: Option<String>,
    pub muxed_id: Option<u64>,
}

impl AddressValidation {
    fn invalid() -> Self {
        Self {
            is_valid: false,
            address_type: AddressType::Unknown,
            base_account: None,
            muxed_id: None,
        }
    }
}

/// Validate address with detailed result
pub fn validate_address_detailed(address: &str) -> AddressValidation {
    let address = address.trim();
    match address.chars().next() {
        Some('G') => match AccountId::from_address(address) {
            Ok(account) => AddressValidation {
                is_valid: true,
                address_type: AddressType::Account,
                base_account: Some(account.address()),
                muxed_id: None,
            },
            Err(_) => AddressValidation::invalid(),
        },
        Some('M') => match strkey::decode_muxed(address) {
            Ok((key, id)) => AddressValidation {
                is_valid: true,
                address_type: AddressType::Muxed,
                base_account: Some(strkey::encode_account(&key)),
                muxed_id: Some(id),
            },
            Err(_) => AddressValidation::invalid(),
        },
        Some('C') => match strkey::decode_contract(address) {
            Ok(_) => AddressValidation {
                is_valid: true,
                address_type: AddressType::Contract,
                base_account: None,
                muxed_id: None,
            },
            Err(_) => AddressValidation::invalid(),
        },
        _ => AddressValidation::invalid(),
    }
}

/// Valid G, M or C address
pub fn is_valid_stellar_address(address: &str) -> bool {
    validate_address_detailed(address).is_valid
}

pub fn is_contract_address(address: &str) -> bool {
    validate_address_detailed(address).address_type == AddressType::Contract
}

pub fn is_muxed_address(address: &str) -> bool {
    validate_address_detailed(address).address_type == AddressType::Muxed
}

/// Base G account of a G or M address
pub fn base_account(address: &str) -> Option<String> {
    MuxedAccount::from_address(address.trim())
        .ok()
        .map(|account| account.account_id().address())
}

/// Same account, with muxed addresses resolved to their base account.
/// Contracts compare by address.
pub fn is_same_account(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    if a == b {
        return true;
    }
    match (base_account(a), base_account(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "GDMTVHLWJTHSUDMZVVMXXH6VJHA2ZV3HNG5LYNAZ6RTWB7GISM6PGTUV";
    const CONTRACT: &str = "CAS3J7GYLGXMF6TDJBBYYSE3HQ6BBSMLNUQ34T6TZMYMW2EVH34XOWMA";

    fn muxed(id: u64) -> String {
        strkey::encode_muxed(&strkey::decode_account(ACCOUNT).unwrap(), id)
    }

    #[test]
    fn test_address_types() {
        assert_eq!(validate_address_detailed(ACCOUNT).address_type, AddressType::Account);
        assert_eq!(validate_address_detailed(CONTRACT).address_type, AddressType::Contract);

        let detail = validate_address_detailed(&muxed(9));
        assert_eq!(detail.address_type, AddressType::Muxed);
        assert_eq!(detail.base_account.as_deref(), Some(ACCOUNT));
        assert_eq!(detail.muxed_id, Some(9));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_valid_stellar_address(""));
        assert!(!is_valid_stellar_address("not-an-address"));
        assert!(!is_valid_stellar_address(&ACCOUNT[..55]));
        assert!(!is_valid_stellar_address("0x742d35Cc6634C0532925a3b844Bc9e7595f8fE21"));
    }

    #[test]
    fn test_same_account_resolves_muxed() {
        assert!(is_same_account(ACCOUNT, &muxed(1)));
        assert!(is_same_account(&muxed(1), &muxed(2)));
        assert!(is_same_account(CONTRACT, CONTRACT));
        assert!(!is_same_account(ACCOUNT, CONTRACT));
    }
}
