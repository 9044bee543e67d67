//! Classic Stellar assets

use std::fmt;

use super::account::AccountId;
use super::xdr::{XdrCodec, XdrReader, XdrWriter};
use crate::error::{WalletError, WalletResult};

const ASSET_TYPE_NATIVE: u32 = 0;
const ASSET_TYPE_CREDIT_ALPHANUM4: u32 = 1;
const ASSET_TYPE_CREDIT_ALPHANUM12: u32 = 2;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Asset {
    Native,
    CreditAlphanum4 { code: String, issuer: AccountId },
    CreditAlphanum12 { code: String, issuer: AccountId },
}

impl Asset {
    /// Issued asset; codes of 1-4 chars are alphanum4, 5-12 alphanum12
    pub fn credit(code: &str, issuer: &str) -> WalletResult<Self> {
        if code.is_empty() || code.len() > 12 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(WalletError::invalid_input(format!("Invalid asset code: {}", code)));
        }
        let issuer = AccountId::from_address(issuer)
            .map_err(|e| e.context("Invalid asset issuer"))?;

        if code.len() <= 4 {
            Ok(Asset::CreditAlphanum4 { code: code.to_string(), issuer })
        } else {
            Ok(Asset::CreditAlphanum12 { code: code.to_string(), issuer })
        }
    }

    /// Parse `"native"` or `"CODE:ISSUER"`
    pub fn from_identifier(identifier: &str) -> WalletResult<Self> {
        if identifier == "native" {
            return Ok(Asset::Native);
        }
        match identifier.split_once(':') {
            Some((code, issuer)) => Asset::credit(code, issuer),
            None => Err(WalletError::invalid_input(format!(
                "Invalid asset identifier: {}",
                identifier
            ))),
        }
    }

    /// `"native"` or `"CODE:ISSUER"`
    pub fn identifier(&self) -> String {
        match self {
            Asset::Native => "native".to_string(),
            Asset::CreditAlphanum4 { code, issuer } | Asset::CreditAlphanum12 { code, issuer } => {
                format!("{}:{}", code, issuer.address())
            }
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    pub fn code(&self) -> &str {
        match self {
            Asset::Native => "XLM",
            Asset::CreditAlphanum4 { code, .. } | Asset::CreditAlphanum12 { code, .. } => code,
        }
    }

    pub fn issuer(&self) -> Option<&AccountId> {
        match self {
            Asset::Native => None,
            Asset::CreditAlphanum4 { issuer, .. } | Asset::CreditAlphanum12 { issuer, .. } => {
                Some(issuer)
            }
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Asset({})", self.identifier())
    }
}

fn write_code<const N: usize>(w: &mut XdrWriter, code: &str) {
    let mut padded = [0u8; N];
    let bytes = code.as_bytes();
    let len = bytes.len().min(N);
    padded[..len].copy_from_slice(&bytes[..len]);
    w.fixed(&padded);
}

fn read_code<const N: usize>(r: &mut XdrReader<'_>) -> WalletResult<String> {
    let raw = r.fixed::<N>()?;
    let end = raw.iter().position(|b| *b == 0).unwrap_or(N);
    if raw[end..].iter().any(|b| *b != 0) || end == 0 {
        return Err(WalletError::xdr_error("Invalid asset code padding"));
    }
    let code = std::str::from_utf8(&raw[..end])
        .map_err(|_| WalletError::xdr_error("Invalid asset code"))?;
    Ok(code.to_string())
}

impl XdrCodec for Asset {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            Asset::Native => w.u32(ASSET_TYPE_NATIVE),
            Asset::CreditAlphanum4 { code, issuer } => {
                w.u32(ASSET_TYPE_CREDIT_ALPHANUM4);
                write_code::<4>(w, code);
                issuer.encode(w);
            }
            Asset::CreditAlphanum12 { code, issuer } => {
                w.u32(ASSET_TYPE_CREDIT_ALPHANUM12);
                write_code::<12>(w, code);
                issuer.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        match r.u32()? {
            ASSET_TYPE_NATIVE => Ok(Asset::Native),
            ASSET_TYPE_CREDIT_ALPHANUM4 => {
                let code = read_code::<4>(r)?;
                let issuer = AccountId::decode(r)?;
                Ok(Asset::CreditAlphanum4 { code, issuer })
            }
            ASSET_TYPE_CREDIT_ALPHANUM12 => {
                let code = read_code::<12>(r)?;
                let issuer = AccountId::decode(r)?;
                Ok(Asset::CreditAlphanum12 { code, issuer })
            }
            t => Err(WalletError::xdr_error(format!("Unsupported asset type {}", t))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";

    #[test]
    fn test_code_length_selects_variant() {
        assert!(matches!(Asset::credit("USDC", ISSUER).unwrap(), Asset::CreditAlphanum4 { .. }));
        assert!(matches!(Asset::credit("LONGCODE", ISSUER).unwrap(), Asset::CreditAlphanum12 { .. }));
        assert!(Asset::credit("", ISSUER).is_err());
        assert!(Asset::credit("THIRTEENCHARS", ISSUER).is_err());
        assert!(Asset::credit("US-D", ISSUER).is_err());
    }

    #[test]
    fn test_identifier_parsing() {
        assert_eq!(Asset::from_identifier("native").unwrap(), Asset::Native);
        let usdc = Asset::from_identifier(&format!("USDC:{}", ISSUER)).unwrap();
        assert_eq!(usdc.code(), "USDC");
        assert_eq!(usdc.identifier(), format!("USDC:{}", ISSUER));
        assert!(Asset::from_identifier("USDC").is_err());
    }

    #[test]
    fn test_alphanum4_xdr_is_zero_padded() {
        let asset = Asset::credit("AB", ISSUER).unwrap();
        let bytes = asset.to_xdr();
        assert_eq!(&bytes[4..8], b"AB\0\0");
        assert_eq!(Asset::from_xdr(&bytes).unwrap(), asset);
    }
}
