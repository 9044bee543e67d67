//! StrKey encoding
//!
//! Base32 (no padding) over `version || payload || crc16-xmodem (LE)`.

use data_encoding::BASE32_NOPAD;

use crate::error::{ErrorCode, WalletError, WalletResult};

/// StrKey version bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrKeyVersion {
    /// G...
    Account,
    /// M...
    Muxed,
    /// S...
    Seed,
    /// C...
    Contract,
}

impl StrKeyVersion {
    pub fn byte(&self) -> u8 {
        match self {
            StrKeyVersion::Account => 6 << 3,
            StrKeyVersion::Muxed => 12 << 3,
            StrKeyVersion::Seed => 18 << 3,
            StrKeyVersion::Contract => 2 << 3,
        }
    }

    fn payload_len(&self) -> usize {
        match self {
            StrKeyVersion::Muxed => 40,
            _ => 32,
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            StrKeyVersion::Seed => ErrorCode::InvalidSecretKey,
            _ => ErrorCode::InvalidAddress,
        }
    }
}

/// Encode a payload with the given version byte
pub fn encode(version: StrKeyVersion, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 3);
    data.push(version.byte());
    data.extend_from_slice(payload);

    let checksum = crc16_xmodem(&data);
    data.extend_from_slice(&checksum.to_le_bytes());

    BASE32_NOPAD.encode(&data)
}

/// Decode and verify a StrKey, returning its payload
pub fn decode(version: StrKeyVersion, encoded: &str) -> WalletResult<Vec<u8>> {
    let invalid = |msg: &str| WalletError::new(version.error_code(), msg.to_string());

    let data = BASE32_NOPAD
        .decode(encoded.as_bytes())
        .map_err(|_| invalid("Invalid base32 encoding"))?;

    if data.len() != version.payload_len() + 3 {
        return Err(invalid("Invalid key length"));
    }
    if data[0] != version.byte() {
        return Err(invalid("Invalid version byte"));
    }

    let (body, checksum) = data.split_at(data.len() - 2);
    let expected = crc16_xmodem(body).to_le_bytes();
    if checksum != expected {
        return Err(invalid("Invalid checksum"));
    }

    // Reject encodings with non-zero trailing bits or lowercase input
    if BASE32_NOPAD.encode(&data) != encoded {
        return Err(invalid("Non-canonical encoding"));
    }

    Ok(body[1..].to_vec())
}

pub fn encode_account(public_key: &[u8; 32]) -> String {
    encode(StrKeyVersion::Account, public_key)
}

pub fn decode_account(address: &str) -> WalletResult<[u8; 32]> {
    to_array(decode(StrKeyVersion::Account, address)?)
}

pub fn encode_seed(seed: &[u8; 32]) -> String {
    encode(StrKeyVersion::Seed, seed)
}

pub fn decode_seed(secret: &str) -> WalletResult<[u8; 32]> {
    to_array(decode(StrKeyVersion::Seed, secret)?)
}

pub fn encode_contract(contract_id: &[u8; 32]) -> String {
    encode(StrKeyVersion::Contract, contract_id)
}

pub fn decode_contract(contract: &str) -> WalletResult<[u8; 32]> {
    to_array(decode(StrKeyVersion::Contract, contract)?)
}

/// Muxed payload is the ed25519 key followed by the big-endian id
pub fn encode_muxed(public_key: &[u8; 32], id: u64) -> String {
    let mut payload = [0u8; 40];
    payload[..32].copy_from_slice(public_key);
    payload[32..].copy_from_slice(&id.to_be_bytes());
    encode(StrKeyVersion::Muxed, &payload)
}

pub fn decode_muxed(address: &str) -> WalletResult<([u8; 32], u64)> {
    let payload = decode(StrKeyVersion::Muxed, address)?;
    let mut key = [0u8; 32];
    key.copy_from_slice(&payload[..32]);
    let mut id = [0u8; 8];
    id.copy_from_slice(&payload[32..]);
    Ok((key, u64::from_be_bytes(id)))
}

fn to_array(bytes: Vec<u8>) -> WalletResult<[u8; 32]> {
    bytes
        .try_into()
        .map_err(|_| WalletError::invalid_address("Invalid key length"))
}

/// CRC16-XModem checksum
pub(crate) fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for byte in data {
        crc ^= (*byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
