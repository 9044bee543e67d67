//! Soroban contract values (ScVal) and addresses

use std::fmt;

use super::account::AccountId;
use super::strkey;
use super::xdr::{XdrCodec, XdrReader, XdrWriter};
use crate::error::{WalletError, WalletResult};

/// Soroban symbols are at most 32 bytes
pub const MAX_SYMBOL_LEN: u32 = 32;

const SC_ADDRESS_TYPE_ACCOUNT: u32 = 0;
const SC_ADDRESS_TYPE_CONTRACT: u32 = 1;
const SC_ADDRESS_TYPE_MUXED_ACCOUNT: u32 = 2;
const SC_ADDRESS_TYPE_CLAIMABLE_BALANCE: u32 = 3;
const SC_ADDRESS_TYPE_LIQUIDITY_POOL: u32 = 4;

/// Contract call address
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScAddress {
    Account(AccountId),
    Contract([u8; 32]),
    MuxedAccount { id: u64, key: [u8; 32] },
    ClaimableBalance([u8; 32]),
    LiquidityPool([u8; 32]),
}

impl ScAddress {
    /// Accepts G, M and C addresses
    pub fn from_address(address: &str) -> WalletResult<Self> {
        match address.chars().next() {
            Some('G') => Ok(ScAddress::Account(AccountId::from_address(address)?)),
            Some('C') => Ok(ScAddress::Contract(strkey::decode_contract(address)?)),
            Some('M') => {
                let (key, id) = strkey::decode_muxed(address)?;
                Ok(ScAddress::MuxedAccount { id, key })
            }
            _ => Err(WalletError::invalid_address(format!(
                "Unsupported contract address: {}",
                address
            ))),
        }
    }

    pub fn address(&self) -> String {
        match self {
            ScAddress::Account(account) => account.address(),
            ScAddress::Contract(id) => strkey::encode_contract(id),
            ScAddress::MuxedAccount { id, key } => strkey::encode_muxed(key, *id),
            ScAddress::ClaimableBalance(id) => format!("claimable:{}", hex::encode(id)),
            ScAddress::LiquidityPool(id) => format!("pool:{}", hex::encode(id)),
        }
    }

    pub fn contract_id(&self) -> Option<&[u8; 32]> {
        match self {
            ScAddress::Contract(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Debug for ScAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScAddress({})", self.address())
    }
}

impl XdrCodec for ScAddress {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            ScAddress::Account(account) => {
                w.u32(SC_ADDRESS_TYPE_ACCOUNT);
                account.encode(w);
            }
            ScAddress::Contract(id) => {
                w.u32(SC_ADDRESS_TYPE_CONTRACT);
                w.fixed(id);
            }
            ScAddress::MuxedAccount { id, key } => {
                w.u32(SC_ADDRESS_TYPE_MUXED_ACCOUNT);
                w.u64(*id);
                w.fixed(key);
            }
            ScAddress::ClaimableBalance(id) => {
                w.u32(SC_ADDRESS_TYPE_CLAIMABLE_BALANCE);
                // CLAIMABLE_BALANCE_ID_TYPE_V0
                w.u32(0);
                w.fixed(id);
            }
            ScAddress::LiquidityPool(id) => {
                w.u32(SC_ADDRESS_TYPE_LIQUIDITY_POOL);
                w.fixed(id);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        match r.u32()? {
            SC_ADDRESS_TYPE_ACCOUNT => Ok(ScAddress::Account(AccountId::decode(r)?)),
            SC_ADDRESS_TYPE_CONTRACT => Ok(ScAddress::Contract(r.fixed::<32>()?)),
            SC_ADDRESS_TYPE_MUXED_ACCOUNT => {
                let id = r.u64()?;
                let key = r.fixed::<32>()?;
                Ok(ScAddress::MuxedAccount { id, key })
            }
            SC_ADDRESS_TYPE_CLAIMABLE_BALANCE => match r.u32()? {
                0 => Ok(ScAddress::ClaimableBalance(r.fixed::<32>()?)),
                t => Err(WalletError::xdr_error(format!("Unknown claimable balance id type {}", t))),
            },
            SC_ADDRESS_TYPE_LIQUIDITY_POOL => Ok(ScAddress::LiquidityPool(r.fixed::<32>()?)),
            t => Err(WalletError::xdr_error(format!("Unknown ScAddress type {}", t))),
        }
    }
}

/// Contract error: type discriminant and code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScError {
    pub error_type: u32,
    pub code: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractExecutable {
    Wasm([u8; 32]),
    StellarAsset,
}

impl XdrCodec for ContractExecutable {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            ContractExecutable::Wasm(hash) => {
                w.u32(0);
                w.fixed(hash);
            }
            ContractExecutable::StellarAsset => w.u32(1),
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        match r.u32()? {
            0 => Ok(ContractExecutable::Wasm(r.fixed::<32>()?)),
            1 => Ok(ContractExecutable::StellarAsset),
            t => Err(WalletError::xdr_error(format!("Unknown contract executable {}", t))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScMapEntry {
    pub key: ScVal,
    pub val: ScVal,
}

impl XdrCodec for ScMapEntry {
    fn encode(&self, w: &mut XdrWriter) {
        self.key.encode(w);
        self.val.encode(w);
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        Ok(Self {
            key: ScVal::decode(r)?,
            val: ScVal::decode(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScContractInstance {
    pub executable: ContractExecutable,
    pub storage: Option<Vec<ScMapEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScVal {
    Bool(bool),
    Void,
    Error(ScError),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Timepoint(u64),
    Duration(u64),
    U128(u128),
    I128(i128),
    /// Big-endian 256-bit value
    U256([u8; 32]),
    I256([u8; 32]),
    Bytes(Vec<u8>),
    String(String),
    Symbol(String),
    Vec(Option<Vec<ScVal>>),
    Map(Option<Vec<ScMapEntry>>),
    Address(ScAddress),
    ContractInstance(ScContractInstance),
    LedgerKeyContractInstance,
    LedgerKeyNonce(i64),
}

impl ScVal {
    pub fn symbol(name: &str) -> WalletResult<Self> {
        if name.len() > MAX_SYMBOL_LEN as usize
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(WalletError::invalid_input(format!("Invalid symbol: {}", name)));
        }
        Ok(ScVal::Symbol(name.to_string()))
    }

    pub fn address(address: &str) -> WalletResult<Self> {
        Ok(ScVal::Address(ScAddress::from_address(address)?))
    }

    fn discriminant(&self) -> u32 {
        match self {
            ScVal::Bool(_) => 0,
            ScVal::Void => 1,
            ScVal::Error(_) => 2,
            ScVal::U32(_) => 3,
            ScVal::I32(_) => 4,
            ScVal::U64(_) => 5,
            ScVal::I64(_) => 6,
            ScVal::Timepoint(_) => 7,
            ScVal::Duration(_) => 8,
            ScVal::U128(_) => 9,
            ScVal::I128(_) => 10,
            ScVal::U256(_) => 11,
            ScVal::I256(_) => 12,
            ScVal::Bytes(_) => 13,
            ScVal::String(_) => 14,
            ScVal::Symbol(_) => 15,
            ScVal::Vec(_) => 16,
            ScVal::Map(_) => 17,
            ScVal::Address(_) => 18,
            ScVal::ContractInstance(_) => 19,
            ScVal::LedgerKeyContractInstance => 20,
            ScVal::LedgerKeyNonce(_) => 21,
        }
    }
}

impl XdrCodec for ScVal {
    fn encode(&self, w: &mut XdrWriter) {
        w.u32(self.discriminant());
        match self {
            ScVal::Bool(b) => w.bool(*b),
            ScVal::Void | ScVal::LedgerKeyContractInstance => {}
            ScVal::Error(e) => {
                w.u32(e.error_type);
                w.u32(e.code);
            }
            ScVal::U32(v) => w.u32(*v),
            ScVal::I32(v) => w.i32(*v),
            ScVal::U64(v) | ScVal::Timepoint(v) | ScVal::Duration(v) => w.u64(*v),
            ScVal::I64(v) | ScVal::LedgerKeyNonce(v) => w.i64(*v),
            ScVal::U128(v) => {
                w.u64((*v >> 64) as u64);
                w.u64(*v as u64);
            }
            ScVal::I128(v) => {
                w.i64((*v >> 64) as i64);
                w.u64(*v as u64);
            }
            ScVal::U256(bytes) | ScVal::I256(bytes) => w.fixed(bytes),
            ScVal::Bytes(bytes) => w.var(bytes),
            ScVal::String(s) | ScVal::Symbol(s) => w.var(s.as_bytes()),
            ScVal::Vec(items) => w.option(items.as_ref(), |w, items| w.array(items)),
            ScVal::Map(entries) => w.option(entries.as_ref(), |w, entries| w.array(entries)),
            ScVal::Address(address) => address.encode(w),
            ScVal::ContractInstance(instance) => {
                instance.executable.encode(w);
                w.option(instance.storage.as_ref(), |w, entries| w.array(entries));
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        let tag = r.u32()?;
        let value = match tag {
            0 => ScVal::Bool(r.bool()?),
            1 => ScVal::Void,
            2 => ScVal::Error(ScError {
                error_type: r.u32()?,
                code: r.u32()?,
            }),
            3 => ScVal::U32(r.u32()?),
            4 => ScVal::I32(r.i32()?),
            5 => ScVal::U64(r.u64()?),
            6 => ScVal::I64(r.i64()?),
            7 => ScVal::Timepoint(r.u64()?),
            8 => ScVal::Duration(r.u64()?),
            9 => {
                let hi = r.u64()? as u128;
                let lo = r.u64()? as u128;
                ScVal::U128((hi << 64) | lo)
            }
            10 => {
                let hi = r.i64()? as i128;
                let lo = r.u64()? as i128;
                ScVal::I128((hi << 64) | lo)
            }
            11 => ScVal::U256(r.fixed::<32>()?),
            12 => ScVal::I256(r.fixed::<32>()?),
            13 => ScVal::Bytes(r.var(u32::MAX)?),
            14 => ScVal::String(r.string(u32::MAX)?),
            15 => ScVal::Symbol(r.string(MAX_SYMBOL_LEN)?),
            16 | 17 | 19 => {
                r.enter()?;
                let value = match tag {
                    16 => ScVal::Vec(r.option(|r| r.array(u32::MAX))?),
                    17 => ScVal::Map(r.option(|r| r.array(u32::MAX))?),
                    _ => ScVal::ContractInstance(ScContractInstance {
                        executable: ContractExecutable::decode(r)?,
                        storage: r.option(|r| r.array(u32::MAX))?,
                    }),
                };
                r.leave();
                value
            }
            18 => ScVal::Address(ScAddress::decode(r)?),
            20 => ScVal::LedgerKeyContractInstance,
            21 => ScVal::LedgerKeyNonce(r.i64()?),
            t => return Err(WalletError::xdr_error(format!("Unknown ScVal type {}", t))),
        };
        Ok(value)
    }
}
