//! Soroban host functions, authorization entries and transaction data
//!
//! Contract invocations are fully structured. Everything else is
//! validated by walking its XDR and kept as the raw bytes, which is all a
//! wallet needs to forward simulation output into a signed envelope.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::account::AccountId;
use super::asset::Asset;
use super::scval::{ContractExecutable, ScAddress, ScVal, MAX_SYMBOL_LEN};
use super::xdr::{XdrCodec, XdrReader, XdrWriter};
use crate::error::{WalletError, WalletResult};

const HOST_FUNCTION_TYPE_INVOKE_CONTRACT: u32 = 0;
const HOST_FUNCTION_TYPE_CREATE_CONTRACT: u32 = 1;
const HOST_FUNCTION_TYPE_UPLOAD_CONTRACT_WASM: u32 = 2;
const HOST_FUNCTION_TYPE_CREATE_CONTRACT_V2: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeContractArgs {
    pub contract_address: ScAddress,
    pub function_name: String,
    pub args: Vec<ScVal>,
}

impl XdrCodec for InvokeContractArgs {
    fn encode(&self, w: &mut XdrWriter) {
        self.contract_address.encode(w);
        w.var(self.function_name.as_bytes());
        w.array(&self.args);
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        Ok(Self {
            contract_address: ScAddress::decode(r)?,
            function_name: r.string(MAX_SYMBOL_LEN)?,
            args: r.array(u32::MAX)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostFunction {
    InvokeContract(InvokeContractArgs),
    /// Create/upload host functions, raw XDR including the discriminant
    Other(Vec<u8>),
}

impl HostFunction {
    pub fn invoke_args(&self) -> Option<&InvokeContractArgs> {
        match self {
            HostFunction::InvokeContract(args) => Some(args),
            HostFunction::Other(_) => None,
        }
    }
}

impl XdrCodec for HostFunction {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            HostFunction::InvokeContract(args) => {
                w.u32(HOST_FUNCTION_TYPE_INVOKE_CONTRACT);
                args.encode(w);
            }
            HostFunction::Other(raw) => w.raw(raw),
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        let start = r.position();
        match r.u32()? {
            HOST_FUNCTION_TYPE_INVOKE_CONTRACT => {
                Ok(HostFunction::InvokeContract(InvokeContractArgs::decode(r)?))
            }
            HOST_FUNCTION_TYPE_CREATE_CONTRACT => {
                skip_create_contract_args(r, false)?;
                Ok(HostFunction::Other(r.slice_from(start).to_vec()))
            }
            HOST_FUNCTION_TYPE_UPLOAD_CONTRACT_WASM => {
                r.var(u32::MAX)?;
                Ok(HostFunction::Other(r.slice_from(start).to_vec()))
            }
            HOST_FUNCTION_TYPE_CREATE_CONTRACT_V2 => {
                skip_create_contract_args(r, true)?;
                Ok(HostFunction::Other(r.slice_from(start).to_vec()))
            }
            t => Err(WalletError::xdr_error(format!("Unknown host function type {}", t))),
        }
    }
}

fn skip_contract_id_preimage(r: &mut XdrReader<'_>) -> WalletResult<()> {
    match r.u32()? {
        // FROM_ADDRESS
        0 => {
            ScAddress::decode(r)?;
            r.fixed::<32>()?;
        }
        // FROM_ASSET
        1 => {
            Asset::decode(r)?;
        }
        t => return Err(WalletError::xdr_error(format!("Unknown contract id preimage {}", t))),
    }
    Ok(())
}

fn skip_create_contract_args(r: &mut XdrReader<'_>, v2: bool) -> WalletResult<()> {
    skip_contract_id_preimage(r)?;
    ContractExecutable::decode(r)?;
    if v2 {
        r.array::<ScVal>(u32::MAX)?;
    }
    Ok(())
}

fn skip_authorized_invocation(r: &mut XdrReader<'_>) -> WalletResult<()> {
    r.enter()?;
    match r.u32()? {
        0 => {
            InvokeContractArgs::decode(r)?;
        }
        1 => skip_create_contract_args(r, false)?,
        2 => skip_create_contract_args(r, true)?,
        t => return Err(WalletError::xdr_error(format!("Unknown authorized function {}", t))),
    }
    let subs = r.array_len(u32::MAX)?;
    for _ in 0..subs {
        skip_authorized_invocation(r)?;
    }
    r.leave();
    Ok(())
}

/// `SorobanAuthorizationEntry`, kept as raw XDR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SorobanAuthEntry(pub Vec<u8>);

impl SorobanAuthEntry {
    pub fn from_base64(encoded: &str) -> WalletResult<Self> {
        Self::from_xdr_base64(encoded).map_err(|e| e.context("Invalid authorization entry"))
    }

    /// True when the entry is authorized by the transaction source
    pub fn is_source_account_credentials(&self) -> bool {
        self.0.get(..4) == Some(&[0, 0, 0, 0])
    }
}

impl XdrCodec for SorobanAuthEntry {
    fn encode(&self, w: &mut XdrWriter) {
        w.raw(&self.0);
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        let start = r.position();
        match r.u32()? {
            // SOURCE_ACCOUNT
            0 => {}
            // ADDRESS
            1 => {
                ScAddress::decode(r)?;
                r.i64()?;
                r.u32()?;
                ScVal::decode(r)?;
            }
            t => return Err(WalletError::xdr_error(format!("Unknown credentials type {}", t))),
        }
        skip_authorized_invocation(r)?;
        Ok(Self(r.slice_from(start).to_vec()))
    }
}

fn skip_ledger_key(r: &mut XdrReader<'_>) -> WalletResult<()> {
    match r.u32()? {
        // ACCOUNT
        0 => {
            AccountId::decode(r)?;
        }
        // TRUSTLINE
        1 => {
            AccountId::decode(r)?;
            // TrustLineAsset arms 0-2 share the Asset layout
            match r.u32()? {
                0 => {}
                1 => {
                    r.fixed::<4>()?;
                    AccountId::decode(r)?;
                }
                2 => {
                    r.fixed::<12>()?;
                    AccountId::decode(r)?;
                }
                3 => {
                    r.fixed::<32>()?;
                }
                t => return Err(WalletError::xdr_error(format!("Unknown trustline asset {}", t))),
            }
        }
        // OFFER
        2 => {
            AccountId::decode(r)?;
            r.i64()?;
        }
        // DATA
        3 => {
            AccountId::decode(r)?;
            r.string(64)?;
        }
        // CLAIMABLE_BALANCE
        4 => match r.u32()? {
            0 => {
                r.fixed::<32>()?;
            }
            t => return Err(WalletError::xdr_error(format!("Unknown claimable balance id type {}", t))),
        },
        // LIQUIDITY_POOL, CONTRACT_CODE, TTL
        5 | 7 | 9 => {
            r.fixed::<32>()?;
        }
        // CONTRACT_DATA
        6 => {
            ScAddress::decode(r)?;
            ScVal::decode(r)?;
            r.u32()?;
        }
        // CONFIG_SETTING
        8 => {
            r.i32()?;
        }
        t => return Err(WalletError::xdr_error(format!("Unknown ledger key type {}", t))),
    }
    Ok(())
}

/// `SorobanTransactionData` from simulation, kept as raw XDR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SorobanTransactionData {
    raw: Vec<u8>,
    resource_fee: i64,
}

impl SorobanTransactionData {
    pub fn from_base64(encoded: &str) -> WalletResult<Self> {
        Self::from_xdr_base64(encoded).map_err(|e| e.context("Invalid transaction data"))
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.raw)
    }

    /// Stroops reserved for Soroban resources
    pub fn resource_fee(&self) -> i64 {
        self.resource_fee
    }
}

impl XdrCodec for SorobanTransactionData {
    fn encode(&self, w: &mut XdrWriter) {
        w.raw(&self.raw);
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        let start = r.position();
        match r.u32()? {
            0 => {}
            1 => {
                r.array::<u32>(u32::MAX)?;
            }
            t => return Err(WalletError::xdr_error(format!("Unknown transaction data ext {}", t))),
        }
        // Footprint: read-only then read-write keys
        for _ in 0..2 {
            let keys = r.array_len(u32::MAX)?;
            for _ in 0..keys {
                skip_ledger_key(r)?;
            }
        }
        // instructions, disk read bytes, write bytes
        for _ in 0..3 {
            r.u32()?;
        }
        let resource_fee = r.i64()?;
        if resource_fee < 0 {
            return Err(WalletError::xdr_error("Negative resource fee"));
        }
        Ok(Self {
            raw: r.slice_from(start).to_vec(),
            resource_fee,
        })
    }
}
