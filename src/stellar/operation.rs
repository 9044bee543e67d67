//! Transaction operations supported by the wallet

use super::account::{AccountId, MuxedAccount};
use super::asset::Asset;
use super::invocation::{HostFunction, InvokeContractArgs, SorobanAuthEntry};
use super::xdr::{XdrCodec, XdrReader, XdrWriter};
use crate::error::{WalletError, WalletResult};

const CREATE_ACCOUNT: u32 = 0;
const PAYMENT: u32 = 1;
const PATH_PAYMENT_STRICT_RECEIVE: u32 = 2;
const CHANGE_TRUST: u32 = 6;
const ACCOUNT_MERGE: u32 = 8;
const MANAGE_DATA: u32 = 10;
const BUMP_SEQUENCE: u32 = 11;
const PATH_PAYMENT_STRICT_SEND: u32 = 13;
const INVOKE_HOST_FUNCTION: u32 = 24;

/// Path payments allow at most five intermediate assets
pub const MAX_PATH_LEN: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationBody {
    CreateAccount {
        destination: AccountId,
        starting_balance: i64,
    },
    Payment {
        destination: MuxedAccount,
        asset: Asset,
        amount: i64,
    },
    PathPaymentStrictReceive {
        send_asset: Asset,
        send_max: i64,
        destination: MuxedAccount,
        dest_asset: Asset,
        dest_amount: i64,
        path: Vec<Asset>,
    },
    ChangeTrust {
        line: Asset,
        limit: i64,
    },
    AccountMerge(MuxedAccount),
    ManageData {
        name: String,
        value: Option<Vec<u8>>,
    },
    BumpSequence {
        bump_to: i64,
    },
    PathPaymentStrictSend {
        send_asset: Asset,
        send_amount: i64,
        destination: MuxedAccount,
        dest_asset: Asset,
        dest_min: i64,
        path: Vec<Asset>,
    },
    InvokeHostFunction {
        host_function: HostFunction,
        auth: Vec<SorobanAuthEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub source_account: Option<MuxedAccount>,
    pub body: OperationBody,
}

impl Operation {
    pub fn new(body: OperationBody) -> Self {
        Self {
            source_account: None,
            body,
        }
    }

    pub fn create_account(destination: AccountId, starting_balance: i64) -> Self {
        Self::new(OperationBody::CreateAccount {
            destination,
            starting_balance,
        })
    }

    pub fn payment(destination: MuxedAccount, asset: Asset, amount: i64) -> Self {
        Self::new(OperationBody::Payment {
            destination,
            asset,
            amount,
        })
    }

    pub fn path_payment_strict_send(
        send_asset: Asset,
        send_amount: i64,
        destination: MuxedAccount,
        dest_asset: Asset,
        dest_min: i64,
        path: Vec<Asset>,
    ) -> Self {
        Self::new(OperationBody::PathPaymentStrictSend {
            send_asset,
            send_amount,
            destination,
            dest_asset,
            dest_min,
            path,
        })
    }

    pub fn change_trust(line: Asset, limit: i64) -> Self {
        Self::new(OperationBody::ChangeTrust { line, limit })
    }

    pub fn invoke_contract(args: InvokeContractArgs) -> Self {
        Self::new(OperationBody::InvokeHostFunction {
            host_function: HostFunction::InvokeContract(args),
            auth: Vec::new(),
        })
    }

    /// Account receiving funds, if the operation has one
    pub fn destination(&self) -> Option<MuxedAccount> {
        match &self.body {
            OperationBody::CreateAccount { destination, .. } => Some((*destination).into()),
            OperationBody::Payment { destination, .. }
            | OperationBody::PathPaymentStrictReceive { destination, .. }
            | OperationBody::PathPaymentStrictSend { destination, .. }
            | OperationBody::AccountMerge(destination) => Some(*destination),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.body {
            OperationBody::CreateAccount { .. } => "create_account",
            OperationBody::Payment { .. } => "payment",
            OperationBody::PathPaymentStrictReceive { .. } => "path_payment_strict_receive",
            OperationBody::ChangeTrust { .. } => "change_trust",
            OperationBody::AccountMerge(_) => "account_merge",
            OperationBody::ManageData { .. } => "manage_data",
            OperationBody::BumpSequence { .. } => "bump_sequence",
            OperationBody::PathPaymentStrictSend { .. } => "path_payment_strict_send",
            OperationBody::InvokeHostFunction { .. } => "invoke_host_function",
        }
    }
}

impl XdrCodec for Operation {
    fn encode(&self, w: &mut XdrWriter) {
        w.option(self.source_account.as_ref(), |w, source| source.encode(w));
        match &self.body {
            OperationBody::CreateAccount {
                destination,
                starting_balance,
            } => {
                w.u32(CREATE_ACCOUNT);
                destination.encode(w);
                w.i64(*starting_balance);
            }
            OperationBody::Payment {
                destination,
                asset,
                amount,
            } => {
                w.u32(PAYMENT);
                destination.encode(w);
                asset.encode(w);
                w.i64(*amount);
            }
            OperationBody::PathPaymentStrictReceive {
                send_asset,
                send_max,
                destination,
                dest_asset,
                dest_amount,
                path,
            } => {
                w.u32(PATH_PAYMENT_STRICT_RECEIVE);
                send_asset.encode(w);
                w.i64(*send_max);
                destination.encode(w);
                dest_asset.encode(w);
                w.i64(*dest_amount);
                w.array(path);
            }
            OperationBody::ChangeTrust { line, limit } => {
                w.u32(CHANGE_TRUST);
                line.encode(w);
                w.i64(*limit);
            }
            OperationBody::AccountMerge(destination) => {
                w.u32(ACCOUNT_MERGE);
                destination.encode(w);
            }
            OperationBody::ManageData { name, value } => {
                w.u32(MANAGE_DATA);
                w.var(name.as_bytes());
                w.option(value.as_ref(), |w, value| w.var(value));
            }
            OperationBody::BumpSequence { bump_to } => {
                w.u32(BUMP_SEQUENCE);
                w.i64(*bump_to);
            }
            OperationBody::PathPaymentStrictSend {
                send_asset,
                send_amount,
                destination,
                dest_asset,
                dest_min,
                path,
            } => {
                w.u32(PATH_PAYMENT_STRICT_SEND);
                send_asset.encode(w);
                w.i64(*send_amount);
                destination.encode(w);
                dest_asset.encode(w);
                w.i64(*dest_min);
                w.array(path);
            }
            OperationBody::InvokeHostFunction {
                host_function,
                auth,
            } => {
                w.u32(INVOKE_HOST_FUNCTION);
                host_function.encode(w);
                w.array(auth);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        let source_account = r.option(MuxedAccount::decode)?;
        let body = match r.u32()? {
            CREATE_ACCOUNT => OperationBody::CreateAccount {
                destination: AccountId::decode(r)?,
                starting_balance: r.i64()?,
            },
            PAYMENT => OperationBody::Payment {
                destination: MuxedAccount::decode(r)?,
                asset: Asset::decode(r)?,
                amount: r.i64()?,
            },
            PATH_PAYMENT_STRICT_RECEIVE => OperationBody::PathPaymentStrictReceive {
                send_asset: Asset::decode(r)?,
                send_max: r.i64()?,
                destination: MuxedAccount::decode(r)?,
                dest_asset: Asset::decode(r)?,
                dest_amount: r.i64()?,
                path: r.array(MAX_PATH_LEN)?,
            },
            CHANGE_TRUST => OperationBody::ChangeTrust {
                line: Asset::decode(r).map_err(|e| e.context("Unsupported trustline asset"))?,
                limit: r.i64()?,
            },
            ACCOUNT_MERGE => OperationBody::AccountMerge(MuxedAccount::decode(r)?),
            MANAGE_DATA => OperationBody::ManageData {
                name: r.string(64)?,
                value: r.option(|r| r.var(64))?,
            },
            BUMP_SEQUENCE => OperationBody::BumpSequence { bump_to: r.i64()? },
            PATH_PAYMENT_STRICT_SEND => OperationBody::PathPaymentStrictSend {
                send_asset: Asset::decode(r)?,
                send_amount: r.i64()?,
                destination: MuxedAccount::decode(r)?,
                dest_asset: Asset::decode(r)?,
                dest_min: r.i64()?,
                path: r.array(MAX_PATH_LEN)?,
            },
            INVOKE_HOST_FUNCTION => OperationBody::InvokeHostFunction {
                host_function: HostFunction::decode(r)?,
                auth: r.array(u32::MAX)?,
            },
            t => {
                return Err(WalletError::xdr_error(format!(
                    "Unsupported operation type {}",
                    t
                )))
            }
        };
        Ok(Self {
            source_account,
            body,
        })
    }
}
