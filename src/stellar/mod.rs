//! Stellar Protocol Primitives
//!
//! StrKey addresses, the XDR codec, and the transaction model.

pub mod account;
pub mod amount;
pub mod asset;
pub mod contract;
pub mod invocation;
pub mod keypair;
pub mod operation;
pub mod scval;
pub mod strkey;
pub mod transaction;
pub mod xdr;

pub use account::{AccountId, MuxedAccount};
pub use asset::Asset;
pub use invocation::{HostFunction, InvokeContractArgs, SorobanAuthEntry, SorobanTransactionData};
pub use keypair::Keypair;
pub use operation::{Operation, OperationBody};
pub use scval::{ScAddress, ScVal};
pub use transaction::{
    DecoratedSignature, FeeBumpTransaction, Memo, Preconditions, TimeBounds, Transaction,
    TransactionBuilder, TransactionEnvelope,
};
pub use xdr::XdrCodec;
