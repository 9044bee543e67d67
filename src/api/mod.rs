//! API Module
//!
//! Clients for Horizon and Soroban RPC. The transaction and memo code
//! only sees the `HorizonApi` / `SorobanRpcApi` traits, so tests can run
//! against in-memory fakes.

mod horizon;
mod soroban_rpc;

pub use horizon::*;
pub use soroban_rpc::*;

use crate::error::WalletResult;

/// Horizon REST calls used by the wallet
pub trait HorizonApi {
    /// `GET /accounts/{id}`; a missing account is `ErrorCode::AccountNotFound`
    fn load_account(&self, account_id: &str) -> WalletResult<AccountRecord>;

    /// Unix time taken from the server's `Date` header
    fn server_time(&self) -> WalletResult<u64>;

    fn fee_stats(&self) -> WalletResult<FeeStatsResponse>;

    /// `POST /transactions`. Gateway timeouts surface as
    /// `ErrorCode::GatewayTimeout`, rejections as `ErrorCode::TransactionRejected`.
    fn submit_transaction(&self, xdr: &str) -> WalletResult<SubmitResponse>;
}

/// Soroban JSON-RPC calls used by the wallet
pub trait SorobanRpcApi {
    fn simulate_transaction(&self, xdr: &str) -> WalletResult<SimulateTransactionResponse>;
}
