//! Soroban JSON-RPC client

use serde::{Deserialize, Serialize};

use super::SorobanRpcApi;
use crate::error::{ErrorCode, WalletError, WalletResult};
use crate::types::NetworkDetails;
use crate::utils::HttpClient;

/// Per-invocation simulation result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateHostFunctionResult {
    /// Base64 `SorobanAuthorizationEntry` values
    #[serde(default)]
    pub auth: Vec<String>,
    #[serde(default)]
    pub xdr: Option<String>,
}

/// Present when archived ledger entries must be restored first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorePreamble {
    pub transaction_data: String,
    pub min_resource_fee: String,
}

/// `simulateTransaction` result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulateTransactionResponse {
    pub transaction_data: Option<String>,
    /// Stroops, as a decimal string
    pub min_resource_fee: Option<String>,
    pub results: Vec<SimulateHostFunctionResult>,
    pub error: Option<String>,
    pub restore_preamble: Option<RestorePreamble>,
    pub latest_ledger: Option<u64>,
}

impl SimulateTransactionResponse {
    pub fn min_resource_fee(&self) -> WalletResult<i64> {
        let raw = self
            .min_resource_fee
            .as_deref()
            .ok_or_else(|| WalletError::simulation_failed("Simulation returned no minResourceFee"))?;
        raw.trim()
            .parse()
            .map_err(|_| WalletError::simulation_failed(format!("Invalid minResourceFee: {}", raw)))
    }
}

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Serialize)]
struct SimulateParams<'a> {
    transaction: &'a str,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// Blocking JSON-RPC client for one Soroban RPC endpoint
pub struct SorobanRpcClient {
    url: String,
    http: HttpClient,
}

impl SorobanRpcClient {
    pub fn new(url: impl Into<String>, http: HttpClient) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }

    /// Fails when the network has no Soroban RPC endpoint
    pub fn for_network(details: &NetworkDetails, timeout_secs: u64) -> WalletResult<Self> {
        let url = details.soroban_rpc_url.clone().ok_or_else(|| {
            WalletError::invalid_input(format!(
                "Soroban RPC URL not configured for {}",
                details.network_name
            ))
        })?;
        Ok(Self::new(url, HttpClient::new(timeout_secs)?))
    }

    fn call<P: Serialize, T: serde::de::DeserializeOwned>(&self, method: &str, params: P) -> WalletResult<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        let response = self.http.post_json(&self.url, &request)?;
        if !response.is_success() {
            return Err(response.status_error(&self.url));
        }
        let body: RpcResponse<T> = response.json()?;
        if let Some(err) = body.error {
            return Err(WalletError::new(
                ErrorCode::NetworkError,
                format!("RPC {} failed: {}", method, err.message),
            )
            .with_details(err.code.to_string()));
        }
        body.result
            .ok_or_else(|| WalletError::network_error(format!("RPC {} returned no result", method)))
    }
}

impl SorobanRpcApi for SorobanRpcClient {
    fn simulate_transaction(&self, xdr: &str) -> WalletResult<SimulateTransactionResponse> {
        self.call("simulateTransaction", SimulateParams { transaction: xdr })
    }
}
