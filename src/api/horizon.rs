//! Horizon REST client

use std::collections::HashMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use super::HorizonApi;
use crate::error::{ErrorCode, WalletError, WalletResult};
use crate::types::NetworkDetails;
use crate::utils::string_or_number;
use crate::utils::{join_url, HttpClient, HttpResponse};
use crate::{log_debug, log_warn};

/// Account data entry that flags a memo-required destination (SEP-29)
pub const MEMO_REQUIRED_DATA_KEY: &str = "config.memo_required";
/// Base64 of "1"
pub const MEMO_REQUIRED_DATA_VALUE: &str = "MQ==";

/// Subset of the Horizon account resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    #[serde(with = "string_or_number")]
    pub sequence: i64,
    /// Data entries, values base64 encoded
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl AccountRecord {
    pub fn requires_memo(&self) -> bool {
        self.data
            .get(MEMO_REQUIRED_DATA_KEY)
            .is_some_and(|v| v == MEMO_REQUIRED_DATA_VALUE)
    }
}

/// Fee percentiles in stroops, as strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDistribution {
    pub mode: String,
    #[serde(default)]
    pub min: Option<String>,
    #[serde(default)]
    pub max: Option<String>,
    #[serde(default)]
    pub p50: Option<String>,
    #[serde(default)]
    pub p90: Option<String>,
}

/// `GET /fee_stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStatsResponse {
    #[serde(default)]
    pub last_ledger: Option<String>,
    #[serde(default)]
    pub last_ledger_base_fee: Option<String>,
    /// Fraction of ledger capacity used, e.g. "0.97"
    pub ledger_capacity_usage: String,
    pub max_fee: FeeDistribution,
    #[serde(default)]
    pub fee_charged: Option<FeeDistribution>,
}

/// Successful `POST /transactions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub hash: String,
    #[serde(default)]
    pub ledger: Option<u64>,
    #[serde(default)]
    pub successful: Option<bool>,
}

#[derive(Deserialize)]
struct ProblemExtras {
    #[serde(default)]
    result_codes: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Problem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    extras: Option<ProblemExtras>,
}

/// Blocking Horizon client for one network
pub struct HorizonClient {
    base_url: String,
    http: HttpClient,
}

impl HorizonClient {
    pub fn new(base_url: impl Into<String>, http: HttpClient) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub fn for_network(details: &NetworkDetails, timeout_secs: u64) -> WalletResult<Self> {
        Ok(Self::new(details.network_url.clone(), HttpClient::new(timeout_secs)?))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

/// Error for a rejected submission, carrying Horizon's result codes
fn submit_error(response: &HttpResponse, url: &str) -> WalletError {
    if response.status != 400 {
        return response.status_error(url);
    }
    let problem: Option<Problem> = serde_json::from_str(&response.body).ok();
    let title = problem
        .as_ref()
        .and_then(|p| p.title.clone())
        .unwrap_or_else(|| "Transaction Failed".to_string());
    let codes = problem
        .and_then(|p| p.extras)
        .and_then(|e| e.result_codes)
        .map(|c| c.to_string())
        .unwrap_or_else(|| response.body.clone());

    WalletError::new(ErrorCode::TransactionRejected, title).with_details(codes)
}

impl HorizonApi for HorizonClient {
    fn load_account(&self, account_id: &str) -> WalletResult<AccountRecord> {
        let url = self.url(&format!("accounts/{}", account_id));
        let response = self.http.get(&url)?;
        match response.status {
            404 => Err(WalletError::account_not_found(account_id)),
            _ if response.is_success() => response.json(),
            _ => Err(response.status_error(&url)),
        }
    }

    fn server_time(&self) -> WalletResult<u64> {
        let url = self.url("");
        let response = self.http.get(&url)?;
        let date = response
            .date
            .ok_or_else(|| WalletError::network_error("Horizon response has no Date header"))?;
        let parsed = DateTime::parse_from_rfc2822(&date)
            .map_err(|e| WalletError::parse_error(format!("Invalid Date header {}: {}", date, e)))?;
        u64::try_from(parsed.timestamp())
            .map_err(|_| WalletError::parse_error(format!("Date before epoch: {}", date)))
    }

    fn fee_stats(&self) -> WalletResult<FeeStatsResponse> {
        self.http.get_json(&self.url("fee_stats"))
    }

    fn submit_transaction(&self, xdr: &str) -> WalletResult<SubmitResponse> {
        let url = self.url("transactions");
        log_debug!("horizon", "Submitting transaction", xdr = xdr);
        let response = self.http.post_form(&url, &[("tx", xdr)])?;
        if response.is_success() {
            return response.json();
        }
        let err = submit_error(&response, &url);
        log_warn!("horizon", "Submission failed", status = response.status, code = format!("{:?}", err.code));
        Err(err)
    }
}
