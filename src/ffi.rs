//! FFI Layer for the Stellar wallet core
//!
//! All C-ABI exports are defined here. This is the ONLY file that should
//! contain `extern "C"` functions. All functions follow a consistent pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `stellar_free_string`)
//!
//! Error handling: All functions return JSON with `success` field.
//! On error, `success: false` and `error` object is populated.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::OnceLock;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::{HorizonClient, SorobanRpcClient};
use crate::error::{WalletError, WalletResult};
use crate::fees;
use crate::memo::{CachedMemoDirectory, MemoCheckInput, MemoValidator, StellarExpertDirectory};
use crate::tx::{self, BroadcastConfig};
use crate::types::*;
use crate::utils::WalletConfig;
use crate::wallet;

// =============================================================================
// Memory Management
// =============================================================================

/// Free a string returned by any stellar_* function
///
/// # Safety
/// The pointer must have been returned by a stellar_* function
#[unsafe(no_mangle)]
pub extern "C" fn stellar_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Convert C string to Rust string, returning error JSON if invalid
fn parse_input(input: *const c_char) -> Result<String, *mut c_char> {
    if input.is_null() {
        return Err(error_response(WalletError::invalid_input("Null input pointer")));
    }

    let c_str = unsafe { CStr::from_ptr(input) };
    match c_str.to_str() {
        Ok(s) => Ok(s.to_string()),
        Err(_) => Err(error_response(WalletError::invalid_input("Invalid UTF-8 string"))),
    }
}

/// Parse the JSON request body
fn parse_request<T: DeserializeOwned>(input: *const c_char) -> Result<T, *mut c_char> {
    let json_str = parse_input(input)?;
    serde_json::from_str(&json_str)
        .map_err(|e| error_response(WalletError::parse_error(format!("Invalid JSON: {}", e))))
}

/// Create a success response JSON string
fn success_response<T: Serialize>(data: T) -> *mut c_char {
    let response = ApiResponse::ok(data);
    string_to_ptr(response.to_json())
}

/// Create an error response JSON string
fn error_response(error: WalletError) -> *mut c_char {
    let response: ApiResponse<()> = ApiResponse::err(error);
    string_to_ptr(response.to_json())
}

fn respond<T: Serialize>(result: WalletResult<T>) -> *mut c_char {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_response(e),
    }
}

/// Convert Rust string to C string pointer
fn string_to_ptr(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => c"{\"success\":false,\"error\":{\"code\":\"internal\",\"message\":\"String conversion failed\"}}"
            .to_owned()
            .into_raw(),
    }
}

/// Configuration from the process environment
fn load_config() -> WalletResult<WalletConfig> {
    let config = WalletConfig::load(None)?;
    if config.debug_logging {
        crate::utils::logging::enable_debug();
    }
    Ok(config)
}

fn horizon_for(config: &WalletConfig, network: Network) -> WalletResult<HorizonClient> {
    HorizonClient::for_network(&config.network_details(network), config.http_timeout_secs)
}

fn require_network(network: Option<Network>) -> WalletResult<Network> {
    network.ok_or_else(|| WalletError::invalid_input("Missing network"))
}

// =============================================================================
// Keys and Addresses
// =============================================================================

/// Generate a new random keypair
///
/// # Output
/// ```json
/// { "success": true, "data": { "public_key": "G...", "secret_key": "S..." } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn stellar_generate_keypair() -> *mut c_char {
    success_response(wallet::create_new_keypair())
}

/// Restore the public key for a secret seed
///
/// # Input
/// ```json
/// { "secret": "S..." }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn stellar_import_secret(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct ImportRequest {
        secret: String,
    }

    let request: ImportRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };
    respond(wallet::restore_from_secret(&request.secret))
}

/// Classify an address (account, muxed or contract)
///
/// # Input
/// ```json
/// { "address": "G..." }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn stellar_validate_address(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct ValidateRequest {
        address: String,
    }

    let request: ValidateRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };
    success_response(wallet::validate_address_detailed(&request.address))
}

// =============================================================================
// Transaction Operations
// =============================================================================

#[derive(Serialize)]
struct BuildResponse {
    xdr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    contract_id: Option<String>,
}

/// Build an unsigned payment; contract transfers come back simulated and
/// prepared
///
/// # Input
/// `BuildPaymentTransactionParams` as JSON
#[unsafe(no_mangle)]
pub extern "C" fn stellar_build_payment(input: *const c_char) -> *mut c_char {
    let params: BuildPaymentTransactionParams = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    let result: WalletResult<_> = (|| {
        let config = load_config()?;
        let network = require_network(params.network)?;
        let details = config.network_details(network);
        let horizon = horizon_for(&config, network)?;

        let built = tx::build_payment_transaction(&horizon, &params)?;
        let xdr = match &built.contract_id {
            Some(_) => {
                let rpc = SorobanRpcClient::for_network(&details, config.http_timeout_secs)?;
                tx::simulate_contract_transfer(&rpc, &built.transaction, &details)?
            }
            None => built.xdr,
        };
        Ok(BuildResponse {
            xdr,
            contract_id: built.contract_id,
        })
    })();
    respond(result)
}

/// Build an unsigned path-payment swap
///
/// # Input
/// `BuildSwapTransactionParams` as JSON
#[unsafe(no_mangle)]
pub extern "C" fn stellar_build_swap(input: *const c_char) -> *mut c_char {
    let params: BuildSwapTransactionParams = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    let result: WalletResult<_> = (|| {
        let config = load_config()?;
        let horizon = horizon_for(&config, require_network(params.network)?)?;
        tx::build_swap_transaction(&horizon, &params)
    })();
    respond(result)
}

/// Add or remove a trustline
///
/// # Input
/// ```json
/// {
///   "network": "TESTNET",
///   "public_key": "G...",
///   "token_identifier": "USDC:G...",
///   "is_remove": false
/// }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn stellar_change_trust(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct ChangeTrustRequest {
        network: Network,
        public_key: String,
        token_identifier: String,
        #[serde(default)]
        is_remove: bool,
    }

    let request: ChangeTrustRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    let result: WalletResult<_> = (|| {
        let config = load_config()?;
        let horizon = horizon_for(&config, request.network)?;
        tx::build_change_trust_transaction(
            &horizon,
            request.network,
            &request.public_key,
            &request.token_identifier,
            request.is_remove,
        )
    })();
    respond(result)
}

#[derive(Deserialize)]
struct SignRequest {
    xdr: String,
    secret: String,
    network: Network,
}

/// Sign an envelope
///
/// # Input
/// ```json
/// { "xdr": "AAAA...", "secret": "S...", "network": "PUBLIC" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn stellar_sign_transaction(input: *const c_char) -> *mut c_char {
    let request: SignRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };
    respond(tx::sign_transaction(&request.xdr, &request.secret, request.network))
}

/// Submit a signed envelope to Horizon
///
/// # Input
/// ```json
/// { "signed_xdr": "AAAA...", "network": "PUBLIC" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn stellar_submit_transaction(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct SubmitRequest {
        signed_xdr: String,
        network: Network,
    }

    let request: SubmitRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    let result: WalletResult<_> = (|| {
        let config = load_config()?;
        let horizon = horizon_for(&config, request.network)?;
        tx::submit_transaction(
            &horizon,
            &request.signed_xdr,
            &BroadcastConfig::with_retries(config.submit_max_retries),
        )
    })();
    respond(result)
}

/// Decode an envelope for review
///
/// # Input
/// ```json
/// { "xdr": "AAAA...", "network": "PUBLIC" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn stellar_decode_transaction(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct DecodeRequest {
        xdr: String,
        network: Network,
    }

    let request: DecodeRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };
    respond(tx::decode_transaction(&request.xdr, request.network))
}

// =============================================================================
// Fees and Memo Checks
// =============================================================================

/// Recommended fee and congestion level; never fails once the request parses
///
/// # Input
/// ```json
/// { "network": "PUBLIC" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn stellar_network_fees(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct FeeRequest {
        network: Network,
    }

    let request: FeeRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    let fees = load_config()
        .and_then(|config| horizon_for(&config, request.network))
        .map(|horizon| fees::get_network_fees(&horizon))
        .unwrap_or_else(|_| fees::default_network_fees());
    success_response(fees)
}

static MEMO_VALIDATOR: OnceLock<MemoValidator<StellarExpertDirectory>> = OnceLock::new();

/// Process-wide validator so the directory cache outlives a single call
fn memo_validator(config: &WalletConfig) -> WalletResult<&'static MemoValidator<StellarExpertDirectory>> {
    if let Some(validator) = MEMO_VALIDATOR.get() {
        return Ok(validator);
    }
    let directory = CachedMemoDirectory::new(
        StellarExpertDirectory::from_config(config)?,
        Duration::from_secs(config.memo_cache_ttl_secs),
    );
    Ok(MEMO_VALIDATOR.get_or_init(|| MemoValidator::new(directory)))
}

/// Whether the transaction under review is missing a required memo
///
/// # Input
/// ```json
/// {
///   "xdr": "AAAA...",
///   "transaction_memo": null,
///   "network": "PUBLIC",
///   "validation_enabled": true
/// }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "is_memo_missing": false, "is_validating_memo": false } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn stellar_check_memo(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct CheckMemoRequest {
        #[serde(default)]
        xdr: Option<String>,
        #[serde(default)]
        transaction_memo: Option<String>,
        #[serde(default)]
        network: Option<Network>,
        validation_enabled: Option<bool>,
    }

    let request: CheckMemoRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    let result: WalletResult<_> = (|| {
        let config = load_config()?;
        let check = MemoCheckInput {
            xdr: request.xdr,
            transaction_memo: request.transaction_memo,
            network: request.network,
            validation_enabled: request.validation_enabled.unwrap_or(config.validate_memo),
        };
        if !check.should_validate() {
            return Ok(MemoValidation::default());
        }
        let network = require_network(check.network)?;
        let horizon = horizon_for(&config, network)?;
        Ok(memo_validator(&config)?.validate(&horizon, &check))
    })();
    respond(result)
}
