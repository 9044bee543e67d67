//! Transaction Broadcaster
//!
//! Submits signed envelopes to Horizon. A 504 means Horizon did not hear
//! back from Stellar Core in time; the transaction may still land, so the
//! same envelope is resubmitted.

use std::thread::sleep;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::HorizonApi;
use crate::error::{ErrorCode, WalletResult};
use crate::stellar::{TransactionEnvelope, XdrCodec};
use crate::{log_info, log_warn};

/// Broadcast configuration
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Resubmissions after a gateway timeout
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

impl BroadcastConfig {
    pub fn with_retries(retries: u32) -> Self {
        Self {
            retries,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub hash: String,
    pub ledger: Option<u64>,
    pub attempts: u32,
}

/// Submit a signed envelope, retrying gateway timeouts
pub fn submit_transaction(
    horizon: &dyn HorizonApi,
    signed_xdr: &str,
    config: &BroadcastConfig,
) -> WalletResult<BroadcastResult> {
    let envelope = TransactionEnvelope::from_xdr_base64(signed_xdr)
        .map_err(|e| e.context("Cannot submit transaction"))?;
    if envelope.signatures().is_empty() {
        log_warn!("broadcaster", "Submitting an unsigned transaction");
    }

    let mut attempts = 0;
    loop {
        attempts += 1;
        match horizon.submit_transaction(signed_xdr) {
            Ok(response) => {
                log_info!("broadcaster", "Transaction submitted", hash = response.hash, attempts = attempts);
                return Ok(BroadcastResult {
                    hash: response.hash,
                    ledger: response.ledger,
                    attempts,
                });
            }
            Err(e) if e.code == ErrorCode::GatewayTimeout && attempts <= config.retries => {
                log_warn!("broadcaster", "Horizon gateway timeout, resubmitting", attempt = attempts);
                sleep(config.backoff);
            }
            Err(e) => return Err(e),
        }
    }
}
