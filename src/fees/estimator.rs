//! Network Fee Estimator
//!
//! Reads `/fee_stats` and turns the mode of the max-fee distribution into
//! a recommended base fee. Failures fall back to the protocol minimum so
//! the send flow always has a fee to show.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::api::{FeeStatsResponse, HorizonApi};
use crate::error::{WalletError, WalletResult};
use crate::log_warn;
use crate::stellar::amount::from_stroops;
use crate::types::{NetworkCongestion, NetworkFees, DEFAULT_RECOMMENDED_STELLAR_FEE};

/// Congestion for a ledger capacity usage ratio
pub fn congestion_from_capacity(usage: Decimal) -> NetworkCongestion {
    if usage <= Decimal::new(5, 1) {
        NetworkCongestion::Low
    } else if usage <= Decimal::new(75, 2) {
        NetworkCongestion::Medium
    } else {
        NetworkCongestion::High
    }
}

/// Fees from a fee stats response
pub fn fees_from_stats(stats: &FeeStatsResponse) -> WalletResult<NetworkFees> {
    let mode: i64 = stats.max_fee.mode.trim().parse().map_err(|_| {
        WalletError::parse_error(format!("Invalid max_fee.mode: {}", stats.max_fee.mode))
    })?;
    let usage = Decimal::from_str(stats.ledger_capacity_usage.trim())?;

    Ok(NetworkFees {
        recommended_fee: from_stroops(mode).to_string(),
        network_congestion: congestion_from_capacity(usage),
    })
}

/// Default fee with low congestion
pub fn default_network_fees() -> NetworkFees {
    NetworkFees {
        recommended_fee: DEFAULT_RECOMMENDED_STELLAR_FEE.to_string(),
        network_congestion: NetworkCongestion::Low,
    }
}

/// Recommended fee (XLM) and congestion; never fails
pub fn get_network_fees(horizon: &dyn HorizonApi) -> NetworkFees {
    match horizon.fee_stats().and_then(|stats| fees_from_stats(&stats)) {
        Ok(fees) => fees,
        Err(e) => {
            log_warn!("fees", "Fee stats unavailable, using default fee", error = e.message);
            default_network_fees()
        }
    }
}
