//! Memo-required check over Horizon (SEP-29)
//!
//! Destinations flag themselves with the `config.memo_required` data entry.

use std::collections::HashSet;

use crate::api::HorizonApi;
use crate::error::{WalletError, WalletResult};
use crate::stellar::{OperationBody, Transaction};
use crate::log_debug;

/// Fails with `ErrorCode::AccountRequiresMemo` when the transaction has no
/// memo and pays an account that requires one. Muxed destinations already
/// identify the recipient and are skipped.
pub fn check_memo_required(horizon: &dyn HorizonApi, transaction: &Transaction) -> WalletResult<()> {
    if !transaction.memo.is_none() {
        return Ok(());
    }

    let mut seen = HashSet::new();
    for operation in &transaction.operations {
        let destination = match &operation.body {
            OperationBody::Payment { destination, .. }
            | OperationBody::PathPaymentStrictReceive { destination, .. }
            | OperationBody::PathPaymentStrictSend { destination, .. }
            | OperationBody::AccountMerge(destination) => destination,
            _ => continue,
        };
        if destination.is_muxed() {
            continue;
        }
        let address = destination.address();
        if !seen.insert(address.clone()) {
            continue;
        }

        match horizon.load_account(&address) {
            Ok(account) if account.requires_memo() => {
                return Err(WalletError::account_requires_memo(&address));
            }
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                log_debug!("memo_check", "Destination not found, skipping", destination = address);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
