//! Memo Requirement Resolver
//!
//! Decides whether the transaction under review is missing a memo its
//! destination needs. Checks the cached directory first, then the
//! destination accounts on Horizon. Any failure counts as missing.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::check::check_memo_required;
use super::directory::{CachedMemoDirectory, MemoDirectorySource};
use crate::api::HorizonApi;
use crate::stellar::{TransactionEnvelope, XdrCodec};
use crate::types::{MemoValidation, Network};
use crate::{log_debug, log_error};

/// Everything the result depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoCheckInput {
    pub xdr: Option<String>,
    /// Memo entered in the send flow, used when the transaction has none
    pub transaction_memo: Option<String>,
    pub network: Option<Network>,
    /// User preference
    pub validation_enabled: bool,
}

impl MemoCheckInput {
    /// Validation runs on the public network only, and only when enabled
    pub fn should_validate(&self) -> bool {
        self.validation_enabled && self.network.is_some_and(|n| n.is_mainnet())
    }
}

/// True when a required memo is missing
pub fn resolve_memo_requirement<S: MemoDirectorySource>(
    directory: &CachedMemoDirectory<S>,
    horizon: &dyn HorizonApi,
    input: &MemoCheckInput,
) -> bool {
    if !input.should_validate() {
        return false;
    }
    let Some(xdr) = input.xdr.as_deref() else {
        return true;
    };

    let envelope = match TransactionEnvelope::from_xdr_base64(xdr) {
        Ok(envelope) => envelope,
        Err(e) => {
            log_error!("memo_validation", "Cannot decode transaction", error = e.message);
            return true;
        }
    };
    let transaction = envelope.transaction();

    let memo = transaction
        .memo
        .value()
        .filter(|m| !m.is_empty())
        .or_else(|| input.transaction_memo.clone())
        .unwrap_or_default();
    if !memo.is_empty() {
        return false;
    }

    let destination = transaction.operations.iter().find_map(|op| op.destination());
    if let Some(destination) = destination {
        match directory.is_memo_required(&destination) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => {
                log_debug!("memo_validation", "Directory unavailable, checking Horizon", error = e.message);
            }
        }
    }

    match check_memo_required(horizon, transaction) {
        Ok(()) => false,
        Err(e) => {
            match e.memo_required_account() {
                Some(account) => {
                    log_debug!("memo_validation", "Destination requires memo", account = account);
                }
                None => {
                    log_error!("memo_validation", "Error validating memo", error = e.message);
                }
            }
            true
        }
    }
}

#[derive(Debug, Default)]
struct ValidatorState {
    input: Option<MemoCheckInput>,
    result: MemoValidation,
}

/// Holds the memo validation state for the transaction under review
pub struct MemoValidator<S> {
    directory: CachedMemoDirectory<S>,
    state: RwLock<ValidatorState>,
}

impl<S: MemoDirectorySource> MemoValidator<S> {
    pub fn new(directory: CachedMemoDirectory<S>) -> Self {
        Self {
            directory,
            state: RwLock::new(ValidatorState::default()),
        }
    }

    pub fn directory(&self) -> &CachedMemoDirectory<S> {
        &self.directory
    }

    fn read(&self) -> RwLockReadGuard<'_, ValidatorState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ValidatorState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Last published result
    pub fn current(&self) -> MemoValidation {
        self.read().result
    }

    /// Result for `input`; recomputed only when `input` differs from the
    /// previous call
    pub fn validate(&self, horizon: &dyn HorizonApi, input: &MemoCheckInput) -> MemoValidation {
        {
            let state = self.read();
            if state.input.as_ref() == Some(input) {
                return state.result;
            }
        }

        let should_validate = input.should_validate();
        {
            let mut state = self.write();
            state.input = Some(input.clone());
            state.result.is_validating_memo = should_validate;
        }

        let is_memo_missing = resolve_memo_requirement(&self.directory, horizon, input);

        let mut state = self.write();
        // A newer input replaced this one while the check ran
        if state.input.as_ref() == Some(input) {
            state.result = MemoValidation {
                is_memo_missing,
                is_validating_memo: false,
            };
        }
        state.result
    }

    pub fn reset(&self) {
        *self.write() = ValidatorState::default();
    }
}
