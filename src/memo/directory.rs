//! Memo-required directory
//!
//! The block explorer publishes the accounts tagged `memo-required`
//! (exchanges and other custodial destinations). The list is cached for a
//! day; a stale copy is reused when a refresh fails.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{WalletError, WalletResult};
use crate::stellar::MuxedAccount;
use crate::types::{MEMO_REQUIRED_ACCOUNTS_KEY, MEMO_REQUIRED_TAG};
use crate::utils::{Cache, HttpClient, WalletConfig};
use crate::{log_debug, log_warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoRequiredAccount {
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MemoRequiredAccount {
    pub fn is_memo_required(&self) -> bool {
        self.tags.iter().any(|t| t == MEMO_REQUIRED_TAG)
    }
}

#[derive(Debug, Deserialize)]
struct Embedded {
    #[serde(default)]
    records: Vec<MemoRequiredAccount>,
}

/// Directory API response (`_embedded.records`)
#[derive(Debug, Deserialize)]
pub struct MemoRequiredAccountsResponse {
    #[serde(rename = "_embedded")]
    embedded: Embedded,
}

impl MemoRequiredAccountsResponse {
    pub fn into_records(self) -> Vec<MemoRequiredAccount> {
        self.embedded.records
    }
}

/// Where the memo-required list comes from
pub trait MemoDirectorySource {
    fn fetch(&self) -> WalletResult<Vec<MemoRequiredAccount>>;
}

/// stellar.expert directory API
pub struct StellarExpertDirectory {
    url: String,
    http: HttpClient,
}

impl StellarExpertDirectory {
    pub fn new(url: impl Into<String>, http: HttpClient) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }

    pub fn from_config(config: &WalletConfig) -> WalletResult<Self> {
        Ok(Self::new(
            config.memo_directory_url.clone(),
            HttpClient::new(config.http_timeout_secs)?,
        ))
    }
}

impl MemoDirectorySource for StellarExpertDirectory {
    fn fetch(&self) -> WalletResult<Vec<MemoRequiredAccount>> {
        let response: MemoRequiredAccountsResponse = self.http.get_json(&self.url)?;
        Ok(response.into_records())
    }
}

/// TTL-cached view over a directory source
pub struct CachedMemoDirectory<S> {
    source: S,
    cache: Mutex<Cache<Arc<Vec<MemoRequiredAccount>>>>,
}

impl<S: MemoDirectorySource> CachedMemoDirectory<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            cache: Mutex::new(Cache::with_ttl(ttl)),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fresh list, refetched after the TTL; stale list if the refetch fails
    pub fn accounts(&self) -> WalletResult<Arc<Vec<MemoRequiredAccount>>> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| WalletError::internal("Memo directory cache lock poisoned"))?;

        if let Some(accounts) = cache.get(MEMO_REQUIRED_ACCOUNTS_KEY) {
            return Ok(accounts);
        }

        match self.source.fetch() {
            Ok(records) => {
                log_debug!("memo_directory", "Fetched memo-required directory", records = records.len());
                let accounts = Arc::new(records);
                cache.set(MEMO_REQUIRED_ACCOUNTS_KEY.to_string(), Arc::clone(&accounts));
                Ok(accounts)
            }
            Err(e) => match cache.get_stale(MEMO_REQUIRED_ACCOUNTS_KEY) {
                Some(stale) => {
                    log_warn!("memo_directory", "Directory refresh failed, using stale copy", error = e.message);
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    /// True when `destination` is listed with the memo-required tag
    pub fn is_memo_required(&self, destination: &MuxedAccount) -> WalletResult<bool> {
        let address = destination.address();
        let base = destination.account_id().address();
        Ok(self
            .accounts()?
            .iter()
            .filter(|record| record.address == address || record.address == base)
            .any(MemoRequiredAccount::is_memo_required))
    }

    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.invalidate(MEMO_REQUIRED_ACCOUNTS_KEY);
        }
    }
}
