//! Wallet Configuration
//!
//! Layered configuration, lowest precedence first:
//! 1. Built-in defaults
//! 2. Optional JSON file
//! 3. `STELLAR_WALLET_*` environment variables
//!
//! Endpoint URLs are validated: HTTPS is required for remote hosts and
//! embedded credentials are rejected.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::error::{WalletError, WalletResult};
use crate::types::{Network, NetworkDetails};

pub const ENV_PREFIX: &str = "STELLAR_WALLET_";

pub const DEFAULT_MEMO_DIRECTORY_URL: &str =
    "https://api.stellar.expert/explorer/directory?sort=address&order=asc&limit=1000&tag[]=memo-required";

/// Per-network endpoint overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointOverrides {
    pub horizon_url: Option<String>,
    pub soroban_rpc_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub public: EndpointOverrides,
    pub testnet: EndpointOverrides,
    pub futurenet: EndpointOverrides,
    pub memo_directory_url: String,
    /// Seconds the memo-required directory stays fresh
    pub memo_cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
    /// Retries after a Horizon 504 on submit
    pub submit_max_retries: u32,
    /// User preference for memo-required checks
    pub validate_memo: bool,
    pub debug_logging: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            public: EndpointOverrides::default(),
            testnet: EndpointOverrides::default(),
            futurenet: EndpointOverrides::default(),
            memo_directory_url: DEFAULT_MEMO_DIRECTORY_URL.to_string(),
            memo_cache_ttl_secs: 24 * 60 * 60,
            http_timeout_secs: 30,
            submit_max_retries: 3,
            validate_memo: true,
            debug_logging: false,
        }
    }
}

impl WalletConfig {
    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> WalletResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Missing fields fall back to defaults
    pub fn from_file(path: &Path) -> WalletResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WalletError::invalid_input(format!("Cannot read config {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> WalletResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| WalletError::invalid_input(format!("Invalid config: {}", e)))
    }

    /// Apply `STELLAR_WALLET_*` overrides from a key/value source
    pub fn apply_env<I>(&mut self, vars: I) -> WalletResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "HORIZON_URL_PUBLIC" => self.public.horizon_url = Some(value),
                "HORIZON_URL_TESTNET" => self.testnet.horizon_url = Some(value),
                "HORIZON_URL_FUTURENET" => self.futurenet.horizon_url = Some(value),
                "SOROBAN_RPC_URL_PUBLIC" => self.public.soroban_rpc_url = Some(value),
                "SOROBAN_RPC_URL_TESTNET" => self.testnet.soroban_rpc_url = Some(value),
                "SOROBAN_RPC_URL_FUTURENET" => self.futurenet.soroban_rpc_url = Some(value),
                "MEMO_DIRECTORY_URL" => self.memo_directory_url = value,
                "MEMO_CACHE_TTL" => self.memo_cache_ttl_secs = parse_env(&key, &value)?,
                "HTTP_TIMEOUT" => self.http_timeout_secs = parse_env(&key, &value)?,
                "SUBMIT_MAX_RETRIES" => self.submit_max_retries = parse_env(&key, &value)?,
                "VALIDATE_MEMO" => self.validate_memo = parse_env_bool(&key, &value)?,
                "DEBUG" => self.debug_logging = parse_env_bool(&key, &value)?,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> WalletResult<()> {
        for overrides in [&self.public, &self.testnet, &self.futurenet] {
            for url in [&overrides.horizon_url, &overrides.soroban_rpc_url]
                .into_iter()
                .flatten()
            {
                validate_endpoint_url(url)?;
            }
        }
        validate_endpoint_url(&self.memo_directory_url)?;
        if self.http_timeout_secs == 0 {
            return Err(WalletError::invalid_input("http_timeout_secs must be positive"));
        }
        Ok(())
    }

    fn overrides(&self, network: Network) -> &EndpointOverrides {
        match network {
            Network::Public => &self.public,
            Network::Testnet => &self.testnet,
            Network::Futurenet => &self.futurenet,
        }
    }

    /// Network defaults with configured URLs applied
    pub fn network_details(&self, network: Network) -> NetworkDetails {
        let mut details = network.details();
        let overrides = self.overrides(network);
        if let Some(url) = &overrides.horizon_url {
            details.network_url = url.clone();
        }
        if let Some(url) = &overrides.soroban_rpc_url {
            details.soroban_rpc_url = Some(url.clone());
        }
        details
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> WalletResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| WalletError::invalid_input(format!("Invalid value for {}: {}", key, value)))
}

fn parse_env_bool(key: &str, value: &str) -> WalletResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(WalletError::invalid_input(format!("Invalid value for {}: {}", key, value))),
    }
}

fn is_local_host(host: &str) -> bool {
    host == "localhost" || host == "127.0.0.1" || host == "[::1]" || host == "::1"
}

/// HTTPS required except for localhost; no embedded credentials
pub fn validate_endpoint_url(url: &str) -> WalletResult<()> {
    let parsed = Url::parse(url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| WalletError::invalid_input(format!("URL has no host: {}", url)))?;

    match parsed.scheme() {
        "https" => {}
        "http" if is_local_host(host) => {}
        "http" => {
            return Err(WalletError::invalid_input(format!(
                "HTTPS required for remote endpoint: {}",
                url
            )))
        }
        scheme => {
            return Err(WalletError::invalid_input(format!(
                "Unsupported URL scheme: {}",
                scheme
            )))
        }
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(WalletError::invalid_input("Endpoint URL must not embed credentials"));
    }
    Ok(())
}
