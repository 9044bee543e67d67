//! Shared types for the wallet core
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization and FFI compatibility.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stellar::Transaction;

// =============================================================================
// Constants
// =============================================================================

pub const NATIVE_TOKEN_CODE: &str = "XLM";
/// Decimals of XLM and of every classic asset
pub const DEFAULT_DECIMALS: u32 = 7;
/// Seconds, used for trustline changes
pub const DEFAULT_TRANSACTION_TIMEOUT: u64 = 180;
pub const DEFAULT_RECOMMENDED_STELLAR_FEE: &str = "0.00001";
/// Directory tag marking custodial accounts that need a memo
pub const MEMO_REQUIRED_TAG: &str = "memo-required";
/// Cache key of the memo-required directory
pub const MEMO_REQUIRED_ACCOUNTS_KEY: &str = "memoRequiredAccounts";

// =============================================================================
// Network Types
// =============================================================================

/// Supported Stellar networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Network {
    Public,
    Testnet,
    Futurenet,
}

impl Network {
    pub fn passphrase(&self) -> &'static str {
        match self {
            Network::Public => "Public Global Stellar Network ; September 2015",
            Network::Testnet => "Test SDF Network ; September 2015",
            Network::Futurenet => "Test SDF Future Network ; October 2022",
        }
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self, Network::Public)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Public => "Main Net",
            Network::Testnet => "Test Net",
            Network::Futurenet => "Future Net",
        }
    }

    /// Default endpoints; `WalletConfig` may override the URLs.
    pub fn details(&self) -> NetworkDetails {
        match self {
            Network::Public => NetworkDetails {
                network: *self,
                network_name: self.display_name().to_string(),
                network_url: "https://horizon.stellar.org".to_string(),
                network_passphrase: self.passphrase().to_string(),
                friendbot_url: None,
                soroban_rpc_url: Some("https://soroban-rpc.mainnet.stellar.gateway.fm".to_string()),
            },
            Network::Testnet => NetworkDetails {
                network: *self,
                network_name: self.display_name().to_string(),
                network_url: "https://horizon-testnet.stellar.org".to_string(),
                network_passphrase: self.passphrase().to_string(),
                friendbot_url: Some("https://friendbot.stellar.org".to_string()),
                soroban_rpc_url: Some("https://soroban-testnet.stellar.org".to_string()),
            },
            Network::Futurenet => NetworkDetails {
                network: *self,
                network_name: self.display_name().to_string(),
                network_url: "https://horizon-futurenet.stellar.org".to_string(),
                network_passphrase: self.passphrase().to_string(),
                friendbot_url: Some("https://friendbot-futurenet.stellar.org".to_string()),
                soroban_rpc_url: Some("https://rpc-futurenet.stellar.org".to_string()),
            },
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "public" | "pubnet" | "mainnet" => Ok(Network::Public),
            "testnet" | "test" => Ok(Network::Testnet),
            "futurenet" | "future" => Ok(Network::Futurenet),
            _ => Err(format!("Unknown network: {}", s)),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Public => write!(f, "PUBLIC"),
            Network::Testnet => write!(f, "TESTNET"),
            Network::Futurenet => write!(f, "FUTURENET"),
        }
    }
}

/// Endpoints and passphrase for one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDetails {
    pub network: Network,
    pub network_name: String,
    pub network_url: String,
    pub network_passphrase: String,
    pub friendbot_url: Option<String>,
    pub soroban_rpc_url: Option<String>,
}

// =============================================================================
// Token & Balance Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    CustomToken,
    Native,
    CreditAlphanum4,
    CreditAlphanum12,
    LiquidityPoolShares,
}

/// Token issuer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

/// Issued token identity (classic credit asset or Soroban token)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonNativeToken {
    pub code: String,
    pub issuer: Issuer,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
}

/// Liquidity pool reserve entry ("native" or "CODE:ISSUER")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    pub asset: String,
    pub amount: Decimal,
}

/// An account holding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Balance {
    Native {
        total: Decimal,
        #[serde(default)]
        available: Option<Decimal>,
        #[serde(default)]
        minimum_balance: Option<Decimal>,
    },
    Classic {
        total: Decimal,
        token: NonNativeToken,
        #[serde(default)]
        available: Option<Decimal>,
        #[serde(default)]
        limit: Option<Decimal>,
    },
    Soroban {
        total: Decimal,
        token: NonNativeToken,
        contract_id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        symbol: String,
        decimals: u32,
    },
    LiquidityPool {
        total: Decimal,
        liquidity_pool_id: String,
        #[serde(default)]
        reserves: Vec<Reserve>,
    },
}

impl Balance {
    pub fn total(&self) -> Decimal {
        match self {
            Balance::Native { total, .. }
            | Balance::Classic { total, .. }
            | Balance::Soroban { total, .. }
            | Balance::LiquidityPool { total, .. } => *total,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Balance::Native { .. })
    }

    pub fn is_liquidity_pool(&self) -> bool {
        matches!(self, Balance::LiquidityPool { .. })
    }

    pub fn token(&self) -> Option<&NonNativeToken> {
        match self {
            Balance::Classic { token, .. } | Balance::Soroban { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            Balance::Soroban { decimals, .. } => *decimals,
            _ => DEFAULT_DECIMALS,
        }
    }

    /// "XLM", "CODE:ISSUER", "CODE:CONTRACT" or "POOL_ID:lp"
    pub fn identifier(&self) -> String {
        match self {
            Balance::Native { .. } => NATIVE_TOKEN_CODE.to_string(),
            Balance::Classic { token, .. } => format!("{}:{}", token.code, token.issuer.key),
            Balance::Soroban { token, contract_id, .. } => format!("{}:{}", token.code, contract_id),
            Balance::LiquidityPool { liquidity_pool_id, .. } => format!("{}:lp", liquidity_pool_id),
        }
    }
}

/// Balance with price and display data attached by the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedBalance {
    pub balance: Balance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiat_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiat_total: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_price_change_24h: Option<Decimal>,
}

impl PricedBalance {
    pub fn new(balance: Balance) -> Self {
        let token_code = match &balance {
            Balance::Native { .. } => Some(NATIVE_TOKEN_CODE.to_string()),
            Balance::Classic { token, .. } | Balance::Soroban { token, .. } => Some(token.code.clone()),
            Balance::LiquidityPool { .. } => None,
        };
        Self {
            id: Some(balance.identifier()),
            balance,
            token_code,
            fiat_code: None,
            fiat_total: None,
            display_name: None,
            current_price: None,
            percentage_price_change_24h: None,
        }
    }

    pub fn total(&self) -> Decimal {
        self.balance.total()
    }

    pub fn identifier(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.balance.identifier())
    }
}

// =============================================================================
// Transaction Types
// =============================================================================

/// Payment request as collected by the send flow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildPaymentTransactionParams {
    pub token_amount: String,
    #[serde(default)]
    pub selected_balance: Option<PricedBalance>,
    #[serde(default)]
    pub recipient_address: Option<String>,
    #[serde(default)]
    pub transaction_memo: Option<String>,
    /// XLM, e.g. "0.00001"
    #[serde(default)]
    pub transaction_fee: Option<String>,
    /// Seconds
    #[serde(default)]
    pub transaction_timeout: Option<u64>,
    #[serde(default)]
    pub network: Option<Network>,
    #[serde(default)]
    pub sender_address: Option<String>,
}

/// Path-payment swap request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSwapTransactionParams {
    pub source_amount: String,
    pub source_balance: PricedBalance,
    pub destination_balance: PricedBalance,
    /// "native" or "CODE:ISSUER"
    #[serde(default)]
    pub path: Vec<String>,
    pub destination_amount: String,
    pub destination_amount_min: String,
    #[serde(default)]
    pub transaction_fee: Option<String>,
    #[serde(default)]
    pub transaction_timeout: Option<u64>,
    #[serde(default)]
    pub network: Option<Network>,
    #[serde(default)]
    pub sender_address: Option<String>,
}

/// Built (unsigned) transaction
#[derive(Debug, Clone, Serialize)]
pub struct BuiltTransaction {
    #[serde(skip)]
    pub transaction: Transaction,
    pub xdr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
}

/// Memo requirement state for the transaction under review
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoValidation {
    pub is_memo_missing: bool,
    pub is_validating_memo: bool,
}

// =============================================================================
// Fee Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkCongestion {
    Low,
    Medium,
    High,
}

/// Recommended base fee (XLM) and congestion level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkFees {
    pub recommended_fee: String,
    pub network_congestion: NetworkCongestion,
}

// =============================================================================
// API Response Wrapper
// =============================================================================

/// Standard API response wrapper for FFI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<crate::error::WalletError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: crate::error::WalletError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed"}}"#.to_string()
        })
    }
}
