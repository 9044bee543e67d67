//! Unified error types for the wallet core
//!
//! All errors flow through this module for consistent handling
//! and FFI-safe error reporting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all wallet operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl WalletError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prefix the message, keeping code and details.
    pub fn context(mut self, prefix: &str) -> Self {
        self.message = format!("{}: {}", prefix, self.message);
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn invalid_transaction(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidTransaction, msg)
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InsufficientFunds, msg)
    }

    pub fn broadcast_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BroadcastFailed, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn xdr_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::XdrError, msg)
    }

    pub fn simulation_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SimulationFailed, msg)
    }

    pub fn account_not_found(account_id: &str) -> Self {
        Self::new(ErrorCode::AccountNotFound, "Account not found").with_details(account_id)
    }

    pub fn account_requires_memo(account_id: &str) -> Self {
        Self::new(ErrorCode::AccountRequiresMemo, "Destination account requires a memo")
            .with_details(account_id)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, msg)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::AccountNotFound
    }

    /// Account id carried by an `AccountRequiresMemo` error
    pub fn memo_required_account(&self) -> Option<&str> {
        match self.code {
            ErrorCode::AccountRequiresMemo => self.details.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for WalletError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidAddress,
    InvalidSecretKey,
    InvalidTransaction,

    // Network errors
    NetworkError,
    RateLimited,
    Timeout,
    GatewayTimeout,
    AccountNotFound,

    // Transaction errors
    InsufficientFunds,
    BroadcastFailed,
    TransactionRejected,
    SimulationFailed,
    AccountRequiresMemo,

    // Crypto errors
    CryptoError,
    SigningFailed,

    // Parse errors
    ParseError,
    JsonError,
    XdrError,

    // Internal
    Internal,
}

/// Result type alias for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;

/// Transaction parameter validation failures.
///
/// `key()` is the translation key the UI layer renders; `Display` is the
/// English fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Amount must be greater than zero")]
    AmountRequired,
    #[error("Destination amount must be greater than zero")]
    DestinationAmountRequired,
    #[error("Fee must be greater than zero")]
    FeeRequired,
    #[error("Timeout must be greater than zero")]
    TimeoutRequired,
    #[error("Invalid recipient address")]
    InvalidRecipientAddress,
    #[error("Cannot send to yourself")]
    CannotSendToSelf,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Insufficient balance for swap")]
    InsufficientBalanceForSwap,
    #[error("Cannot swap an asset for itself")]
    CannotSwapSameAsset,
    #[error("At least 1 XLM is required to create a new account")]
    MinimumXlmForNewAccount,
}

impl ValidationError {
    pub fn key(&self) -> &'static str {
        match self {
            ValidationError::AmountRequired => "transaction.errors.amountRequired",
            ValidationError::DestinationAmountRequired => {
                "transaction.errors.destinationAmountRequired"
            }
            ValidationError::FeeRequired => "transaction.errors.feeRequired",
            ValidationError::TimeoutRequired => "transaction.errors.timeoutRequired",
            ValidationError::InvalidRecipientAddress => {
                "transaction.errors.invalidRecipientAddress"
            }
            ValidationError::CannotSendToSelf => "transaction.errors.cannotSendToSelf",
            ValidationError::InsufficientBalance => "transaction.errors.insufficientBalance",
            ValidationError::InsufficientBalanceForSwap => {
                "transaction.errors.insufficientBalanceForSwap"
            }
            ValidationError::CannotSwapSameAsset => "transaction.errors.cannotSwapSameAsset",
            ValidationError::MinimumXlmForNewAccount => {
                "transaction.errors.minimumXlmForNewAccount"
            }
        }
    }
}

impl From<ValidationError> for WalletError {
    fn from(e: ValidationError) -> Self {
        let code = match e {
            ValidationError::InsufficientBalance
            | ValidationError::InsufficientBalanceForSwap
            | ValidationError::MinimumXlmForNewAccount => ErrorCode::InsufficientFunds,
            ValidationError::InvalidRecipientAddress => ErrorCode::InvalidAddress,
            _ => ErrorCode::InvalidInput,
        };
        WalletError::new(code, e.to_string()).with_details(e.key())
    }
}

// Conversions from common error types

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<base64::DecodeError> for WalletError {
    fn from(e: base64::DecodeError) -> Self {
        WalletError::new(ErrorCode::XdrError, format!("Invalid base64: {}", e))
    }
}

impl From<rust_decimal::Error> for WalletError {
    fn from(e: rust_decimal::Error) -> Self {
        WalletError::new(ErrorCode::InvalidInput, format!("Invalid amount: {}", e))
    }
}

impl From<url::ParseError> for WalletError {
    fn from(e: url::ParseError) -> Self {
        WalletError::new(ErrorCode::InvalidInput, format!("Invalid URL: {}", e))
    }
}

impl From<std::io::Error> for WalletError {
    fn from(e: std::io::Error) -> Self {
        WalletError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            WalletError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            WalletError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            WalletError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}
