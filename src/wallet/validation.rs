//! Transaction Parameter Validation
//!
//! Checks run in a fixed order and the first failure is returned.

use rust_decimal::Decimal;

use super::address_validation::{is_same_account, is_valid_stellar_address};
use crate::error::ValidationError;
use crate::stellar::amount::{is_positive, parse_amount};
use crate::types::PricedBalance;

/// Payment fields to validate
#[derive(Debug, Clone, Copy)]
pub struct PaymentCheck<'a> {
    pub sender_address: &'a str,
    pub balance: &'a PricedBalance,
    pub amount: &'a str,
    pub destination: &'a str,
    pub fee: &'a str,
    pub timeout: u64,
}

/// Swap fields to validate
#[derive(Debug, Clone, Copy)]
pub struct SwapCheck<'a> {
    pub source_balance: &'a PricedBalance,
    pub destination_balance: &'a PricedBalance,
    pub source_amount: &'a str,
    pub destination_amount: &'a str,
    pub fee: &'a str,
    pub timeout: u64,
}

fn exceeds(amount: &str, total: Decimal) -> bool {
    parse_amount(amount).map(|a| a > total).unwrap_or(false)
}

pub fn validate_transaction_params(params: &PaymentCheck<'_>) -> Result<(), ValidationError> {
    if !is_positive(params.amount) {
        return Err(ValidationError::AmountRequired);
    }
    if !is_positive(params.fee) {
        return Err(ValidationError::FeeRequired);
    }
    if params.timeout == 0 {
        return Err(ValidationError::TimeoutRequired);
    }
    if !is_valid_stellar_address(params.destination) {
        return Err(ValidationError::InvalidRecipientAddress);
    }
    if is_same_account(params.sender_address, params.destination) {
        return Err(ValidationError::CannotSendToSelf);
    }
    if exceeds(params.amount, params.balance.total()) {
        return Err(ValidationError::InsufficientBalance);
    }
    Ok(())
}

pub fn validate_swap_transaction_params(params: &SwapCheck<'_>) -> Result<(), ValidationError> {
    if !is_positive(params.source_amount) {
        return Err(ValidationError::AmountRequired);
    }
    if !is_positive(params.destination_amount) {
        return Err(ValidationError::DestinationAmountRequired);
    }
    if !is_positive(params.fee) {
        return Err(ValidationError::FeeRequired);
    }
    if params.timeout == 0 {
        return Err(ValidationError::TimeoutRequired);
    }
    if exceeds(params.source_amount, params.source_balance.total()) {
        return Err(ValidationError::InsufficientBalanceForSwap);
    }
    if params.source_balance.identifier() == params.destination_balance.identifier() {
        return Err(ValidationError::CannotSwapSameAsset);
    }
    Ok(())
}
