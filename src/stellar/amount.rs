//! Amount conversions between decimal strings, stroops and token base units

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{WalletError, WalletResult};
use crate::types::DEFAULT_DECIMALS;

/// 1 XLM = 10^7 stroops
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Parse a user-supplied decimal amount
pub fn parse_amount(amount: &str) -> WalletResult<Decimal> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(WalletError::invalid_input("Amount is empty"));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| WalletError::invalid_input(format!("Invalid amount: {}", amount)))
}

/// True when the string parses to a value > 0
pub fn is_positive(amount: &str) -> bool {
    parse_amount(amount).map(|d| d > Decimal::ZERO).unwrap_or(false)
}

/// Convert a 7-decimal amount to stroops
pub fn to_stroops(amount: Decimal) -> WalletResult<i64> {
    let scaled = amount
        .checked_mul(Decimal::from(STROOPS_PER_UNIT))
        .ok_or_else(|| WalletError::invalid_input("Amount overflow"))?;
    if !scaled.fract().is_zero() {
        return Err(WalletError::invalid_input(format!(
            "Amount {} has more than {} decimal places",
            amount, DEFAULT_DECIMALS
        )));
    }
    scaled
        .to_i64()
        .ok_or_else(|| WalletError::invalid_input("Amount out of range"))
}

pub fn parse_stroops(amount: &str) -> WalletResult<i64> {
    to_stroops(parse_amount(amount)?)
}

pub fn from_stroops(stroops: i64) -> Decimal {
    Decimal::new(stroops, DEFAULT_DECIMALS).normalize()
}

/// XLM fee string to stroops; transaction fees are u32
pub fn fee_to_stroops(fee: &str) -> WalletResult<u32> {
    let stroops = parse_stroops(fee).map_err(|e| e.context("Invalid fee"))?;
    u32::try_from(stroops)
        .map_err(|_| WalletError::invalid_input(format!("Fee out of range: {}", fee)))
}

/// `round_half_up(amount × 10^decimals)` as used for Soroban i128 amounts
pub fn to_base_units(amount: Decimal, decimals: u32) -> WalletResult<i128> {
    if decimals > 28 {
        return Err(WalletError::invalid_input(format!("Unsupported decimals: {}", decimals)));
    }
    let rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let shift = decimals.saturating_sub(rounded.scale());
    10i128
        .checked_pow(shift)
        .and_then(|factor| rounded.mantissa().checked_mul(factor))
        .ok_or_else(|| WalletError::invalid_input("Amount overflow"))
}
