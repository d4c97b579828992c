//! Decimal string <-> base-unit conversion
//!
//! Amounts cross the CLI boundary as decimal strings ("1.5") and live as
//! `U256` base units everywhere else. Floats appear only at display time.

use alloy_primitives::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("amount is not a decimal number")]
    NotANumber,
    #[error("more than {decimals} fractional digits")]
    TooManyDecimals { decimals: u8 },
    #[error("amount does not fit in 256 bits")]
    TooLarge,
}

/// Parse a decimal string into base units for a token with `decimals`
/// fractional digits. `"1.5"` at 18 decimals is 1_500_000_000_000_000_000.
pub fn parse_units(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (trimmed, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Empty);
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::NotANumber);
    }
    if frac.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals { decimals });
    }

    let mut scaled = String::with_capacity(whole.len() + decimals as usize);
    scaled.push_str(whole);
    scaled.push_str(frac);
    for _ in frac.len()..decimals as usize {
        scaled.push('0');
    }
    if scaled.bytes().all(|b| b == b'0') {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(&scaled, 10).map_err(|_| AmountError::TooLarge)
}

/// Format base units as a decimal string, trailing zeros trimmed.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let frac = value % divisor;

    if frac.is_zero() {
        return whole.to_string();
    }

    let frac_str = format!("{:0>width$}", frac, width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, trimmed)
    }
}

/// Lossy conversion for display-side ratios (prices). Not for math.
pub fn to_f64(value: U256, decimals: u8) -> f64 {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let frac = value % divisor;

    let whole_f64: f64 = whole.to_string().parse().unwrap_or(0.0);
    let frac_f64: f64 = frac.to_string().parse().unwrap_or(0.0);

    whole_f64 + frac_f64 / 10f64.powi(decimals as i32)
}

/// Parse a raw base-unit integer (decimal or 0x hex).
pub fn parse_raw(input: &str) -> Option<U256> {
    let trimmed = input.trim();
    if let Some(hex_str) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        U256::from_str_radix(hex_str, 16).ok()
    } else {
        U256::from_str_radix(trimmed, 10).ok()
    }
}
