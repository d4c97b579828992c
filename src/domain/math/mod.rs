//! AMM price arithmetic, chain-free and fully guarded
//!
//! Every failure mode the throwaway-script era left to chance (zero
//! reserves, overflow, out-of-range prices) is a typed error here.

pub mod constant_product;
pub mod sqrt_price;

use alloy_primitives::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("pool has zero reserves")]
    ZeroReserves,
    #[error("input amount is zero")]
    ZeroInput,
    #[error("fee must be below 10000 basis points")]
    FeeOutOfRange,
    #[error("requested amount exceeds pool reserves")]
    InsufficientReserves,
    #[error("sqrt price outside the valid pool range")]
    SqrtPriceOutOfBounds,
    #[error("tick outside the valid pool range")]
    TickOutOfBounds,
}

/// `a * b / denominator`, erroring instead of wrapping.
///
/// Probe inputs are reserve-sized (<= 2^112), so a 256-bit intermediate is
/// plenty; genuinely absurd inputs surface as `Overflow` rather than a
/// silently wrong quote.
pub(crate) fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow)?;
    Ok(product / denominator)
}
