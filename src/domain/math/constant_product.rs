//! Constant-product (x*y=k) swap math
//!
//! The fee is expressed in basis points out of 10000, so the classic
//! 0.3% pool is `fee_bps = 30` (the 997/1000 numerator form) and
//! non-standard V2 forks are expressible without code changes.

use alloy_primitives::U256;

use super::{mul_div, MathError};

pub const FEE_DENOMINATOR_BPS: u64 = 10_000;

fn check_common(reserve_in: U256, reserve_out: U256, fee_bps: u32) -> Result<U256, MathError> {
    if fee_bps as u64 >= FEE_DENOMINATOR_BPS {
        return Err(MathError::FeeOutOfRange);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(MathError::ZeroReserves);
    }
    Ok(U256::from(FEE_DENOMINATOR_BPS - fee_bps as u64))
}

/// Output amount for an exact input:
/// `out = in*f*r_out / (r_in*10000 + in*f)` with `f = 10000 - fee_bps`.
pub fn amount_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
) -> Result<U256, MathError> {
    let fee_factor = check_common(reserve_in, reserve_out, fee_bps)?;
    if amount_in.is_zero() {
        return Err(MathError::ZeroInput);
    }

    let amount_in_with_fee = amount_in
        .checked_mul(fee_factor)
        .ok_or(MathError::Overflow)?;
    let numerator = amount_in_with_fee
        .checked_mul(reserve_out)
        .ok_or(MathError::Overflow)?;
    let denominator = reserve_in
        .checked_mul(U256::from(FEE_DENOMINATOR_BPS))
        .ok_or(MathError::Overflow)?
        .checked_add(amount_in_with_fee)
        .ok_or(MathError::Overflow)?;

    Ok(numerator / denominator)
}

/// Input amount needed for an exact output, rounded up.
pub fn amount_in(
    amount_out: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
) -> Result<U256, MathError> {
    let fee_factor = check_common(reserve_in, reserve_out, fee_bps)?;
    if amount_out.is_zero() {
        return Err(MathError::ZeroInput);
    }
    if amount_out >= reserve_out {
        return Err(MathError::InsufficientReserves);
    }

    let numerator = reserve_in
        .checked_mul(amount_out)
        .ok_or(MathError::Overflow)?
        .checked_mul(U256::from(FEE_DENOMINATOR_BPS))
        .ok_or(MathError::Overflow)?;
    let denominator = (reserve_out - amount_out)
        .checked_mul(fee_factor)
        .ok_or(MathError::Overflow)?;

    let quotient = numerator / denominator;
    quotient.checked_add(U256::ONE).ok_or(MathError::Overflow)
}

/// Fee-free reference output at the current marginal price, used to
/// measure price impact.
pub fn spot_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
) -> Result<U256, MathError> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(MathError::ZeroReserves);
    }
    mul_div(amount_in, reserve_out, reserve_in)
}

/// Shortfall of the executed output vs the spot reference, in basis
/// points. Covers both the fee and the slippage along the curve.
pub fn price_impact_bps(
    amount_in: U256,
    amount_out: U256,
    reserve_in: U256,
    reserve_out: U256,
) -> Result<u64, MathError> {
    let spot = spot_out(amount_in, reserve_in, reserve_out)?;
    if spot.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    if amount_out >= spot {
        return Ok(0);
    }
    let shortfall = spot - amount_out;
    let bps = mul_div(shortfall, U256::from(FEE_DENOMINATOR_BPS), spot)?;
    Ok(bps.to::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u128) -> U256 {
        U256::from(v)
    }

    #[test]
    fn matches_uniswap_reference_values() {
        // 1e18 in against 100e18/100e18 reserves at 0.3%:
        // out = 1e18*997*100e18 / (100e18*1000 + 1e18*997)
        let out = amount_out(
            u(1_000_000_000_000_000_000),
            u(100_000_000_000_000_000_000),
            u(100_000_000_000_000_000_000),
            30,
        )
        .unwrap();
        assert_eq!(out, u(987_158_034_397_061_298));
    }

    #[test]
    fn zero_fee_is_pure_curve() {
        // 10 in against 100/100 with no fee: out = 10*100/110
        let out = amount_out(u(10), u(100), u(100), 0).unwrap();
        assert_eq!(out, u(9));
    }

    #[test]
    fn amount_in_inverts_amount_out() {
        let reserve_in = u(5_000_000_000_000);
        let reserve_out = u(3_000_000_000_000);
        let out = amount_out(u(1_000_000_000), reserve_in, reserve_out, 30).unwrap();
        let needed = amount_in(out, reserve_in, reserve_out, 30).unwrap();
        // rounding up means we may need a hair more, never less
        assert!(needed >= u(999_999_000));
        assert!(needed <= u(1_000_001_000));
        let replay = amount_out(needed, reserve_in, reserve_out, 30).unwrap();
        assert!(replay >= out);
    }

    #[test]
    fn guards_fire() {
        assert_eq!(
            amount_out(u(1), U256::ZERO, u(10), 30),
            Err(MathError::ZeroReserves)
        );
        assert_eq!(
            amount_out(U256::ZERO, u(10), u(10), 30),
            Err(MathError::ZeroInput)
        );
        assert_eq!(
            amount_out(u(1), u(10), u(10), 10_000),
            Err(MathError::FeeOutOfRange)
        );
        assert_eq!(
            amount_in(u(10), u(100), u(10), 30),
            Err(MathError::InsufficientReserves)
        );
    }

    #[test]
    fn impact_grows_with_size() {
        let reserve = u(1_000_000_000_000_000_000_000); // 1000e18
        let small_in = u(1_000_000_000_000_000_000); // 1e18
        let big_in = u(100_000_000_000_000_000_000); // 100e18

        let small_out = amount_out(small_in, reserve, reserve, 30).unwrap();
        let big_out = amount_out(big_in, reserve, reserve, 30).unwrap();

        let small_impact = price_impact_bps(small_in, small_out, reserve, reserve).unwrap();
        let big_impact = price_impact_bps(big_in, big_out, reserve, reserve).unwrap();

        // ~0.3% fee + ~0.1% slippage for the small trade
        assert!(small_impact >= 30 && small_impact < 50, "{small_impact}");
        // the big trade moves the pool ~10%
        assert!(big_impact > 900, "{big_impact}");
    }
}
