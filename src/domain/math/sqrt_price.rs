//! Concentrated-liquidity price decoding
//!
//! A V3 pool publishes its price as sqrtPriceX96, the square root of the
//! token1/token0 price in a Q64.96 fixed point. These helpers turn that
//! (and the tick) into decimal-adjusted prices for display. Display is
//! `f64`; nothing here feeds back into on-chain amounts.

use alloy_primitives::U256;

use super::MathError;

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// sqrt ratio at MIN_TICK; anything below cannot come from a live pool.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// sqrt ratio at MAX_TICK (exclusive upper bound).
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);

fn u256_to_f64(value: U256) -> f64 {
    let limbs = value.as_limbs();
    let mut acc = 0.0f64;
    for (i, limb) in limbs.iter().enumerate() {
        acc += (*limb as f64) * 2f64.powi(64 * i as i32);
    }
    acc
}

/// Price of token0 in units of token1, adjusted for token decimals.
///
/// `(sqrtPriceX96 / 2^96)^2` is the raw base-unit ratio; multiplying by
/// `10^(decimals0 - decimals1)` gives the human number (e.g. USD per WHYPE
/// for an 18/6-decimal pair).
pub fn price_from_sqrt_x96(
    sqrt_price_x96: U256,
    decimals0: u8,
    decimals1: u8,
) -> Result<f64, MathError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(MathError::SqrtPriceOutOfBounds);
    }

    let sqrt_ratio = u256_to_f64(sqrt_price_x96) / 2f64.powi(RESOLUTION as i32);
    let raw_price = sqrt_ratio * sqrt_ratio;
    Ok(raw_price * 10f64.powi(decimals0 as i32 - decimals1 as i32))
}

/// Price of token0 in token1 at a tick: `1.0001^tick`, decimal-adjusted.
///
/// Used as a sanity line next to the sqrt-price-derived value; the two
/// should agree to within one tick's worth of drift.
pub fn tick_to_price(tick: i32, decimals0: u8, decimals1: u8) -> Result<f64, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfBounds);
    }
    let raw_price = 1.0001f64.powi(tick);
    Ok(raw_price * 10f64.powi(decimals0 as i32 - decimals1 as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2^96: sqrt ratio of exactly 1.0
    fn q96() -> U256 {
        Q96
    }

    #[test]
    fn unit_price_at_q96() {
        let price = price_from_sqrt_x96(q96(), 18, 18).unwrap();
        assert!((price - 1.0).abs() < 1e-12);
    }

    #[test]
    fn decimal_adjustment() {
        // raw base-unit ratio 1.0 between an 18-decimal token0 and a
        // 6-decimal token1: one whole token0 (1e18 units) buys 1e18 units
        // of token1, which is 1e12 whole tokens.
        let price = price_from_sqrt_x96(q96(), 18, 6).unwrap();
        assert!((price - 1e12).abs() / 1e12 < 1e-12);

        let inverse = price_from_sqrt_x96(q96(), 6, 18).unwrap();
        assert!((inverse - 1e-12).abs() < 1e-24);
    }

    #[test]
    fn doubling_sqrt_quadruples_price() {
        let price = price_from_sqrt_x96(q96() * U256::from(2u64), 18, 18).unwrap();
        assert!((price - 4.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_are_enforced() {
        assert_eq!(
            price_from_sqrt_x96(U256::ZERO, 18, 18),
            Err(MathError::SqrtPriceOutOfBounds)
        );
        assert_eq!(
            price_from_sqrt_x96(MIN_SQRT_RATIO - U256::ONE, 18, 18),
            Err(MathError::SqrtPriceOutOfBounds)
        );
        assert_eq!(
            price_from_sqrt_x96(MAX_SQRT_RATIO, 18, 18),
            Err(MathError::SqrtPriceOutOfBounds)
        );
        assert!(price_from_sqrt_x96(MIN_SQRT_RATIO, 18, 18).is_ok());
    }

    #[test]
    fn tick_price_agrees_with_sqrt_price() {
        // tick 0 is price 1.0
        let at_zero = tick_to_price(0, 18, 18).unwrap();
        assert!((at_zero - 1.0).abs() < 1e-12);

        // ~tick 6932 doubles the price (1.0001^6932 ~= 2)
        let doubled = tick_to_price(6932, 18, 18).unwrap();
        assert!((doubled - 2.0).abs() < 0.001);

        assert_eq!(
            tick_to_price(MAX_TICK + 1, 18, 18),
            Err(MathError::TickOutOfBounds)
        );
        assert_eq!(
            tick_to_price(MIN_TICK - 1, 18, 18),
            Err(MathError::TickOutOfBounds)
        );
    }
}
