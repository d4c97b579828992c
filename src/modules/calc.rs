//! Offline AMM calculators
//!
//! The chain-free counterparts of the quoting commands. These exist to
//! make the arithmetic inspectable: every output line shows its inputs,
//! so a surprising on-chain quote can be checked by hand. For trading,
//! quote the on-chain router or quoter instead - it sees the real state.

use alloy::primitives::U256;
use anyhow::Result;
use serde::Serialize;

use crate::core::{print_json, OutputFormat, Report};
use crate::domain::math::{constant_product, sqrt_price, MathError};

#[derive(Debug, Serialize)]
pub struct V2CalcResult {
    pub amount_in: String,
    pub reserve_in: String,
    pub reserve_out: String,
    pub fee_bps: u32,
    pub amount_out: String,
    /// fee-free output at the marginal price, for reference
    pub spot_out: String,
    pub price_impact_bps: u64,
}

/// Run the constant-product formula over raw base-unit inputs.
pub fn v2_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
) -> Result<V2CalcResult, MathError> {
    let amount_out = constant_product::amount_out(amount_in, reserve_in, reserve_out, fee_bps)?;
    let spot_out = constant_product::spot_out(amount_in, reserve_in, reserve_out)?;
    let price_impact_bps =
        constant_product::price_impact_bps(amount_in, amount_out, reserve_in, reserve_out)?;

    Ok(V2CalcResult {
        amount_in: amount_in.to_string(),
        reserve_in: reserve_in.to_string(),
        reserve_out: reserve_out.to_string(),
        fee_bps,
        amount_out: amount_out.to_string(),
        spot_out: spot_out.to_string(),
        price_impact_bps,
    })
}

#[derive(Debug, Serialize)]
pub struct V3PriceResult {
    pub sqrt_price_x96: String,
    pub decimals0: u8,
    pub decimals1: u8,
    pub price0_in_1: f64,
    pub price1_in_0: f64,
}

/// Decode a sqrtPriceX96 reading into decimal-adjusted prices.
pub fn v3_price(
    sqrt_price_x96: U256,
    decimals0: u8,
    decimals1: u8,
) -> Result<V3PriceResult, MathError> {
    let price0_in_1 = sqrt_price::price_from_sqrt_x96(sqrt_price_x96, decimals0, decimals1)?;
    // bounded sqrt price means a strictly positive ratio
    let price1_in_0 = 1.0 / price0_in_1;

    Ok(V3PriceResult {
        sqrt_price_x96: sqrt_price_x96.to_string(),
        decimals0,
        decimals1,
        price0_in_1,
        price1_in_0,
    })
}

pub fn print_v2(result: &V2CalcResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Csv => v2_report(result).print_csv(),
        OutputFormat::Table => {
            v2_report(result).print();
            Ok(())
        }
    }
}

fn v2_report(result: &V2CalcResult) -> Report {
    Report::new("constant-product swap (local math)")
        .add("amount in", result.amount_in.clone())
        .add("reserve in", result.reserve_in.clone())
        .add("reserve out", result.reserve_out.clone())
        .add("fee", format!("{} bps", result.fee_bps))
        .add("amount out", result.amount_out.clone())
        .add("spot out (no fee)", result.spot_out.clone())
        .add("price impact", format!("{} bps", result.price_impact_bps))
}

pub fn print_v3(result: &V3PriceResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Csv => v3_report(result).print_csv(),
        OutputFormat::Table => {
            v3_report(result).print();
            Ok(())
        }
    }
}

fn v3_report(result: &V3PriceResult) -> Report {
    Report::new("sqrtPriceX96 decode (local math)")
        .add("sqrtPriceX96", result.sqrt_price_x96.clone())
        .add(
            "decimals",
            format!("token0 {}, token1 {}", result.decimals0, result.decimals1),
        )
        .add("token0 in token1", format!("{:.12}", result.price0_in_1))
        .add("token1 in token0", format!("{:.12}", result.price1_in_0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v2_out_reports_derivation() {
        let result = v2_out(
            U256::from(1_000_000_000_000_000_000u128),
            U256::from(100_000_000_000_000_000_000u128),
            U256::from(100_000_000_000_000_000_000u128),
            30,
        )
        .unwrap();
        assert_eq!(result.amount_out, "987158034397061298");
        // spot reference is 1e18 exactly for a balanced pool
        assert_eq!(result.spot_out, "1000000000000000000");
        assert!(result.price_impact_bps >= 30);
    }

    #[test]
    fn v2_out_surfaces_math_errors() {
        assert!(matches!(
            v2_out(U256::from(1u64), U256::ZERO, U256::ZERO, 30),
            Err(MathError::ZeroReserves)
        ));
    }

    #[test]
    fn v3_price_inverts() {
        let result = v3_price(sqrt_price::Q96, 18, 18).unwrap();
        assert!((result.price0_in_1 - 1.0).abs() < 1e-12);
        assert!((result.price1_in_0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn v3_price_rejects_zero() {
        assert!(matches!(
            v3_price(U256::ZERO, 18, 18),
            Err(MathError::SqrtPriceOutOfBounds)
        ));
    }
}
