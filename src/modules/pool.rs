//! Concentrated-liquidity pool inspection
//!
//! Reads the descriptor fields a V3-style pool exposes (tokens, fee,
//! slot0, liquidity) and derives the decimal-adjusted spot price both
//! ways, plus the tick-implied price as a sanity line.

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::{print_json, OutputFormat, Report};
use crate::domain::math::sqrt_price;
use crate::domain::token::TokenMeta;
use crate::infrastructure::ethereum::contracts::{read_call, IV3Pool};
use crate::infrastructure::ethereum::{erc20, EthereumProvider};

#[derive(Debug, Serialize)]
pub struct PoolSnapshot {
    pub address: String,
    pub token0: TokenMeta,
    pub token1: TokenMeta,
    pub fee: u32,
    pub tick_spacing: i32,
    pub sqrt_price_x96: String,
    pub tick: i32,
    pub liquidity: String,
    /// token0 priced in token1, decimal-adjusted
    pub price0_in_1: Option<f64>,
    /// token1 priced in token0
    pub price1_in_0: Option<f64>,
    /// the price the current tick alone implies
    pub tick_price0_in_1: Option<f64>,
}

pub async fn inspect(provider: &dyn EthereumProvider, address: Address) -> Result<PoolSnapshot> {
    let code = provider
        .code_at(address)
        .await
        .context("failed to fetch code")?;
    if code.is_empty() {
        anyhow::bail!("no contract code at {address}");
    }

    let token0: Address = read_call(provider, address, IV3Pool::token0Call {})
        .await
        .context("token0() failed - is this a V3 pool?")?;
    let token1: Address = read_call(provider, address, IV3Pool::token1Call {}).await?;
    let fee = read_call(provider, address, IV3Pool::feeCall {}).await?;
    let tick_spacing = read_call(provider, address, IV3Pool::tickSpacingCall {}).await?;
    let liquidity: u128 = read_call(provider, address, IV3Pool::liquidityCall {}).await?;
    let slot0 = read_call(provider, address, IV3Pool::slot0Call {}).await?;

    let (meta0, meta1) = futures::join!(
        erc20::fetch_meta(provider, token0),
        erc20::fetch_meta(provider, token1)
    );

    let sqrt_price_x96 = U256::from(slot0.sqrtPriceX96);
    let tick = slot0.tick.as_i32();

    let price0_in_1 =
        sqrt_price::price_from_sqrt_x96(sqrt_price_x96, meta0.decimals, meta1.decimals).ok();
    let price1_in_0 = price0_in_1.filter(|p| *p > 0.0).map(|p| 1.0 / p);
    let tick_price0_in_1 = sqrt_price::tick_to_price(tick, meta0.decimals, meta1.decimals).ok();

    Ok(PoolSnapshot {
        address: address.to_string(),
        token0: meta0,
        token1: meta1,
        fee: fee.to::<u32>(),
        tick_spacing: tick_spacing.as_i32(),
        sqrt_price_x96: sqrt_price_x96.to_string(),
        tick,
        liquidity: liquidity.to_string(),
        price0_in_1,
        price1_in_0,
        tick_price0_in_1,
    })
}

pub fn print_snapshot(snapshot: &PoolSnapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(snapshot),
        OutputFormat::Csv => report(snapshot).print_csv(),
        OutputFormat::Table => {
            report(snapshot).print();
            Ok(())
        }
    }
}

fn report(snapshot: &PoolSnapshot) -> Report {
    let pair = format!("{}/{}", snapshot.token0.symbol, snapshot.token1.symbol);
    let mut report = Report::new(format!("pool {} ({})", snapshot.address, pair))
        .add(
            "token0",
            format!(
                "{} ({}, {} decimals)",
                snapshot.token0.symbol, snapshot.token0.address, snapshot.token0.decimals
            ),
        )
        .add(
            "token1",
            format!(
                "{} ({}, {} decimals)",
                snapshot.token1.symbol, snapshot.token1.address, snapshot.token1.decimals
            ),
        )
        .add("fee", format!("{} ({}%)", snapshot.fee, snapshot.fee as f64 / 10_000.0))
        .add("tick spacing", snapshot.tick_spacing.to_string())
        .add("sqrtPriceX96", snapshot.sqrt_price_x96.clone())
        .add("tick", snapshot.tick.to_string())
        .add("liquidity", snapshot.liquidity.clone());

    if let Some(price) = snapshot.price0_in_1 {
        report = report.add(
            format!("{} per {}", snapshot.token1.symbol, snapshot.token0.symbol),
            format!("{:.8}", price),
        );
    }
    if let Some(price) = snapshot.price1_in_0 {
        report = report.add(
            format!("{} per {}", snapshot.token0.symbol, snapshot.token1.symbol),
            format!("{:.8}", price),
        );
    }
    if let Some(price) = snapshot.tick_price0_in_1 {
        report = report.add("price at tick", format!("{:.8}", price));
    }
    report
}
