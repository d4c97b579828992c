//! Constant-product pair inspection
//!
//! Reads `getReserves` off a V2-style pair, derives the mid price, and
//! optionally runs the local swap formula against the live reserves.
//! The local numbers are labeled as such - they are this tool's own
//! arithmetic, not an on-chain quote.

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::{print_json, OutputFormat, Report};
use crate::domain::amount::{format_units, to_f64};
use crate::domain::math::constant_product;
use crate::domain::token::TokenMeta;
use crate::infrastructure::ethereum::contracts::{read_call, IUniswapV2Pair};
use crate::infrastructure::ethereum::{erc20, EthereumProvider};

#[derive(Debug, Serialize)]
pub struct PairSnapshot {
    pub address: String,
    pub token0: TokenMeta,
    pub token1: TokenMeta,
    pub reserve0: String,
    pub reserve1: String,
    pub block_timestamp_last: u32,
    /// token0 priced in token1 from the reserve ratio
    pub mid_price0_in_1: Option<f64>,
    pub mid_price1_in_0: Option<f64>,
    /// local constant-product quotes, when an amount was given
    pub local_quotes: Vec<LocalQuote>,
}

/// Output of the local swap formula for one direction.
#[derive(Debug, Serialize)]
pub struct LocalQuote {
    pub direction: String,
    pub amount_in: String,
    pub amount_out: Option<String>,
    pub price_impact_bps: Option<u64>,
    pub note: Option<String>,
}

pub async fn inspect(
    provider: &dyn EthereumProvider,
    address: Address,
    amount: Option<&str>,
    fee_bps: u32,
) -> Result<PairSnapshot> {
    let code = provider
        .code_at(address)
        .await
        .context("failed to fetch code")?;
    if code.is_empty() {
        anyhow::bail!("no contract code at {address}");
    }

    let token0: Address = read_call(provider, address, IUniswapV2Pair::token0Call {})
        .await
        .context("token0() failed - is this a V2 pair?")?;
    let token1: Address = read_call(provider, address, IUniswapV2Pair::token1Call {}).await?;
    let reserves = read_call(provider, address, IUniswapV2Pair::getReservesCall {}).await?;

    let (meta0, meta1) = futures::join!(
        erc20::fetch_meta(provider, token0),
        erc20::fetch_meta(provider, token1)
    );

    let reserve0 = U256::from(reserves.reserve0);
    let reserve1 = U256::from(reserves.reserve1);

    let r0 = to_f64(reserve0, meta0.decimals);
    let r1 = to_f64(reserve1, meta1.decimals);
    let mid_price0_in_1 = if r0 > 0.0 { Some(r1 / r0) } else { None };
    let mid_price1_in_0 = if r1 > 0.0 { Some(r0 / r1) } else { None };

    let mut local_quotes = Vec::new();
    if let Some(amount) = amount {
        local_quotes.push(local_quote(
            amount, &meta0, &meta1, reserve0, reserve1, fee_bps,
        ));
        local_quotes.push(local_quote(
            amount, &meta1, &meta0, reserve1, reserve0, fee_bps,
        ));
    }

    Ok(PairSnapshot {
        address: address.to_string(),
        token0: meta0,
        token1: meta1,
        reserve0: reserve0.to_string(),
        reserve1: reserve1.to_string(),
        block_timestamp_last: reserves.blockTimestampLast,
        mid_price0_in_1,
        mid_price1_in_0,
        local_quotes,
    })
}

fn local_quote(
    amount: &str,
    token_in: &TokenMeta,
    token_out: &TokenMeta,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
) -> LocalQuote {
    let direction = format!("{} -> {}", token_in.symbol, token_out.symbol);

    let amount_in = match crate::domain::amount::parse_units(amount, token_in.decimals) {
        Ok(value) => value,
        Err(err) => {
            return LocalQuote {
                direction,
                amount_in: amount.to_string(),
                amount_out: None,
                price_impact_bps: None,
                note: Some(err.to_string()),
            }
        }
    };

    match constant_product::amount_out(amount_in, reserve_in, reserve_out, fee_bps) {
        Ok(out) => {
            let impact =
                constant_product::price_impact_bps(amount_in, out, reserve_in, reserve_out).ok();
            LocalQuote {
                direction,
                amount_in: format_units(amount_in, token_in.decimals),
                amount_out: Some(format_units(out, token_out.decimals)),
                price_impact_bps: impact,
                note: None,
            }
        }
        Err(err) => LocalQuote {
            direction,
            amount_in: format_units(amount_in, token_in.decimals),
            amount_out: None,
            price_impact_bps: None,
            note: Some(err.to_string()),
        },
    }
}

pub fn print_snapshot(snapshot: &PairSnapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(snapshot),
        OutputFormat::Csv => report(snapshot).print_csv(),
        OutputFormat::Table => {
            report(snapshot).print();
            Ok(())
        }
    }
}

fn report(snapshot: &PairSnapshot) -> Report {
    let pair = format!("{}/{}", snapshot.token0.symbol, snapshot.token1.symbol);
    let reserve0 = crate::domain::amount::parse_raw(&snapshot.reserve0).unwrap_or_default();
    let reserve1 = crate::domain::amount::parse_raw(&snapshot.reserve1).unwrap_or_default();

    let mut report = Report::new(format!("pair {} ({})", snapshot.address, pair))
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
        .add(
            format!("reserve {}", snapshot.token0.symbol),
            format!(
                "{} (raw {})",
                format_units(reserve0, snapshot.token0.decimals),
                snapshot.reserve0
            ),
        )
        .add(
            format!("reserve {}", snapshot.token1.symbol),
            format!(
                "{} (raw {})",
                format_units(reserve1, snapshot.token1.decimals),
                snapshot.reserve1
            ),
        )
        .add(
            "last update",
            format!("block timestamp {}", snapshot.block_timestamp_last),
        );

    if let Some(price) = snapshot.mid_price0_in_1 {
        report = report.add(
            format!("mid {} per {}", snapshot.token1.symbol, snapshot.token0.symbol),
            format!("{:.8}", price),
        );
    }
    if let Some(price) = snapshot.mid_price1_in_0 {
        report = report.add(
            format!("mid {} per {}", snapshot.token0.symbol, snapshot.token1.symbol),
            format!("{:.8}", price),
        );
    }

    for quote in &snapshot.local_quotes {
        let value = match (&quote.amount_out, &quote.note) {
            (Some(out), _) => {
                let impact = quote
                    .price_impact_bps
                    .map(|bps| format!(", impact {} bps", bps))
                    .unwrap_or_default();
                format!("{} in -> {} out (local math{})", quote.amount_in, out, impact)
            }
            (None, Some(note)) => format!("failed: {note}"),
            (None, None) => "failed".to_string(),
        };
        report = report.add(format!("swap {}", quote.direction), value);
    }

    report
}
