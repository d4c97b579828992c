//! Cross-DEX swap quoting
//!
//! Fans the same (token in, token out, amount) question out to every
//! configured venue: `getAmountsOut` on V2 routers, `quoteExactInputSingle`
//! per fee tier on V3 quoters. Probes run concurrently and a failed probe
//! is a row with a note, never a failed command.

use alloy::primitives::{aliases::U24, Address, U160, U256};
use anyhow::Result;
use futures::future::{join_all, BoxFuture};
use serde::Serialize;

use crate::config::{DexConfig, DexKind};
use crate::core::{print_csv_rows, print_json, print_table, OutputFormat};
use crate::domain::amount::{format_units, to_f64};
use crate::domain::token::TokenMeta;
use crate::infrastructure::ethereum::contracts::{read_call, IQuoterV2, IUniswapV2Router02};
use crate::infrastructure::ethereum::EthereumProvider;

pub struct QuoteRequest {
    pub token_in: TokenMeta,
    pub token_out: TokenMeta,
    pub address_in: Address,
    pub address_out: Address,
    pub amount_in: U256,
}

/// One venue's answer, ready for any output format.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteRow {
    pub dex: String,
    pub kind: &'static str,
    pub fee_tier: Option<u32>,
    pub amount_out: Option<String>,
    pub amount_out_raw: Option<String>,
    pub price: Option<f64>,
    pub gas_estimate: Option<u64>,
    pub note: Option<String>,
}

struct Probe {
    dex: String,
    kind: &'static str,
    fee_tier: Option<u32>,
    outcome: Result<ProbeOk, String>,
}

struct ProbeOk {
    amount_out: U256,
    gas_estimate: Option<u64>,
}

/// Quote the request against every venue, best answer first.
pub async fn collect_quotes(
    provider: &dyn EthereumProvider,
    dexes: &[DexConfig],
    request: &QuoteRequest,
) -> Vec<QuoteRow> {
    let mut probes: Vec<BoxFuture<'_, Probe>> = Vec::new();
    for dex in dexes {
        match dex.kind {
            DexKind::V2 => probes.push(Box::pin(quote_v2(provider, dex, request))),
            DexKind::V3 => {
                for &tier in &dex.fee_tiers {
                    probes.push(Box::pin(quote_v3(provider, dex, request, tier)));
                }
            }
        }
    }

    let mut results = join_all(probes).await;
    // successful quotes first, highest output wins
    results.sort_by(|a, b| match (&a.outcome, &b.outcome) {
        (Ok(a), Ok(b)) => b.amount_out.cmp(&a.amount_out),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => std::cmp::Ordering::Equal,
    });

    results
        .into_iter()
        .map(|probe| into_row(probe, request))
        .collect()
}

async fn quote_v2(
    provider: &dyn EthereumProvider,
    dex: &DexConfig,
    request: &QuoteRequest,
) -> Probe {
    let outcome = match parse_contract_address(dex.router.as_deref(), "router") {
        Ok(router) => {
            let call = IUniswapV2Router02::getAmountsOutCall {
                amountIn: request.amount_in,
                path: vec![request.address_in, request.address_out],
            };
            match read_call(provider, router, call).await {
                Ok(amounts) => match amounts.last() {
                    Some(&amount_out) => Ok(ProbeOk {
                        amount_out,
                        gas_estimate: None,
                    }),
                    None => Err("router returned empty amounts".to_string()),
                },
                Err(err) => Err(classify_error(&err)),
            }
        }
        Err(note) => Err(note),
    };

    Probe {
        dex: dex.name.clone(),
        kind: "v2",
        fee_tier: None,
        outcome,
    }
}

async fn quote_v3(
    provider: &dyn EthereumProvider,
    dex: &DexConfig,
    request: &QuoteRequest,
    fee_tier: u32,
) -> Probe {
    let outcome = match parse_contract_address(dex.quoter.as_deref(), "quoter") {
        Ok(quoter) => {
            let call = IQuoterV2::quoteExactInputSingleCall {
                params: IQuoterV2::QuoteExactInputSingleParams {
                    tokenIn: request.address_in,
                    tokenOut: request.address_out,
                    amountIn: request.amount_in,
                    fee: U24::from(fee_tier),
                    sqrtPriceLimitX96: U160::ZERO,
                },
            };
            match read_call(provider, quoter, call).await {
                Ok(ret) => Ok(ProbeOk {
                    amount_out: ret.amountOut,
                    gas_estimate: u64::try_from(ret.gasEstimate).ok(),
                }),
                Err(err) => Err(classify_error(&err)),
            }
        }
        Err(note) => Err(note),
    };

    Probe {
        dex: dex.name.clone(),
        kind: "v3",
        fee_tier: Some(fee_tier),
        outcome,
    }
}

fn parse_contract_address(configured: Option<&str>, role: &str) -> Result<Address, String> {
    let Some(raw) = configured.map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(format!("no {role} configured"));
    };
    raw.parse()
        .map_err(|_| format!("bad {role} address: {raw}"))
}

/// A reverted quote on a sparse pair is expected data, not a failure.
fn classify_error(err: &anyhow::Error) -> String {
    let text = format!("{err:#}");
    if text.contains("revert") {
        "no pool (quote reverted)".to_string()
    } else {
        truncate(&text, 120)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}…")
}

fn into_row(probe: Probe, request: &QuoteRequest) -> QuoteRow {
    let (amount_out, amount_out_raw, price, gas_estimate, note) = match probe.outcome {
        Ok(ok) => {
            let amount_in_f = to_f64(request.amount_in, request.token_in.decimals);
            let amount_out_f = to_f64(ok.amount_out, request.token_out.decimals);
            let price = if amount_in_f > 0.0 {
                Some(amount_out_f / amount_in_f)
            } else {
                None
            };
            (
                Some(format_units(ok.amount_out, request.token_out.decimals)),
                Some(ok.amount_out.to_string()),
                price,
                ok.gas_estimate,
                None,
            )
        }
        Err(note) => (None, None, None, None, Some(note)),
    };

    QuoteRow {
        dex: probe.dex,
        kind: probe.kind,
        fee_tier: probe.fee_tier,
        amount_out,
        amount_out_raw,
        price,
        gas_estimate,
        note,
    }
}

pub fn print_quotes(
    rows: &[QuoteRow],
    request: &QuoteRequest,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Csv => print_csv_rows(rows),
        OutputFormat::Table => {
            println!(
                "quote {} {} -> {}",
                format_units(request.amount_in, request.token_in.decimals),
                request.token_in.symbol,
                request.token_out.symbol,
            );
            let table_rows: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    vec![
                        row.dex.clone(),
                        row.kind.to_string(),
                        row.fee_tier.map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
                        row.amount_out.clone().unwrap_or_else(|| "-".into()),
                        row.price
                            .map(|p| format!("{:.6}", p))
                            .unwrap_or_else(|| "-".into()),
                        row.gas_estimate
                            .map(|g| g.to_string())
                            .unwrap_or_else(|| "-".into()),
                        row.note.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(
                &["dex", "kind", "fee", "amount out", "price", "gas est", "note"],
                &table_rows,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_address_parsing() {
        assert!(parse_contract_address(None, "router").is_err());
        assert!(parse_contract_address(Some("  "), "router").is_err());
        assert!(parse_contract_address(Some("0x1234"), "router").is_err());
        assert!(parse_contract_address(
            Some("0x5555555555555555555555555555555555555555"),
            "router"
        )
        .is_ok());
    }

    #[test]
    fn revert_is_no_pool() {
        let err = anyhow::anyhow!("server returned an error response: execution reverted");
        assert_eq!(classify_error(&err), "no pool (quote reverted)");

        let err = anyhow::anyhow!("connection refused");
        assert_eq!(classify_error(&err), "connection refused");
    }

    #[test]
    fn truncate_long_errors() {
        let long = "x".repeat(300);
        let short = truncate(&long, 120);
        assert_eq!(short.chars().count(), 121);
        assert!(short.ends_with('…'));
    }
}
