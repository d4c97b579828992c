//! ERC-20 probing and config verification
//!
//! The old scripts hardcoded symbols and decimals per file and sometimes
//! guessed wrong. This probe reads the chain and, when the config carries
//! an expectation, says whether it still holds.

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::{print_json, OutputFormat, Report};
use crate::domain::amount::format_units;
use crate::domain::token::TokenRegistry;
use crate::infrastructure::ethereum::{erc20, EthereumProvider};

#[derive(Debug, Serialize)]
pub struct TokenProbe {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub total_supply: Option<String>,
    pub checks: Vec<FieldCheck>,
}

/// Config expectation vs on-chain truth for one field.
#[derive(Debug, Serialize)]
pub struct FieldCheck {
    pub field: String,
    pub configured: String,
    pub onchain: String,
    pub matches: bool,
}

pub async fn probe(
    provider: &dyn EthereumProvider,
    registry: &TokenRegistry,
    address: Address,
) -> Result<TokenProbe> {
    let code = provider
        .code_at(address)
        .await
        .context("failed to fetch code")?;
    if code.is_empty() {
        anyhow::bail!("no contract code at {address}");
    }

    let (name, symbol, decimals, total_supply) = futures::join!(
        erc20::fetch_name(provider, address),
        erc20::fetch_symbol(provider, address),
        erc20::fetch_decimals(provider, address),
        erc20::fetch_total_supply(provider, address),
    );

    let name = name.ok();
    let symbol = symbol.ok();
    let decimals = decimals.ok();
    let total_supply = total_supply
        .ok()
        .map(|supply| format_units(supply, decimals.unwrap_or(0)));

    let mut checks = Vec::new();
    if let Some(spec) = registry.expectation_for(address) {
        if let Some(expected) = spec.symbol.as_deref() {
            let actual = symbol.as_deref().unwrap_or("(unreadable)");
            checks.push(FieldCheck {
                field: "symbol".to_string(),
                configured: expected.to_string(),
                onchain: actual.to_string(),
                matches: Some(expected) == symbol.as_deref(),
            });
        }
        if let Some(expected) = spec.decimals {
            let actual = decimals
                .map(|d| d.to_string())
                .unwrap_or_else(|| "(unreadable)".to_string());
            checks.push(FieldCheck {
                field: "decimals".to_string(),
                configured: expected.to_string(),
                onchain: actual,
                matches: Some(expected) == decimals,
            });
        }
    }

    Ok(TokenProbe {
        address: address.to_string(),
        name,
        symbol,
        decimals,
        total_supply,
        checks,
    })
}

pub fn print_probe(probe: &TokenProbe, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(probe),
        OutputFormat::Csv => report(probe).print_csv(),
        OutputFormat::Table => {
            report(probe).print();
            Ok(())
        }
    }
}

fn report(probe: &TokenProbe) -> Report {
    let unreadable = || "(unreadable)".to_string();
    let mut report = Report::new(format!("token {}", probe.address))
        .add("name", probe.name.clone().unwrap_or_else(unreadable))
        .add("symbol", probe.symbol.clone().unwrap_or_else(unreadable))
        .add(
            "decimals",
            probe
                .decimals
                .map(|d| d.to_string())
                .unwrap_or_else(unreadable),
        )
        .add(
            "total supply",
            probe.total_supply.clone().unwrap_or_else(unreadable),
        );

    for check in &probe.checks {
        let verdict = if check.matches { "MATCH" } else { "MISMATCH" };
        report = report.add(
            format!("config {}", check.field),
            format!(
                "{} (configured {}, on-chain {})",
                verdict, check.configured, check.onchain
            ),
        );
    }
    report
}
