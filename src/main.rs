use std::path::PathBuf;

use alloy::primitives::Address;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use dexpoke::config::{self, Config, DexConfig};
use dexpoke::core::OutputFormat;
use dexpoke::domain::amount;
use dexpoke::domain::token::{ResolvedToken, TokenMeta, TokenRegistry};
use dexpoke::infrastructure::ethereum::{
    create_provider, erc20, EthereumProvider, ProviderConfig,
};
use dexpoke::modules::{abi_tools, calc, pool, quote, reserves, status, token};

#[derive(Debug, Parser)]
#[command(
    name = "dexpoke",
    version,
    about = "dexpoke: read-only probing of DEX contracts on HyperEVM"
)]
struct Args {
    /// JSON-RPC endpoint (http(s):// or ws(s)://). Overrides env and config.
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Quote a swap across configured DEXes and fee tiers
    Quote {
        /// Input token: configured symbol or 0x address
        #[arg(long = "in")]
        token_in: String,

        /// Output token: configured symbol or 0x address
        #[arg(long = "out")]
        token_out: String,

        /// Input amount as a decimal (e.g. 1.5)
        #[arg(long)]
        amount: String,

        /// Only probe DEXes whose name contains this string
        #[arg(long)]
        dex: Option<String>,
    },

    /// Inspect a concentrated-liquidity pool (slot0, liquidity, prices)
    Pool {
        /// Pool contract address
        address: String,
    },

    /// Inspect a constant-product pair (reserves, mid price)
    Reserves {
        /// Pair contract address
        address: String,

        /// Also run the local swap formula for this decimal amount
        #[arg(long)]
        amount: Option<String>,

        /// Swap fee in basis points for the local formula
        #[arg(long, default_value_t = 30)]
        fee_bps: u32,
    },

    /// Probe an ERC-20 and verify configured metadata against the chain
    Token {
        /// Configured symbol or 0x address
        token: String,
    },

    /// Offline AMM arithmetic (no RPC involved)
    Calc {
        #[command(subcommand)]
        calc: CalcCommand,
    },

    /// ABI file tools: scan, diff, decode
    Abi {
        #[command(subcommand)]
        abi: AbiCommand,
    },

    /// Probe every configured RPC endpoint
    Status,
}

#[derive(Debug, Subcommand)]
enum CalcCommand {
    /// Constant-product output from raw base-unit reserves
    V2Out {
        /// Reserve of the input token (raw base units, decimal or 0x hex)
        #[arg(long)]
        reserve_in: String,

        /// Reserve of the output token (raw base units)
        #[arg(long)]
        reserve_out: String,

        /// Input amount (raw base units)
        #[arg(long)]
        amount: String,

        /// Swap fee in basis points (30 = 0.3%)
        #[arg(long, default_value_t = 30)]
        fee_bps: u32,
    },

    /// Decode a sqrtPriceX96 reading into decimal-adjusted prices
    V3Price {
        /// The pool's sqrtPriceX96 (decimal or 0x hex)
        #[arg(long)]
        sqrt_price_x96: String,

        #[arg(long, default_value_t = 18)]
        decimals0: u8,

        #[arg(long, default_value_t = 18)]
        decimals1: u8,
    },
}

#[derive(Debug, Subcommand)]
enum AbiCommand {
    /// Scan directories for ABI JSON files and summarize what was found
    Scan {
        /// Roots to scan (defaults to configured abi_paths, then cwd)
        paths: Vec<PathBuf>,

        /// List every discovered signature
        #[arg(long)]
        list: bool,
    },

    /// Compare the function shapes of two ABI files
    Diff { left: PathBuf, right: PathBuf },

    /// Decode calldata against scanned ABIs or an explicit signature
    Decode {
        /// 0x-prefixed calldata
        calldata: String,

        /// Function signature, e.g. "transfer(address,uint256)"
        #[arg(long)]
        sig: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load();

    match &args.command {
        Command::Quote {
            token_in,
            token_out,
            amount,
            dex,
        } => run_quote(&args, &config, token_in, token_out, amount, dex.as_deref()).await,
        Command::Pool { address } => {
            let address = parse_address(address)?;
            let provider = connect(&args, &config).await?;
            let snapshot = pool::inspect(provider.as_ref(), address).await?;
            pool::print_snapshot(&snapshot, args.output)
        }
        Command::Reserves {
            address,
            amount,
            fee_bps,
        } => {
            let address = parse_address(address)?;
            let provider = connect(&args, &config).await?;
            let snapshot =
                reserves::inspect(provider.as_ref(), address, amount.as_deref(), *fee_bps).await?;
            reserves::print_snapshot(&snapshot, args.output)
        }
        Command::Token { token } => {
            let registry = TokenRegistry::new(config.tokens.clone());
            let resolved = resolve_token(&registry, token)?;
            let provider = connect(&args, &config).await?;
            let probe = token::probe(provider.as_ref(), &registry, resolved.address).await?;
            token::print_probe(&probe, args.output)
        }
        Command::Calc { calc: command } => run_calc(command, args.output),
        Command::Abi { abi: command } => run_abi(command, &config, args.output),
        Command::Status => {
            let endpoints = status_endpoints(&args, &config);
            let statuses = status::probe_all(&endpoints).await;
            status::print_statuses(&statuses, args.output)?;
            if statuses.iter().all(|s| !s.ok) {
                bail!("no endpoint responded");
            }
            Ok(())
        }
    }
}

async fn run_quote(
    args: &Args,
    config: &Config,
    token_in: &str,
    token_out: &str,
    amount: &str,
    dex_filter: Option<&str>,
) -> Result<()> {
    let dexes = filter_dexes(&config.dexes, dex_filter)?;

    let registry = TokenRegistry::new(config.tokens.clone());
    let resolved_in = resolve_token(&registry, token_in)?;
    let resolved_out = resolve_token(&registry, token_out)?;

    let provider = connect(args, config).await?;
    let meta_in = token_meta_for(provider.as_ref(), &resolved_in).await;
    let meta_out = token_meta_for(provider.as_ref(), &resolved_out).await;

    let amount_in = amount::parse_units(amount, meta_in.decimals)
        .map_err(|err| anyhow!("bad --amount {amount}: {err}"))?;
    if amount_in.is_zero() {
        bail!("--amount must be positive");
    }

    let request = quote::QuoteRequest {
        address_in: resolved_in.address,
        address_out: resolved_out.address,
        token_in: meta_in,
        token_out: meta_out,
        amount_in,
    };

    let rows = quote::collect_quotes(provider.as_ref(), &dexes, &request).await;
    quote::print_quotes(&rows, &request, args.output)?;

    if rows.iter().all(|row| row.amount_out.is_none()) {
        bail!("no venue produced a quote");
    }
    Ok(())
}

fn run_calc(command: &CalcCommand, output: OutputFormat) -> Result<()> {
    match command {
        CalcCommand::V2Out {
            reserve_in,
            reserve_out,
            amount,
            fee_bps,
        } => {
            let reserve_in = parse_raw_amount(reserve_in, "--reserve-in")?;
            let reserve_out = parse_raw_amount(reserve_out, "--reserve-out")?;
            let amount = parse_raw_amount(amount, "--amount")?;
            let result = calc::v2_out(amount, reserve_in, reserve_out, *fee_bps)
                .map_err(|err| anyhow!("{err}"))?;
            calc::print_v2(&result, output)
        }
        CalcCommand::V3Price {
            sqrt_price_x96,
            decimals0,
            decimals1,
        } => {
            let sqrt = parse_raw_amount(sqrt_price_x96, "--sqrt-price-x96")?;
            let result =
                calc::v3_price(sqrt, *decimals0, *decimals1).map_err(|err| anyhow!("{err}"))?;
            calc::print_v3(&result, output)
        }
    }
}

fn run_abi(command: &AbiCommand, config: &Config, output: OutputFormat) -> Result<()> {
    match command {
        AbiCommand::Scan { paths, list } => {
            let roots = abi_roots(paths.clone(), config);
            let summary = abi_tools::scan(&roots);
            abi_tools::print_scan(&summary, *list, output)
        }
        AbiCommand::Diff { left, right } => {
            let diff = abi_tools::diff(left, right)
                .with_context(|| format!("diff {} vs {}", left.display(), right.display()))?;
            abi_tools::print_diff(&diff, left, right, output)
        }
        AbiCommand::Decode { calldata, sig } => {
            // only pay for a filesystem scan when the selector needs a lookup
            let registry = if sig.is_some() {
                Default::default()
            } else {
                let roots = abi_roots(Vec::new(), config);
                dexpoke::infrastructure::AbiScanner::scan_roots(&roots)
            };
            let decoded = abi_tools::decode_calldata(calldata, sig.as_deref(), &registry)
                .map_err(|err| anyhow!(err))?;
            abi_tools::print_decoded(&decoded, output)
        }
    }
}

/// Endpoint precedence: --rpc flag, then env, then config, then the
/// public HyperEVM endpoint.
fn resolve_endpoint(args: &Args, config: &Config) -> ProviderConfig {
    if let Some(rpc) = args.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return ProviderConfig::from_endpoint(rpc);
    }
    if let Some(rpc) = config::rpc_from_env() {
        return ProviderConfig::from_endpoint(&rpc);
    }
    for entry in &config.endpoints {
        if let Some(rpc) = entry.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return ProviderConfig::from_endpoint(rpc);
        }
        if let Some(ws) = entry.ws.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return ProviderConfig::from_endpoint(ws);
        }
    }
    ProviderConfig::from_endpoint(config::DEFAULT_RPC)
}

/// Every endpoint `status` should probe, labeled by origin.
fn status_endpoints(args: &Args, config: &Config) -> Vec<(String, ProviderConfig)> {
    let mut endpoints = Vec::new();

    if let Some(rpc) = args.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        endpoints.push(("cli".to_string(), ProviderConfig::from_endpoint(rpc)));
    }
    if let Some(rpc) = config::rpc_from_env() {
        endpoints.push(("env".to_string(), ProviderConfig::from_endpoint(&rpc)));
    }
    for (idx, entry) in config.endpoints.iter().enumerate() {
        let name = entry
            .name
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| format!("endpoint-{idx}"));
        if let Some(rpc) = entry.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            endpoints.push((name, ProviderConfig::from_endpoint(rpc)));
        } else if let Some(ws) = entry.ws.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            endpoints.push((name, ProviderConfig::from_endpoint(ws)));
        }
    }

    if endpoints.is_empty() {
        endpoints.push((
            "default".to_string(),
            ProviderConfig::from_endpoint(config::DEFAULT_RPC),
        ));
    }
    endpoints
}

async fn connect(args: &Args, config: &Config) -> Result<Box<dyn EthereumProvider>> {
    let endpoint = resolve_endpoint(args, config);
    create_provider(endpoint.clone())
        .await
        .with_context(|| format!("failed to connect to {}", endpoint.display()))
}

fn filter_dexes(dexes: &[DexConfig], filter: Option<&str>) -> Result<Vec<DexConfig>> {
    if dexes.is_empty() {
        let hint = config::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "the config file".to_string());
        bail!("no DEXes configured; add [[dexes]] entries to {hint}");
    }

    let filtered: Vec<DexConfig> = match filter {
        Some(needle) => {
            let needle = needle.to_lowercase();
            dexes
                .iter()
                .filter(|dex| dex.name.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        }
        None => dexes.to_vec(),
    };

    if filtered.is_empty() {
        bail!(
            "no configured DEX matches '{}'; known: {}",
            filter.unwrap_or_default(),
            dexes
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(filtered)
}

fn resolve_token(registry: &TokenRegistry, input: &str) -> Result<ResolvedToken> {
    registry.resolve(input).ok_or_else(|| {
        anyhow!("unknown token '{input}': not a configured symbol and not a valid address")
    })
}

fn parse_address(input: &str) -> Result<Address> {
    input
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid address: {input}"))
}

fn parse_raw_amount(input: &str, flag: &str) -> Result<alloy::primitives::U256> {
    amount::parse_raw(input).ok_or_else(|| anyhow!("{flag} is not a valid integer: {input}"))
}

fn abi_roots(paths: Vec<PathBuf>, config: &Config) -> Vec<PathBuf> {
    if !paths.is_empty() {
        return paths;
    }
    let configured: Vec<PathBuf> = config
        .abi_paths
        .iter()
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .collect();
    if !configured.is_empty() {
        return configured;
    }
    vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))]
}

/// On-chain metadata wins; config fills whatever the chain will not say.
async fn token_meta_for(provider: &dyn EthereumProvider, resolved: &ResolvedToken) -> TokenMeta {
    let symbol = match erc20::fetch_symbol(provider, resolved.address).await {
        Ok(symbol) => symbol,
        Err(_) => resolved
            .symbol
            .clone()
            .unwrap_or_else(|| config::short_addr(&resolved.address.to_string())),
    };
    let decimals = match erc20::fetch_decimals(provider, resolved.address).await {
        Ok(decimals) => decimals,
        Err(_) => resolved.decimals.unwrap_or(erc20::ASSUMED_DECIMALS),
    };

    TokenMeta {
        address: resolved.address.to_string(),
        symbol,
        decimals,
    }
}
