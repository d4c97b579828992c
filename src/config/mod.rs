use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// Default public HyperEVM mainnet endpoint.
pub const DEFAULT_RPC: &str = "https://rpc.hyperliquid.xyz/evm";

/// HyperEVM chain ids. Anything else gets flagged by `status`.
pub const HYPEREVM_MAINNET: u64 = 999;
pub const HYPEREVM_TESTNET: u64 = 998;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSpec {
    pub address: String,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub rpc: Option<String>,
    pub ws: Option<String>,
}

/// Which quoting surface a DEX deployment exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DexKind {
    V2,
    V3,
}

/// One DEX deployment (HyperSwap V2, HyperSwap V3, KittenSwap, ...).
///
/// V2 entries need `router`; V3 entries need `quoter`. `factory` is
/// optional either way and only used for pair/pool discovery.
#[derive(Debug, Clone, Deserialize)]
pub struct DexConfig {
    pub name: String,
    pub kind: DexKind,
    pub router: Option<String>,
    pub factory: Option<String>,
    pub quoter: Option<String>,

    /// V3 fee tiers to probe, in hundredths of a bip (500 = 0.05%).
    #[serde(default = "default_fee_tiers")]
    pub fee_tiers: Vec<u32>,

    /// V2 swap fee in basis points (30 = the classic 0.3%).
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u32,
}

fn default_fee_tiers() -> Vec<u32> {
    vec![100, 500, 3000, 10000]
}

fn default_fee_bps() -> u32 {
    30
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tokens: Vec<TokenSpec>,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    #[serde(default)]
    pub dexes: Vec<DexConfig>,

    #[serde(default)]
    pub abi_paths: Vec<String>,
}

impl TokenSpec {
    pub fn normalized_address(&self) -> String {
        normalize_address(&self.address)
    }

    pub fn display_symbol(&self) -> String {
        self.symbol
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| short_addr(&self.address))
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    toml::from_str::<Config>(&content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("DEXPOKE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("dexpoke").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("dexpoke").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "dexpoke", "dexpoke")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// RPC endpoint from the environment, if set.
///
/// `DEXPOKE_RPC_URL` is the canonical name; `HYPEREVM_RPC_URL` is accepted
/// because existing probing scripts used it.
pub fn rpc_from_env() -> Option<String> {
    for key in ["DEXPOKE_RPC_URL", "HYPEREVM_RPC_URL"] {
        if let Ok(value) = std::env::var(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    format!("0x{}", payload.to_lowercase())
}

pub fn short_addr(value: &str) -> String {
    let value = value.trim();
    if value.len() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}..{}", start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let raw = r#"
            abi_paths = ["./abi"]

            [[endpoints]]
            name = "mainnet"
            rpc = "https://rpc.hyperliquid.xyz/evm"

            [[tokens]]
            address = "0x5555555555555555555555555555555555555555"
            symbol = "WHYPE"
            decimals = 18

            [[dexes]]
            name = "hyperswap-v3"
            kind = "v3"
            quoter = "0x0000000000000000000000000000000000000001"
            fee_tiers = [500, 3000]

            [[dexes]]
            name = "kittenswap"
            kind = "v2"
            router = "0x0000000000000000000000000000000000000002"
            fee_bps = 25
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.tokens.len(), 1);
        assert_eq!(config.tokens[0].display_symbol(), "WHYPE");
        assert_eq!(config.dexes.len(), 2);
        assert_eq!(config.dexes[0].kind, DexKind::V3);
        assert_eq!(config.dexes[0].fee_tiers, vec![500, 3000]);
        assert_eq!(config.dexes[1].fee_bps, 25);
        // defaults fill in what the file leaves out
        assert_eq!(config.dexes[0].fee_bps, 30);
        assert_eq!(config.dexes[1].fee_tiers, vec![100, 500, 3000, 10000]);
    }

    #[test]
    fn malformed_config_falls_back_to_default() {
        let config = toml::from_str::<Config>("tokens = 3").unwrap_or_default();
        assert!(config.tokens.is_empty());
        assert!(config.dexes.is_empty());
    }

    #[test]
    fn normalize_and_shorten() {
        assert_eq!(
            normalize_address("0XAbCd000000000000000000000000000000000001"),
            "0xabcd000000000000000000000000000000000001"
        );
        assert_eq!(
            short_addr("0x5555555555555555555555555555555555555555"),
            "0x5555..5555"
        );
        assert_eq!(short_addr("0xabc"), "0xabc");
    }
}
