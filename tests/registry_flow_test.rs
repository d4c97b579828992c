//! Config -> token registry -> amount conversion, the path every
//! quote request takes before touching the network.

use alloy_primitives::U256;
use dexpoke::config::Config;
use dexpoke::domain::amount;
use dexpoke::domain::token::TokenRegistry;

const CONFIG: &str = r#"
    [[endpoints]]
    name = "mainnet"
    rpc = "https://rpc.hyperliquid.xyz/evm"

    [[tokens]]
    address = "0x5555555555555555555555555555555555555555"
    symbol = "WHYPE"
    decimals = 18

    [[tokens]]
    address = "0x00000000000000000000000000000000000000aa"
    symbol = "USDT0"
    decimals = 6

    [[dexes]]
    name = "hyperswap-v3"
    kind = "v3"
    quoter = "0x00000000000000000000000000000000000000b0"
"#;

#[test]
fn symbol_to_base_units_and_back() {
    let config: Config = toml::from_str(CONFIG).unwrap();
    let registry = TokenRegistry::new(config.tokens.clone());

    let whype = registry.resolve("whype").unwrap();
    let usdt = registry.resolve("USDT0").unwrap();

    // "1.5 WHYPE" becomes 1.5e18 base units under the configured decimals
    let units = amount::parse_units("1.5", whype.decimals.unwrap()).unwrap();
    assert_eq!(units, U256::from(1_500_000_000_000_000_000u128));
    assert_eq!(amount::format_units(units, 18), "1.5");

    // the 6-decimal token scales differently
    let units = amount::parse_units("1.5", usdt.decimals.unwrap()).unwrap();
    assert_eq!(units, U256::from(1_500_000u64));

    // an address the config does not know still resolves, bare
    let unknown = registry
        .resolve("0x00000000000000000000000000000000000000cc")
        .unwrap();
    assert!(unknown.symbol.is_none());

    // config expectations are reachable for the verifier
    let spec = registry.expectation_for(whype.address).unwrap();
    assert_eq!(spec.decimals, Some(18));
}

#[test]
fn dex_defaults_apply() {
    let config: Config = toml::from_str(CONFIG).unwrap();
    assert_eq!(config.dexes.len(), 1);
    let dex = &config.dexes[0];
    // unspecified tiers and fee fall back to the standard set
    assert_eq!(dex.fee_tiers, vec![100, 500, 3000, 10000]);
    assert_eq!(dex.fee_bps, 30);
    assert!(dex.router.is_none());
}
