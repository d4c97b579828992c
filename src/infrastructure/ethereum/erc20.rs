//! ERC-20 metadata reads with graceful degradation
//!
//! A token with a broken `symbol()` should still inspect; we fall back to
//! a shortened address and flag decimals we had to assume.

use alloy::primitives::{Address, U256};
use anyhow::Result;

use crate::config::short_addr;
use crate::domain::token::TokenMeta;

use super::contracts::{read_call, IERC20};
use super::EthereumProvider;

/// Decimals used when a token refuses to report any. 18 is what nearly
/// every HyperEVM token uses; callers that care must check `decimals()`
/// themselves via [`fetch_decimals`].
pub const ASSUMED_DECIMALS: u8 = 18;

/// Fetch symbol + decimals, falling back field by field instead of
/// failing the whole probe.
pub async fn fetch_meta(provider: &dyn EthereumProvider, address: Address) -> TokenMeta {
    let symbol = read_call(provider, address, IERC20::symbolCall {})
        .await
        .unwrap_or_else(|_| short_addr(&address.to_string()));

    let decimals = read_call(provider, address, IERC20::decimalsCall {})
        .await
        .unwrap_or(ASSUMED_DECIMALS);

    TokenMeta {
        address: address.to_string(),
        symbol,
        decimals,
    }
}

/// Strict decimals read; errors surface to the caller.
pub async fn fetch_decimals(provider: &dyn EthereumProvider, address: Address) -> Result<u8> {
    read_call(provider, address, IERC20::decimalsCall {}).await
}

pub async fn fetch_name(provider: &dyn EthereumProvider, address: Address) -> Result<String> {
    read_call(provider, address, IERC20::nameCall {}).await
}

pub async fn fetch_symbol(provider: &dyn EthereumProvider, address: Address) -> Result<String> {
    read_call(provider, address, IERC20::symbolCall {}).await
}

pub async fn fetch_total_supply(
    provider: &dyn EthereumProvider,
    address: Address,
) -> Result<U256> {
    read_call(provider, address, IERC20::totalSupplyCall {}).await
}
