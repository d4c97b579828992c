//! Typed call encodings for the contracts we probe
//!
//! Minimal read-only interfaces for ERC-20s and the HyperSwap/KittenSwap
//! style V2/V3 deployments. Calls go through [`read_call`] so everything
//! stays behind the [`EthereumProvider`] trait and can be exercised
//! against a canned provider in tests.

use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy_sol_types::SolCall;
use anyhow::{Context, Result};

use super::EthereumProvider;

sol! {
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
    }

    interface IUniswapV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function getReserves() external view returns (
            uint112 reserve0,
            uint112 reserve1,
            uint32 blockTimestampLast
        );
    }

    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }

    interface IUniswapV2Router02 {
        function getAmountsOut(uint256 amountIn, address[] path)
            external view returns (uint256[] amounts);
    }

    interface IV3Pool {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function fee() external view returns (uint24);
        function tickSpacing() external view returns (int24);
        function liquidity() external view returns (uint128);
        function slot0() external view returns (
            uint160 sqrtPriceX96,
            int24 tick,
            uint16 observationIndex,
            uint16 observationCardinality,
            uint16 observationCardinalityNext,
            uint8 feeProtocol,
            bool unlocked
        );
    }

    interface IV3Factory {
        function getPool(address tokenA, address tokenB, uint24 fee)
            external view returns (address pool);
    }

    interface IQuoterV2 {
        struct QuoteExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint256 amountIn;
            uint24 fee;
            uint160 sqrtPriceLimitX96;
        }

        function quoteExactInputSingle(QuoteExactInputSingleParams params)
            external
            returns (
                uint256 amountOut,
                uint160 sqrtPriceX96After,
                uint32 initializedTicksCrossed,
                uint256 gasEstimate
            );
    }
}

/// Encode a typed call, run it through `eth_call`, decode the returns.
pub async fn read_call<C: SolCall>(
    provider: &dyn EthereumProvider,
    to: Address,
    call: C,
) -> Result<C::Return> {
    let request = TransactionRequest::default()
        .to(to)
        .input(call.abi_encode().into());
    let raw = provider.call(request).await?;
    C::abi_decode_returns(&raw)
        .with_context(|| format!("failed to decode {} return from {}", C::SIGNATURE, to))
}
