//! Ethereum provider abstraction and Alloy implementations
//!
//! One trait over the alloy transports so commands (and their tests) never
//! depend on a concrete provider type. Everything here is read-only:
//! `eth_call` and a handful of node queries.

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
}

impl ProviderConfig {
    /// Build a config from a raw endpoint string, inferring the transport
    /// from the scheme. A bare `host:port` is treated as HTTP.
    pub fn from_endpoint(endpoint: &str) -> Self {
        let trimmed = endpoint.trim();
        if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
            ProviderConfig::WebSocket(trimmed.to_string())
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ProviderConfig::Http(trimmed.to_string())
        } else {
            ProviderConfig::Http(format!("http://{}", trimmed))
        }
    }

    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
        }
    }
}

/// Abstract Ethereum provider trait
///
/// The read surface the probing commands need, abstracting over the
/// specific Alloy transport.
#[async_trait::async_trait]
pub trait EthereumProvider: Send + Sync {
    /// Get the chain id
    async fn chain_id(&self) -> Result<u64>;

    /// Get the current block number
    async fn block_number(&self) -> Result<u64>;

    /// Get client version (for node identification)
    async fn client_version(&self) -> Result<String>;

    /// Execute a call (eth_call)
    async fn call(&self, request: TransactionRequest) -> Result<Bytes>;

    /// Get deployed bytecode at an address (empty for EOAs)
    async fn code_at(&self, address: Address) -> Result<Bytes>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

// Type alias for the filled providers
type AlloyFillProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Enum-based provider that stores concrete types for each transport
pub enum AlloyProvider {
    Http {
        provider: AlloyFillProvider,
        endpoint: String,
    },
    WebSocket {
        provider: AlloyFillProvider,
        endpoint: String,
    },
}

/// Create a provider from configuration
pub async fn create_provider(config: ProviderConfig) -> Result<Box<dyn EthereumProvider>> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            Ok(Box::new(AlloyProvider::Http {
                provider,
                endpoint: url,
            }))
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?;
            Ok(Box::new(AlloyProvider::WebSocket {
                provider,
                endpoint: url,
            }))
        }
    }
}

// Macro to reduce code duplication for provider method implementations
macro_rules! impl_provider_method {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            AlloyProvider::Http { provider, .. } => provider.$method($($arg),*).await,
            AlloyProvider::WebSocket { provider, .. } => provider.$method($($arg),*).await,
        }
    };
}

#[async_trait::async_trait]
impl EthereumProvider for AlloyProvider {
    async fn chain_id(&self) -> Result<u64> {
        Ok(impl_provider_method!(self, get_chain_id)?)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(impl_provider_method!(self, get_block_number)?)
    }

    async fn client_version(&self) -> Result<String> {
        Ok(impl_provider_method!(self, get_client_version)?)
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        Ok(impl_provider_method!(self, call, request)?)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        Ok(impl_provider_method!(self, get_code_at, address)?)
    }

    fn endpoint_name(&self) -> String {
        match self {
            AlloyProvider::Http { endpoint, .. } => endpoint.clone(),
            AlloyProvider::WebSocket { endpoint, .. } => endpoint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_scheme_inference() {
        assert!(matches!(
            ProviderConfig::from_endpoint("wss://rpc.example/evm"),
            ProviderConfig::WebSocket(_)
        ));
        assert!(matches!(
            ProviderConfig::from_endpoint("https://rpc.hyperliquid.xyz/evm"),
            ProviderConfig::Http(_)
        ));
        let bare = ProviderConfig::from_endpoint("localhost:8545");
        assert_eq!(bare.display(), "http://localhost:8545");
    }
}
