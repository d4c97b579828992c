//! Canned provider for exercising commands without a network
//!
//! Responses are keyed by (contract, selector); anything unregistered
//! reverts, which is exactly how a missing pool behaves on-chain.

use std::collections::HashMap;

use alloy::primitives::{Address, Bytes, TxKind};
use alloy::rpc::types::TransactionRequest;
use alloy_sol_types::{SolCall, SolValue};
use anyhow::Result;
use dexpoke::infrastructure::ethereum::EthereumProvider;

#[derive(Default)]
pub struct MockProvider {
    responses: HashMap<(Address, [u8; 4]), Bytes>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the ABI-encoded return value for a typed call.
    pub fn respond<C: SolCall>(&mut self, to: Address, ret: impl SolValue) {
        self.responses
            .insert((to, C::SELECTOR), ret.abi_encode().into());
    }
}

#[async_trait::async_trait]
impl EthereumProvider for MockProvider {
    async fn chain_id(&self) -> Result<u64> {
        Ok(999)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(1)
    }

    async fn client_version(&self) -> Result<String> {
        Ok("mock/0.0.0".to_string())
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        let to = match request.to {
            Some(TxKind::Call(address)) => address,
            _ => anyhow::bail!("mock: call without a target"),
        };
        let input = request.input.input().cloned().unwrap_or_default();
        if input.len() < 4 {
            anyhow::bail!("mock: call without a selector");
        }
        let selector = [input[0], input[1], input[2], input[3]];

        match self.responses.get(&(to, selector)) {
            Some(bytes) => Ok(bytes.clone()),
            None => anyhow::bail!("execution reverted"),
        }
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        // contracts we know something about have code, everything else is an EOA
        let has_code = self.responses.keys().any(|(to, _)| *to == address);
        if has_code {
            Ok(Bytes::from(vec![0x60, 0x80]))
        } else {
            Ok(Bytes::new())
        }
    }

    fn endpoint_name(&self) -> String {
        "mock".to_string()
    }
}
