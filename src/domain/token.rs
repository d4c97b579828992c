//! Token registry - the one place symbols resolve to addresses
//!
//! The probing scripts this replaces each carried their own literal token
//! table; here the config is the single source of truth, and anything not
//! in it can still be addressed by raw hex.

use std::collections::HashMap;

use alloy_primitives::Address;
use serde::Serialize;

use crate::config::{normalize_address, TokenSpec};

/// A token as resolved from user input: always an address, with whatever
/// metadata the config happened to carry. Missing decimals are fetched
/// on-chain by the caller.
#[derive(Debug, Clone)]
pub struct ResolvedToken {
    pub address: Address,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
}

/// On-chain token metadata, used in command output.
#[derive(Debug, Clone, Serialize)]
pub struct TokenMeta {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Default)]
pub struct TokenRegistry {
    specs: Vec<TokenSpec>,
    by_symbol: HashMap<String, usize>,
    by_address: HashMap<String, usize>,
}

impl TokenRegistry {
    pub fn new(specs: Vec<TokenSpec>) -> Self {
        let mut by_symbol = HashMap::new();
        let mut by_address = HashMap::new();
        for (idx, spec) in specs.iter().enumerate() {
            if let Some(symbol) = spec.symbol.as_deref() {
                let key = symbol.trim().to_uppercase();
                if !key.is_empty() {
                    // first entry wins, matching the ABI registry posture
                    by_symbol.entry(key).or_insert(idx);
                }
            }
            by_address
                .entry(spec.normalized_address())
                .or_insert(idx);
        }
        Self {
            specs,
            by_symbol,
            by_address,
        }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Resolve user input that is either a configured symbol (case
    /// insensitive) or a raw 0x address.
    pub fn resolve(&self, input: &str) -> Option<ResolvedToken> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(&idx) = self.by_symbol.get(&trimmed.to_uppercase()) {
            return self.resolved_at(idx);
        }

        let address: Address = trimmed.parse().ok()?;
        // carry config metadata along when the raw address is known
        if let Some(&idx) = self.by_address.get(&normalize_address(trimmed)) {
            return self.resolved_at(idx);
        }
        Some(ResolvedToken {
            address,
            symbol: None,
            decimals: None,
        })
    }

    fn resolved_at(&self, idx: usize) -> Option<ResolvedToken> {
        let spec = self.specs.get(idx)?;
        let address: Address = spec.address.trim().parse().ok()?;
        Some(ResolvedToken {
            address,
            symbol: spec.symbol.clone(),
            decimals: spec.decimals,
        })
    }

    /// Configured expectation for an address, used by `token` to verify
    /// config against on-chain truth.
    pub fn expectation_for(&self, address: Address) -> Option<&TokenSpec> {
        let key = normalize_address(&address.to_string());
        self.by_address.get(&key).map(|&idx| &self.specs[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TokenRegistry {
        TokenRegistry::new(vec![
            TokenSpec {
                address: "0x5555555555555555555555555555555555555555".into(),
                symbol: Some("WHYPE".into()),
                decimals: Some(18),
            },
            TokenSpec {
                address: "0x00000000000000000000000000000000000000aa".into(),
                symbol: Some("USDT0".into()),
                decimals: Some(6),
            },
        ])
    }

    #[test]
    fn resolves_symbol_case_insensitive() {
        let registry = registry();
        let token = registry.resolve("whype").unwrap();
        assert_eq!(token.decimals, Some(18));
        assert_eq!(token.symbol.as_deref(), Some("WHYPE"));
    }

    #[test]
    fn resolves_known_address_with_metadata() {
        let registry = registry();
        let token = registry
            .resolve("0x00000000000000000000000000000000000000AA")
            .unwrap();
        assert_eq!(token.symbol.as_deref(), Some("USDT0"));
        assert_eq!(token.decimals, Some(6));
    }

    #[test]
    fn resolves_unknown_address_bare() {
        let registry = registry();
        let token = registry
            .resolve("0x00000000000000000000000000000000000000bb")
            .unwrap();
        assert!(token.symbol.is_none());
        assert!(token.decimals.is_none());
    }

    #[test]
    fn rejects_garbage() {
        let registry = registry();
        assert!(registry.resolve("not-a-token").is_none());
        assert!(registry.resolve("").is_none());
        assert!(registry.resolve("0x1234").is_none());
    }
}
