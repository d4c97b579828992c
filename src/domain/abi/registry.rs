//! ABI registry - function signatures indexed by selector
//!
//! Built by the filesystem scanner, consumed by the decode and diff
//! commands. Shape comparison lives here because it is pure set logic.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A function parameter specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
}

/// A function signature with its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// 4-byte function selector
    pub selector: [u8; 4],
    /// Function name
    pub name: String,
    /// Full signature string (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Input parameters
    pub inputs: Vec<ParamSpec>,
    /// Source file where this ABI was found
    pub source: PathBuf,
}

impl FunctionSignature {
    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }
}

/// Registry of function signatures indexed by selector
#[derive(Debug, Default, Clone)]
pub struct AbiRegistry {
    functions: HashMap<[u8; 4], FunctionSignature>,
    /// Number of files scanned
    pub scanned_files: usize,
    /// Scan errors
    pub errors: Vec<String>,
    /// Scan duration in milliseconds
    pub scan_ms: u128,
}

impl AbiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a function signature
    ///
    /// Note: First function for a given selector wins (no overwrite)
    pub fn insert(&mut self, function: FunctionSignature) {
        self.functions.entry(function.selector).or_insert(function);
    }

    /// Look up a function by selector
    pub fn lookup(&self, selector: [u8; 4]) -> Option<&FunctionSignature> {
        self.functions.get(&selector)
    }

    /// Look up a function by selector hex string (e.g., "0xa9059cbb")
    pub fn lookup_hex(&self, selector_hex: &str) -> Option<&FunctionSignature> {
        let normalized = selector_hex
            .strip_prefix("0x")
            .or_else(|| selector_hex.strip_prefix("0X"))
            .unwrap_or(selector_hex);

        if normalized.len() != 8 {
            return None;
        }

        let bytes = hex::decode(normalized).ok()?;
        let selector: [u8; 4] = bytes.try_into().ok()?;
        self.lookup(selector)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Merge another registry into this one (first wins per selector).
    pub fn merge(&mut self, other: Self) {
        self.scanned_files = self.scanned_files.saturating_add(other.scanned_files);
        self.errors.extend(other.errors);
        for (selector, function) in other.functions {
            self.functions.entry(selector).or_insert(function);
        }
    }

    /// All functions, ordered by signature string for stable output.
    pub fn sorted_signatures(&self) -> Vec<&FunctionSignature> {
        let mut all: Vec<&FunctionSignature> = self.functions.values().collect();
        all.sort_by(|a, b| a.signature.cmp(&b.signature));
        all
    }

    /// Compare the function shape of two ABIs.
    pub fn diff(&self, other: &AbiRegistry) -> AbiDiff {
        let left: BTreeSet<&str> = self
            .functions
            .values()
            .map(|f| f.signature.as_str())
            .collect();
        let right: BTreeSet<&str> = other
            .functions
            .values()
            .map(|f| f.signature.as_str())
            .collect();

        let only_left: Vec<String> = left.difference(&right).map(|s| s.to_string()).collect();
        let only_right: Vec<String> = right.difference(&left).map(|s| s.to_string()).collect();
        let shared = left.intersection(&right).count();

        // Same function name on both sides but no shared signature:
        // the argument shape changed.
        let names = |registry: &AbiRegistry| -> BTreeMap<String, BTreeSet<String>> {
            let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
            for f in registry.functions.values() {
                map.entry(f.name.clone())
                    .or_default()
                    .insert(f.signature.clone());
            }
            map
        };
        let left_names = names(self);
        let right_names = names(other);
        let mut reshaped = Vec::new();
        for (name, left_sigs) in &left_names {
            if let Some(right_sigs) = right_names.get(name) {
                if left_sigs.is_disjoint(right_sigs) {
                    reshaped.push(ReshapedFunction {
                        name: name.clone(),
                        left: left_sigs.iter().cloned().collect(),
                        right: right_sigs.iter().cloned().collect(),
                    });
                }
            }
        }

        AbiDiff {
            only_left,
            only_right,
            shared,
            reshaped,
        }
    }
}

/// Result of comparing two ABI shapes.
#[derive(Debug, Serialize)]
pub struct AbiDiff {
    /// Signatures present only in the first ABI
    pub only_left: Vec<String>,
    /// Signatures present only in the second ABI
    pub only_right: Vec<String>,
    /// Count of signatures present in both
    pub shared: usize,
    /// Functions whose name exists on both sides with no common signature
    pub reshaped: Vec<ReshapedFunction>,
}

#[derive(Debug, Serialize)]
pub struct ReshapedFunction {
    pub name: String,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl AbiDiff {
    pub fn is_identical(&self) -> bool {
        self.only_left.is_empty() && self.only_right.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(selector: [u8; 4], name: &str, signature: &str) -> FunctionSignature {
        FunctionSignature {
            selector,
            name: name.to_string(),
            signature: signature.to_string(),
            inputs: vec![],
            source: PathBuf::from("test.json"),
        }
    }

    #[test]
    fn insert_and_lookup() {
        let mut registry = AbiRegistry::new();
        registry.insert(func(
            [0xa9, 0x05, 0x9c, 0xbb],
            "transfer",
            "transfer(address,uint256)",
        ));

        assert_eq!(registry.len(), 1);
        assert!(registry.lookup([0xa9, 0x05, 0x9c, 0xbb]).is_some());
        assert!(registry.lookup_hex("0xa9059cbb").is_some());
        assert!(registry.lookup_hex("0xdeadbeef").is_none());
        assert!(registry.lookup_hex("0xnope").is_none());
    }

    #[test]
    fn first_wins() {
        let mut registry = AbiRegistry::new();
        registry.insert(func([1, 2, 3, 4], "transfer", "transfer(address,uint256)"));
        registry.insert(func([1, 2, 3, 4], "transferV2", "transferV2(address)"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup([1, 2, 3, 4]).unwrap().name, "transfer");
    }

    #[test]
    fn diff_finds_missing_and_reshaped() {
        let mut left = AbiRegistry::new();
        left.insert(func([1, 0, 0, 0], "getReserves", "getReserves()"));
        left.insert(func([2, 0, 0, 0], "swap", "swap(uint256,uint256,address)"));
        left.insert(func([3, 0, 0, 0], "skim", "skim(address)"));

        let mut right = AbiRegistry::new();
        right.insert(func([1, 0, 0, 0], "getReserves", "getReserves()"));
        right.insert(func(
            [4, 0, 0, 0],
            "swap",
            "swap(uint256,uint256,address,bytes)",
        ));
        right.insert(func([5, 0, 0, 0], "sync", "sync()"));

        let diff = left.diff(&right);
        assert_eq!(diff.shared, 1);
        assert_eq!(
            diff.only_left,
            vec!["skim(address)", "swap(uint256,uint256,address)"]
        );
        assert_eq!(
            diff.only_right,
            vec!["swap(uint256,uint256,address,bytes)", "sync()"]
        );
        assert_eq!(diff.reshaped.len(), 1);
        assert_eq!(diff.reshaped[0].name, "swap");
        assert!(!diff.is_identical());

        let same = left.diff(&left.clone());
        assert!(same.is_identical());
        assert!(same.reshaped.is_empty());
    }
}
