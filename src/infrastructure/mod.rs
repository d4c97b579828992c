//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based Ethereum provider implementations
//! - Typed DEX/ERC-20 contract call encoding
//! - ABI file scanning

pub mod abi;
pub mod ethereum;

pub use abi::AbiScanner;
