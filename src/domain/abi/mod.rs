//! ABI domain models
//!
//! Selector-indexed registry plus shape comparison, independent of where
//! the ABI JSON came from.

mod registry;

pub use registry::{AbiDiff, AbiRegistry, FunctionSignature, ParamSpec, ReshapedFunction};
