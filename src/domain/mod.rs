//! Chain-free logic: AMM math, amounts, tokens, ABI shapes

pub mod abi;
pub mod amount;
pub mod math;
pub mod token;
