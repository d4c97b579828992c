//! Command modules
//!
//! One module per subcommand. Each exposes a data-producing function
//! (testable against a canned provider) and a print function that renders
//! the result in the selected output format.

pub mod abi_tools;
pub mod calc;
pub mod pool;
pub mod quote;
pub mod reserves;
pub mod status;
pub mod token;
