//! Read-only probing of DEX contracts on HyperEVM.
//!
//! The crate is split the usual way: `domain` holds chain-free logic (AMM
//! math, token registry, ABI registry), `infrastructure` talks to the node,
//! and `modules` implements the CLI subcommands on top of both.

pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod modules;
