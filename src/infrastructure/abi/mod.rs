//! ABI infrastructure - filesystem scanning into the domain registry

mod scanner;

pub use scanner::AbiScanner;
