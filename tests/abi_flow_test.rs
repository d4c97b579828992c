//! ABI scan -> diff -> decode, end to end on real files
//!
//! Uses the classic V2 pair vs a stripped variant so the diff has
//! something to say in every bucket.

use std::fs;
use std::path::PathBuf;

use dexpoke::infrastructure::AbiScanner;
use dexpoke::modules::abi_tools;

const PAIR_ABI: &str = r#"[
    {"type":"function","name":"getReserves","inputs":[],"outputs":[
        {"name":"reserve0","type":"uint112"},
        {"name":"reserve1","type":"uint112"},
        {"name":"blockTimestampLast","type":"uint32"}],
     "stateMutability":"view"},
    {"type":"function","name":"swap","inputs":[
        {"name":"amount0Out","type":"uint256"},
        {"name":"amount1Out","type":"uint256"},
        {"name":"to","type":"address"},
        {"name":"data","type":"bytes"}],
     "outputs":[],"stateMutability":"nonpayable"},
    {"type":"function","name":"token0","inputs":[],"outputs":[
        {"name":"","type":"address"}],"stateMutability":"view"}
]"#;

const FORK_ABI: &str = r#"{"contractName":"ForkPair","abi":[
    {"type":"function","name":"getReserves","inputs":[],"outputs":[
        {"name":"reserve0","type":"uint112"},
        {"name":"reserve1","type":"uint112"},
        {"name":"blockTimestampLast","type":"uint32"}],
     "stateMutability":"view"},
    {"type":"function","name":"swap","inputs":[
        {"name":"amount0Out","type":"uint256"},
        {"name":"amount1Out","type":"uint256"},
        {"name":"to","type":"address"}],
     "outputs":[],"stateMutability":"nonpayable"}
]}"#;

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dexpoke-abi-flow-{name}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn scan_diff_and_decode_against_scanned_registry() {
    let dir = workdir("scan");
    let pair_path = dir.join("pair.json");
    let fork_path = dir.join("fork.json");
    fs::write(&pair_path, PAIR_ABI).unwrap();
    fs::write(&fork_path, FORK_ABI).unwrap();

    // scan picks up both shapes
    let summary = abi_tools::scan(&[dir.clone()]);
    assert_eq!(summary.scanned_files, 2);
    assert!(summary.errors.is_empty());
    // getReserves is shared between the two files, so 4 unique signatures
    assert_eq!(summary.functions, 4);

    // diff: token0 only on the left, swap reshaped (different arity)
    let diff = abi_tools::diff(&pair_path, &fork_path).unwrap();
    assert_eq!(diff.shared, 1);
    assert!(diff
        .only_left
        .iter()
        .any(|sig| sig == "token0()"));
    assert!(diff
        .only_left
        .iter()
        .any(|sig| sig.starts_with("swap(")));
    assert_eq!(diff.reshaped.len(), 1);
    assert_eq!(diff.reshaped[0].name, "swap");
    assert!(!diff.is_identical());

    // decode getReserves calldata using only the scanned registry
    let registry = AbiScanner::scan_roots(&[dir.clone()]);
    let decoded = abi_tools::decode_calldata("0x0902f1ac", None, &registry).unwrap();
    assert_eq!(decoded.signature, "getReserves()");
    assert_eq!(decoded.args, "()");

    // and a parameterized one with an explicit signature
    let calldata = "0xa9059cbb\
        000000000000000000000000742d35cc6634c0532925a3b844bc9e7595f0beb0\
        00000000000000000000000000000000000000000000000000000000000f4240";
    let decoded =
        abi_tools::decode_calldata(calldata, Some("transfer(address,uint256)"), &registry).unwrap();
    assert!(decoded.args.contains("1000000"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn identical_files_diff_clean() {
    let dir = workdir("identical");
    let a = dir.join("a.json");
    let b = dir.join("b.json");
    fs::write(&a, PAIR_ABI).unwrap();
    fs::write(&b, PAIR_ABI).unwrap();

    let diff = abi_tools::diff(&a, &b).unwrap();
    assert!(diff.is_identical());
    assert_eq!(diff.shared, 3);

    let _ = fs::remove_dir_all(&dir);
}
