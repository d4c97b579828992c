//! ABI shape tools: scan, diff, decode
//!
//! The filesystem side lives in `infrastructure::abi`; this module turns
//! registries into command output and decodes calldata against them.

use std::path::{Path, PathBuf};

use alloy_dyn_abi::{DynSolType, DynSolValue};
use anyhow::Result;
use serde::Serialize;

use crate::core::{print_csv_rows, print_json, print_table, OutputFormat, Report};
use crate::domain::abi::{AbiDiff, AbiRegistry};
use crate::infrastructure::AbiScanner;

// ---------------------------------------------------------------- scan

#[derive(Debug, Serialize)]
pub struct ScanSummary {
    pub roots: Vec<String>,
    pub scanned_files: usize,
    pub functions: usize,
    pub scan_ms: u128,
    pub errors: Vec<String>,
    pub signatures: Vec<SignatureRow>,
}

#[derive(Debug, Serialize)]
pub struct SignatureRow {
    pub selector: String,
    pub signature: String,
    pub source: String,
}

pub fn scan(roots: &[PathBuf]) -> ScanSummary {
    let registry = AbiScanner::scan_roots(roots);
    let signatures = registry
        .sorted_signatures()
        .into_iter()
        .map(|f| SignatureRow {
            selector: f.selector_hex(),
            signature: f.signature.clone(),
            source: f.source.display().to_string(),
        })
        .collect();

    ScanSummary {
        roots: roots.iter().map(|r| r.display().to_string()).collect(),
        scanned_files: registry.scanned_files,
        functions: registry.len(),
        scan_ms: registry.scan_ms,
        errors: registry.errors.clone(),
        signatures,
    }
}

pub fn print_scan(summary: &ScanSummary, list: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(summary),
        OutputFormat::Csv => print_csv_rows(&summary.signatures),
        OutputFormat::Table => {
            Report::new("ABI scan")
                .add("roots", summary.roots.join(", "))
                .add("files", summary.scanned_files.to_string())
                .add("functions", summary.functions.to_string())
                .add("duration", format!("{}ms", summary.scan_ms))
                .add("errors", summary.errors.len().to_string())
                .print();
            for err in &summary.errors {
                eprintln!("  warn: {err}");
            }
            if list {
                let rows: Vec<Vec<String>> = summary
                    .signatures
                    .iter()
                    .map(|row| {
                        vec![
                            row.selector.clone(),
                            row.signature.clone(),
                            row.source.clone(),
                        ]
                    })
                    .collect();
                print_table(&["selector", "signature", "source"], &rows);
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------- diff

pub fn diff(left: &Path, right: &Path) -> Result<AbiDiff> {
    let left_registry = AbiScanner::scan_file(left)?;
    let right_registry = AbiScanner::scan_file(right)?;
    Ok(left_registry.diff(&right_registry))
}

pub fn print_diff(
    diff: &AbiDiff,
    left: &Path,
    right: &Path,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Csv => print_json(diff),
        OutputFormat::Table => {
            println!(
                "ABI diff: {} vs {}",
                left.display(),
                right.display()
            );
            println!("  shared signatures: {}", diff.shared);
            if diff.is_identical() {
                println!("  shapes are identical");
                return Ok(());
            }
            if !diff.only_left.is_empty() {
                println!("  only in {}:", left.display());
                for sig in &diff.only_left {
                    println!("    - {sig}");
                }
            }
            if !diff.only_right.is_empty() {
                println!("  only in {}:", right.display());
                for sig in &diff.only_right {
                    println!("    + {sig}");
                }
            }
            for reshaped in &diff.reshaped {
                println!(
                    "  reshaped {}: {} vs {}",
                    reshaped.name,
                    reshaped.left.join(" | "),
                    reshaped.right.join(" | ")
                );
            }
            Ok(())
        }
    }
}

// -------------------------------------------------------------- decode

#[derive(Debug, Serialize)]
pub struct DecodedCall {
    pub selector: String,
    pub signature: String,
    pub args: String,
}

/// Decode calldata against an explicit signature, or the scanned registry
/// when none is given.
pub fn decode_calldata(
    calldata: &str,
    manual_signature: Option<&str>,
    registry: &AbiRegistry,
) -> Result<DecodedCall, String> {
    let calldata = calldata.strip_prefix("0x").unwrap_or(calldata);

    if calldata.len() < 8 {
        return Err("calldata too short: need at least a 4-byte selector".to_string());
    }

    let selector = format!("0x{}", &calldata[..8]);

    let signature = if let Some(sig) = manual_signature {
        sig.to_string()
    } else if let Some(known) = registry.lookup_hex(&selector) {
        known.signature.clone()
    } else {
        return Err(format!(
            "unknown selector {selector}; pass --sig <function_sig> or scan an ABI that has it"
        ));
    };

    let param_types = parse_function_signature(&signature)?;

    if param_types.is_empty() {
        if calldata.len() > 8 {
            return Err(format!(
                "{} takes no parameters but calldata has {} extra bytes",
                signature,
                (calldata.len() - 8) / 2
            ));
        }
        return Ok(DecodedCall {
            selector,
            signature,
            args: "()".to_string(),
        });
    }

    let data_bytes =
        hex::decode(&calldata[8..]).map_err(|e| format!("invalid hex in calldata: {e}"))?;
    let decoded = decode_params(&param_types, &data_bytes)?;

    Ok(DecodedCall {
        selector,
        signature,
        args: format_decoded_values(&decoded),
    })
}

/// Parse "name(type,type,...)" into its parameter types.
fn parse_function_signature(signature: &str) -> Result<Vec<DynSolType>, String> {
    let normalized = signature.replace(' ', "");

    let open_paren = normalized
        .find('(')
        .ok_or_else(|| "invalid function signature: missing '('".to_string())?;
    let close_paren = normalized
        .rfind(')')
        .ok_or_else(|| "invalid function signature: missing ')'".to_string())?;

    if close_paren <= open_paren {
        return Err("invalid function signature: malformed parentheses".to_string());
    }

    let params_str = &normalized[open_paren + 1..close_paren];
    if params_str.is_empty() {
        return Ok(Vec::new());
    }

    params_str
        .split(',')
        .map(|type_str| {
            DynSolType::parse(type_str).map_err(|e| format!("failed to parse type '{type_str}': {e}"))
        })
        .collect()
}

fn decode_params(types: &[DynSolType], data: &[u8]) -> Result<Vec<DynSolValue>, String> {
    let tuple_type = DynSolType::Tuple(types.to_vec());
    let decoded = tuple_type
        .abi_decode(data)
        .map_err(|e| format!("failed to decode parameters: {e}"))?;

    match decoded {
        DynSolValue::Tuple(values) => Ok(values),
        _ => Err("expected tuple from decoding".to_string()),
    }
}

fn format_decoded_values(values: &[DynSolValue]) -> String {
    let formatted: Vec<String> = values.iter().map(format_value).collect();
    formatted.join(", ")
}

fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Address(addr) => format!("{addr:?}"),
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(bytes, size) => format!("0x{}", hex::encode(&bytes[..*size])),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => format!("\"{s}\""),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
            let formatted: Vec<String> = values.iter().map(format_value).collect();
            format!("[{}]", formatted.join(", "))
        }
        DynSolValue::Tuple(values) => {
            let formatted: Vec<String> = values.iter().map(format_value).collect();
            format!("({})", formatted.join(", "))
        }
        _ => format!("{value:?}"),
    }
}

pub fn print_decoded(decoded: &DecodedCall, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(decoded),
        OutputFormat::Csv => report(decoded).print_csv(),
        OutputFormat::Table => {
            report(decoded).print();
            Ok(())
        }
    }
}

fn report(decoded: &DecodedCall) -> Report {
    Report::new("calldata decode")
        .add("selector", decoded.selector.clone())
        .add("signature", decoded.signature.clone())
        .add("args", decoded.args.clone())
}
