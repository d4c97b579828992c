//! ABI file scanner - discovers and parses ABI files from the filesystem
//!
//! The probing workflow keeps plain ABI JSON under an `abi/` directory, so
//! unlike a build-artifact scanner this accepts any `.json` it finds and
//! tolerates both raw arrays and `{"abi": [...]}` wrappers.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use alloy_json_abi::JsonAbi;
use walkdir::WalkDir;

use crate::domain::abi::{AbiRegistry, FunctionSignature, ParamSpec};

const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// ABI file scanner
pub struct AbiScanner;

impl AbiScanner {
    /// Scan a single root directory for ABI files
    pub fn scan(root: impl AsRef<Path>) -> AbiRegistry {
        let started = Instant::now();
        let root = root.as_ref();
        let mut registry = AbiRegistry::new();
        let mut scanned_files = 0;
        let mut errors = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    errors.push(err.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(meta) => meta,
                Err(err) => {
                    errors.push(format!("{}: {}", path.display(), err));
                    continue;
                }
            };
            if metadata.len() > MAX_FILE_BYTES {
                continue;
            }

            scanned_files += 1;

            if let Err(err) = Self::load_abi_file(path, &mut registry) {
                errors.push(format!("{}: {}", path.display(), err));
            }
        }

        registry.scanned_files = scanned_files;
        registry.errors = errors;
        registry.scan_ms = started.elapsed().as_millis();

        registry
    }

    /// Scan multiple root directories
    pub fn scan_roots(roots: &[PathBuf]) -> AbiRegistry {
        let started = Instant::now();
        let mut registry = AbiRegistry::new();

        for root in roots {
            registry.merge(Self::scan(root));
        }

        registry.scan_ms = started.elapsed().as_millis();
        registry
    }

    /// Load exactly one ABI file, for the diff command.
    pub fn scan_file(path: impl AsRef<Path>) -> anyhow::Result<AbiRegistry> {
        let path = path.as_ref();
        let mut registry = AbiRegistry::new();
        Self::load_abi_file(path, &mut registry)?;
        registry.scanned_files = 1;
        Ok(registry)
    }

    /// Load a single ABI file into the registry
    fn load_abi_file(path: &Path, registry: &mut AbiRegistry) -> anyhow::Result<()> {
        let content = fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;

        // Either a raw ABI array or a compiler artifact with an "abi" field
        let abi_value = if value.is_array() {
            value
        } else if let Some(abi) = value.get("abi") {
            abi.clone()
        } else {
            anyhow::bail!("no ABI array found");
        };

        let abi: JsonAbi = serde_json::from_value(abi_value)?;

        for function in abi.functions() {
            let signature = function.signature();
            let selector: [u8; 4] = function.selector().0;

            let inputs: Vec<ParamSpec> = function
                .inputs
                .iter()
                .map(|input| ParamSpec {
                    name: input.name.clone(),
                    kind: input.ty.to_string(),
                })
                .collect();

            registry.insert(FunctionSignature {
                selector,
                name: function.name.clone(),
                signature,
                inputs,
                source: path.to_path_buf(),
            });
        }

        Ok(())
    }

    /// Check if a path should be ignored
    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| {
                matches!(
                    name,
                    ".git" | "target" | "node_modules" | ".next" | "dist" | "build"
                )
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_ignored_dir_matches() {
        assert!(AbiScanner::is_ignored_dir(Path::new(".git")));
        assert!(AbiScanner::is_ignored_dir(Path::new("node_modules")));
        assert!(!AbiScanner::is_ignored_dir(Path::new("abi")));
        assert!(!AbiScanner::is_ignored_dir(Path::new("src")));
    }

    #[test]
    fn loads_raw_array_and_artifact_shapes() {
        let dir = std::env::temp_dir().join("dexpoke-scanner-test");
        let _ = fs::create_dir_all(&dir);

        let raw = r#"[
            {"type":"function","name":"getReserves","inputs":[],"outputs":[
                {"name":"reserve0","type":"uint112"},
                {"name":"reserve1","type":"uint112"},
                {"name":"blockTimestampLast","type":"uint32"}],
             "stateMutability":"view"}
        ]"#;
        let artifact = r#"{"contractName":"Pair","abi":[
            {"type":"function","name":"token0","inputs":[],"outputs":[
                {"name":"","type":"address"}],"stateMutability":"view"}
        ]}"#;

        fs::write(dir.join("pair.json"), raw).unwrap();
        fs::write(dir.join("artifact.json"), artifact).unwrap();
        fs::write(dir.join("not-abi.json"), r#"{"hello":"world"}"#).unwrap();

        let registry = AbiScanner::scan(&dir);
        assert_eq!(registry.scanned_files, 3);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.errors.len(), 1); // the not-an-abi file
        assert!(registry.lookup_hex("0x0902f1ac").is_some()); // getReserves()
        assert!(registry.lookup_hex("0x0dfe1681").is_some()); // token0()

        let _ = fs::remove_dir_all(&dir);
    }
}
