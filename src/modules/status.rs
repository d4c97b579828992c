//! RPC endpoint health
//!
//! Connects to every configured endpoint, times a round trip, and flags
//! chains that are not HyperEVM. Endpoints are probed concurrently so
//! one dead URL never hides the others.

use std::time::Instant;

use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;

use crate::config::{HYPEREVM_MAINNET, HYPEREVM_TESTNET};
use crate::core::{print_csv_rows, print_json, print_table, OutputFormat};
use crate::infrastructure::ethereum::{create_provider, ProviderConfig};

#[derive(Debug, Serialize)]
pub struct EndpointStatus {
    pub name: String,
    pub endpoint: String,
    pub ok: bool,
    pub chain_id: Option<u64>,
    pub chain: Option<String>,
    pub client_version: Option<String>,
    pub block_number: Option<u64>,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

/// Latency buckets for the table rendering.
#[derive(Clone, Copy, PartialEq, Eq)]
enum LatencyLevel {
    Ok,
    Warning,
    Error,
    Unknown,
}

fn latency_level(latency_ms: Option<u64>) -> LatencyLevel {
    match latency_ms {
        Some(ms) if ms < 100 => LatencyLevel::Ok,
        Some(ms) if ms < 500 => LatencyLevel::Warning,
        Some(_) => LatencyLevel::Error,
        None => LatencyLevel::Unknown,
    }
}

fn chain_name(chain_id: u64) -> String {
    match chain_id {
        HYPEREVM_MAINNET => "hyperevm".to_string(),
        HYPEREVM_TESTNET => "hyperevm-testnet".to_string(),
        other => format!("other ({other})"),
    }
}

pub async fn probe_all(endpoints: &[(String, ProviderConfig)]) -> Vec<EndpointStatus> {
    let probes = endpoints
        .iter()
        .map(|(name, config)| probe_one(name.clone(), config.clone()));
    join_all(probes).await
}

async fn probe_one(name: String, config: ProviderConfig) -> EndpointStatus {
    let endpoint = config.display();
    let mut status = EndpointStatus {
        name,
        endpoint,
        ok: false,
        chain_id: None,
        chain: None,
        client_version: None,
        block_number: None,
        latency_ms: None,
        error: None,
    };

    let provider = match create_provider(config).await {
        Ok(provider) => provider,
        Err(err) => {
            status.error = Some(format!("{err:#}"));
            return status;
        }
    };

    let started = Instant::now();
    match provider.chain_id().await {
        Ok(chain_id) => {
            status.latency_ms = Some(started.elapsed().as_millis() as u64);
            status.chain_id = Some(chain_id);
            status.chain = Some(chain_name(chain_id));
            status.ok = true;
        }
        Err(err) => {
            status.error = Some(format!("{err:#}"));
            return status;
        }
    }

    // best effort from here - a node without web3_clientVersion is still up
    status.client_version = provider.client_version().await.ok();
    status.block_number = provider.block_number().await.ok();

    status
}

pub fn print_statuses(statuses: &[EndpointStatus], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&statuses),
        OutputFormat::Csv => print_csv_rows(statuses),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = statuses
                .iter()
                .map(|status| {
                    let icon = if !status.ok {
                        "○"
                    } else {
                        match latency_level(status.latency_ms) {
                            LatencyLevel::Ok => "●",
                            LatencyLevel::Warning => "◐",
                            LatencyLevel::Error => "○",
                            LatencyLevel::Unknown => "?",
                        }
                    };
                    vec![
                        icon.to_string(),
                        status.name.clone(),
                        status.endpoint.clone(),
                        status.chain.clone().unwrap_or_else(|| "-".into()),
                        status
                            .block_number
                            .map(|n| format!("#{n}"))
                            .unwrap_or_else(|| "-".into()),
                        status
                            .latency_ms
                            .map(|ms| format!("{ms}ms"))
                            .unwrap_or_else(|| "-".into()),
                        status
                            .client_version
                            .clone()
                            .or_else(|| status.error.clone())
                            .unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(
                &["", "name", "endpoint", "chain", "block", "rtt", "detail"],
                &rows,
            );
            Ok(())
        }
    }
}
