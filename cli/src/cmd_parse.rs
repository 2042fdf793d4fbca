//! `chainevents parse`: decode one raw log from a JSON file.

use anyhow::{Context, Result};
use chainevents_bindings::{Contract, EventRouter};
use chainevents_core::RawLog;
use chainevents_ws::RpcLog;
use std::path::Path;

/// Accepts the RPC wire form (hex quantities, as in `eth_getLogs` output).
pub fn read_log(path: &Path) -> Result<RawLog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read log file '{}'", path.display()))?;
    let rpc: RpcLog = serde_json::from_str(&content)
        .with_context(|| format!("parse log JSON '{}'", path.display()))?;
    RawLog::try_from(rpc).context("convert RPC log")
}

/// Decode with `contract` when given, otherwise route on the emitter address.
pub fn run(path: &Path, contract: Option<Contract>, router: &EventRouter) -> Result<()> {
    let log = read_log(path)?;
    let event = match contract {
        Some(contract) => contract.decode(&log),
        None => router.decode(&log),
    }
    .with_context(|| format!("decode log at {}", log.position()))?;

    tracing::debug!(event = event.name(), position = %log.position(), "parsed log");
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}
