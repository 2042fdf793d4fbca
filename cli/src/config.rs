//! `chainevents` configuration file (YAML or JSON).
//!
//! ```yaml
//! rpc_url: wss://mainnet.example/ws
//! channel_capacity: 512
//! contracts:
//!   ETHDKG: "0x0d4d7c2f2f9bbd8e6b60e2a1a2a19f5c8a1d3e9c"
//!   ValidatorPool: "0x1a5b3c0e6f7d8e9f0a1b2c3d4e5f60718293a4b5"
//! log:
//!   level: info
//!   components:
//!     chainevents-ws: debug
//! ```

use crate::logging::LogConfig;
use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use chainevents_bindings::{Contract, EventRouter};
use chainevents_ws::WsConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// WebSocket JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_reconnect_initial_ms")]
    pub reconnect_initial_ms: u64,
    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
    /// Decoded events buffered between the subscription and stdout
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Contract name -> deployed address
    #[serde(default)]
    pub contracts: BTreeMap<String, Address>,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_rpc_url() -> String { "ws://localhost:8546".into() }
fn default_request_timeout_ms() -> u64 { 30_000 }
fn default_reconnect_initial_ms() -> u64 { 500 }
fn default_reconnect_max_ms() -> u64 { 60_000 }
fn default_channel_capacity() -> usize { 256 }

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            request_timeout_ms: default_request_timeout_ms(),
            reconnect_initial_ms: default_reconnect_initial_ms(),
            reconnect_max_ms: default_reconnect_max_ms(),
            channel_capacity: default_channel_capacity(),
            contracts: BTreeMap::new(),
            log: LogConfig::default(),
        }
    }
}

impl WatchConfig {
    /// Load from `path`; `.yaml`/`.yml` parse as YAML, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file '{}'", path.display()))?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("parse YAML config '{}'", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("parse JSON config '{}'", path.display()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            bail!("channel_capacity must be at least 1");
        }
        self.router().map(|_| ())
    }

    pub fn ws_config(&self) -> WsConfig {
        WsConfig {
            url: self.rpc_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
            reconnect_initial_ms: self.reconnect_initial_ms,
            reconnect_max_ms: self.reconnect_max_ms,
        }
    }

    /// Router over every configured deployment.
    pub fn router(&self) -> Result<EventRouter> {
        let mut router = EventRouter::new();
        for (name, address) in &self.contracts {
            let contract: Contract = name
                .parse()
                .with_context(|| format!("config entry contracts.{name}"))?;
            router.register(*address, contract);
        }
        Ok(router)
    }

    /// Configured addresses of `contract`.
    pub fn addresses_of(&self, contract: Contract) -> Result<Vec<Address>> {
        Ok(self.router()?.addresses_of(contract))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("chainevents-{}-{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn yaml_with_defaults() {
        let path = write_temp(
            "cfg.yaml",
            r#"
rpc_url: ws://node:8546
contracts:
  validator-pool: "0x0101010101010101010101010101010101010101"
log:
  level: debug
"#,
        );
        let cfg = WatchConfig::load(&path).unwrap();
        assert_eq!(cfg.rpc_url, "ws://node:8546");
        assert_eq!(cfg.channel_capacity, 256);
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(
            cfg.addresses_of(Contract::ValidatorPool).unwrap(),
            vec![Address::repeat_byte(0x01)]
        );
        assert_eq!(cfg.ws_config().reconnect_max_ms, 60_000);
    }

    #[test]
    fn json_by_extension() {
        let path = write_temp("cfg.json", r#"{"request_timeout_ms": 5000}"#);
        let cfg = WatchConfig::load(&path).unwrap();
        assert_eq!(cfg.request_timeout_ms, 5000);
        assert_eq!(cfg.rpc_url, default_rpc_url());
    }

    #[test]
    fn unknown_contract_name_rejected() {
        let path = write_temp(
            "bad.yaml",
            "contracts:\n  Uniswap: \"0x0101010101010101010101010101010101010101\"\n",
        );
        let err = WatchConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Uniswap"));
    }

    #[test]
    fn zero_capacity_rejected() {
        let cfg = WatchConfig {
            channel_capacity: 0,
            ..WatchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
