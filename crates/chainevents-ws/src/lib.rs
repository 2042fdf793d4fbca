//! chainevents-ws: JSON-RPC WebSocket log source
//!
//! Implements [`LogSource`](chainevents_core::LogSource) over a single
//! WebSocket connection: historical queries go through `eth_getLogs`, live
//! feeds through `eth_subscribe("logs", filter)`, and releasing a feed sends
//! `eth_unsubscribe`.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use chainevents_core::EventFilterer;
//! use chainevents_ws::{WsConfig, WsLogSource};
//!
//! let source = WsLogSource::connect(WsConfig::new("ws://localhost:8546")).await?;
//! let head = source.block_number().await?;
//! let filterer = EventFilterer::new(source);
//! # let _ = (head, filterer);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod source;
pub mod wire;

pub use config::WsConfig;
pub use source::WsLogSource;
pub use wire::{parse_hex_u64, parse_log, parse_logs, RpcLog};
