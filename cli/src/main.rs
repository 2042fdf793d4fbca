//! ChainEvents CLI: list, query, watch and parse AliceNet contract events.
//!
//! # Commands
//! ```text
//! chainevents events [--contract <name>] [--json]
//! chainevents query  --contract <name> [--event <name>] [--from-block N] [--to-block M] [--topic POS=HEX]...
//! chainevents watch  --contract <name> [--event <name>] [--from-block N]
//! chainevents parse  --log <file.json> [--contract <name>]
//! ```

use anyhow::{Context, Result};
use chainevents_bindings::{
    AlcbEvent, Contract, DynamicsEvent, EthdkgEvent, GovernanceEvent, SnapshotsEvent, TokenEvent,
    ValidatorPoolEvent,
};
use chainevents_core::EventFilterer;
use chainevents_ws::WsLogSource;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Runs `$body` with `$t` aliased to the event-set enum of `$contract`.
macro_rules! with_event_set {
    ($contract:expr, $t:ident => $body:expr) => {
        match $contract {
            Contract::Alca | Contract::AToken => {
                type $t = TokenEvent;
                $body
            }
            Contract::Alcb => {
                type $t = AlcbEvent;
                $body
            }
            Contract::Ethdkg => {
                type $t = EthdkgEvent;
                $body
            }
            Contract::Snapshots => {
                type $t = SnapshotsEvent;
                $body
            }
            Contract::ValidatorPool => {
                type $t = ValidatorPoolEvent;
                $body
            }
            Contract::Governance => {
                type $t = GovernanceEvent;
                $body
            }
            Contract::Dynamics => {
                type $t = DynamicsEvent;
                $body
            }
        }
    };
}

mod cmd_events;
mod cmd_parse;
mod cmd_query;
mod cmd_watch;
mod config;
mod logging;
mod selection;
#[cfg(test)]
mod testutil;

use config::WatchConfig;
use selection::Selection;

#[derive(Parser)]
#[command(
    name = "chainevents",
    about = "Query and watch AliceNet contract events over Ethereum JSON-RPC",
    long_about = "
ChainEvents CLI: typed access to the events of the AliceNet contracts.
Historical queries use eth_getLogs, live watches use eth_subscribe over a
WebSocket endpoint. Decoded events are printed to stdout as JSON lines;
logs go to stderr (RUST_LOG overrides the configured level).
",
    version
)]
struct Cli {
    /// YAML or JSON config file (rpc_url, contracts, log, ...)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// WebSocket RPC URL (overrides the config file)
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the contract event catalog (name, signature, topic)
    Events {
        /// Only this contract
        #[arg(long)]
        contract: Option<Contract>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Historical query, one decoded event per line
    Query {
        #[command(flatten)]
        selection: Selection,
        /// First block of the range
        #[arg(long, default_value_t = 0)]
        from_block: u64,
        /// Last block of the range (default: latest)
        #[arg(long)]
        to_block: Option<u64>,
    },

    /// Live subscription until Ctrl-C
    Watch {
        #[command(flatten)]
        selection: Selection,
        /// Ignore logs from blocks before this one
        #[arg(long)]
        from_block: Option<u64>,
    },

    /// Decode a raw log (RPC JSON form)
    Parse {
        /// File holding one log object as returned by eth_getLogs
        #[arg(long)]
        log: PathBuf,
        /// Binding to decode with (default: route by the configured address)
        #[arg(long)]
        contract: Option<Contract>,
    },
}

impl Cli {
    fn load_config(&self) -> Result<WatchConfig> {
        let mut config = match &self.config {
            Some(path) => WatchConfig::load(path)?,
            None => WatchConfig::default(),
        };
        if let Some(rpc) = &self.rpc {
            config.rpc_url = rpc.clone();
        }
        if self.verbose {
            config.log.level = "debug".into();
        }
        if self.json_logs {
            config.log.json = true;
        }
        Ok(config)
    }
}

async fn connect(config: &WatchConfig) -> Result<EventFilterer<WsLogSource>> {
    let source = WsLogSource::connect(config.ws_config())
        .await
        .with_context(|| format!("connect to {}", config.rpc_url))?;
    Ok(EventFilterer::new(source))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    logging::init_tracing(&config.log);
    debug!(rpc = %config.rpc_url, contracts = config.contracts.len(), "configuration loaded");

    match cli.command {
        Commands::Events { contract, json } => cmd_events::run(contract, json),

        Commands::Query {
            selection,
            from_block,
            to_block,
        } => {
            let configured = config.addresses_of(selection.contract)?;
            let criteria = selection.criteria(&configured)?.between(from_block, to_block)?;
            let filterer = connect(&config).await?;
            let mut out = std::io::stdout();
            with_event_set!(selection.contract, T => {
                cmd_query::run::<T, _, _>(&filterer, criteria, &mut out).await?
            });
            Ok(())
        }

        Commands::Watch {
            selection,
            from_block,
        } => {
            let configured = config.addresses_of(selection.contract)?;
            let criteria = selection.criteria(&configured)?;
            let criteria = match from_block {
                Some(from) => criteria.live_from(from),
                None => criteria.live(),
            };
            let filterer = connect(&config).await?;
            let mut out = std::io::stdout();
            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            with_event_set!(selection.contract, T => {
                cmd_watch::run::<T, _, _, _>(
                    &filterer,
                    criteria,
                    config.channel_capacity,
                    &mut out,
                    shutdown,
                )
                .await?
            });
            Ok(())
        }

        Commands::Parse { log, contract } => cmd_parse::run(&log, contract, &config.router()?),
    }
}
