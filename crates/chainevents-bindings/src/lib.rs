//! # chainevents-bindings
//!
//! Typed events of the AliceNet bridge contracts.
//!
//! Each event is a plain struct implementing [`ContractEvent`]; each
//! contract gets a closed enum of its events that decodes any of them from
//! a raw log. Query, watch and parse them through
//! [`chainevents_core::EventFilterer`]:
//!
//! ```no_run
//! # async fn demo(source: chainevents_core::MemoryLogSource) -> Result<(), Box<dyn std::error::Error>> {
//! use chainevents_bindings::tokens::Transfer;
//! use chainevents_core::{Decoded, EventFilterer};
//!
//! let filterer = EventFilterer::new(source);
//! let to: alloy_primitives::Address = "0x00000000000000000000000000000000000000ab".parse()?;
//! let criteria = Transfer::filter(None, Some(to))?;
//! let mut transfers = filterer.query::<Decoded<Transfer>>(criteria).await?;
//! while transfers.advance() {
//!     if let Some(t) = transfers.current() {
//!         println!("{} -> {}: {}", t.from, t.to, t.value);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ContractEvent`]: chainevents_core::ContractEvent

#[macro_use]
mod macros;

pub mod common;
pub mod dynamics;
pub mod ethdkg;
pub mod governance;
pub mod router;
pub mod snapshots;
pub mod tokens;
pub mod validator_pool;

pub use common::{EventInfo, Initialized};
pub use dynamics::DynamicsEvent;
pub use ethdkg::EthdkgEvent;
pub use governance::GovernanceEvent;
pub use router::{catalog, AliceNetEvent, Contract, EventRouter, UnknownContractName};
pub use snapshots::SnapshotsEvent;
pub use tokens::{AlcbEvent, TokenEvent};
pub use validator_pool::ValidatorPoolEvent;
