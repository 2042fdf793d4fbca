//! Routing raw logs to the binding of the contract that emitted them.
//!
//! Several contracts share event signatures (`Transfer`, `Initialized`), so
//! topics[0] alone cannot pick a decoder; the emitting address does.

use crate::common::EventInfo;
use crate::dynamics::DynamicsEvent;
use crate::ethdkg::EthdkgEvent;
use crate::governance::GovernanceEvent;
use crate::snapshots::SnapshotsEvent;
use crate::tokens::{AlcbEvent, TokenEvent};
use crate::validator_pool::ValidatorPoolEvent;
use alloy_primitives::{Address, B256};
use chainevents_core::{DecodeError, DecodeLog, FilterCriteria, RawLog};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contract {
    Alca,
    AToken,
    Alcb,
    Ethdkg,
    Snapshots,
    ValidatorPool,
    Governance,
    Dynamics,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown contract '{0}'")]
pub struct UnknownContractName(pub String);

impl Contract {
    pub const ALL: [Contract; 8] = [
        Contract::Alca,
        Contract::AToken,
        Contract::Alcb,
        Contract::Ethdkg,
        Contract::Snapshots,
        Contract::ValidatorPool,
        Contract::Governance,
        Contract::Dynamics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Contract::Alca => "ALCA",
            Contract::AToken => "AToken",
            Contract::Alcb => "ALCB",
            Contract::Ethdkg => "ETHDKG",
            Contract::Snapshots => "Snapshots",
            Contract::ValidatorPool => "ValidatorPool",
            Contract::Governance => "Governance",
            Contract::Dynamics => "Dynamics",
        }
    }

    pub fn events(self) -> Vec<EventInfo> {
        let mut events = match self {
            Contract::Alca | Contract::AToken => TokenEvent::events(),
            Contract::Alcb => AlcbEvent::events(),
            Contract::Ethdkg => EthdkgEvent::events(),
            Contract::Snapshots => SnapshotsEvent::events(),
            Contract::ValidatorPool => ValidatorPoolEvent::events(),
            Contract::Governance => GovernanceEvent::events(),
            Contract::Dynamics => DynamicsEvent::events(),
        };
        for info in &mut events {
            info.contract = self.name();
        }
        events
    }

    /// Look up one event of this contract by name.
    pub fn event(self, name: &str) -> Option<EventInfo> {
        self.events().into_iter().find(|info| info.name == name)
    }

    pub fn signatures(self) -> Vec<B256> {
        self.events().into_iter().map(|info| info.topic).collect()
    }

    /// Criteria matching every event of this contract.
    pub fn criteria(self) -> FilterCriteria {
        FilterCriteria::for_signatures(self.name(), self.signatures())
    }

    pub fn decode(self, log: &RawLog) -> Result<AliceNetEvent, DecodeError> {
        Ok(match self {
            Contract::Alca | Contract::AToken => AliceNetEvent::Token(TokenEvent::decode_log(log)?),
            Contract::Alcb => AliceNetEvent::Alcb(AlcbEvent::decode_log(log)?),
            Contract::Ethdkg => AliceNetEvent::Ethdkg(EthdkgEvent::decode_log(log)?),
            Contract::Snapshots => AliceNetEvent::Snapshots(SnapshotsEvent::decode_log(log)?),
            Contract::ValidatorPool => {
                AliceNetEvent::ValidatorPool(ValidatorPoolEvent::decode_log(log)?)
            }
            Contract::Governance => AliceNetEvent::Governance(GovernanceEvent::decode_log(log)?),
            Contract::Dynamics => AliceNetEvent::Dynamics(DynamicsEvent::decode_log(log)?),
        })
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Contract {
    type Err = UnknownContractName;

    /// Case-insensitive; `_` and `-` are ignored (`validator-pool` works).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        Contract::ALL
            .into_iter()
            .find(|c| c.name().to_lowercase() == wanted)
            .ok_or_else(|| UnknownContractName(s.to_string()))
    }
}

/// Any decoded AliceNet event, tagged with the contract family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "contract", content = "event")]
pub enum AliceNetEvent {
    Token(TokenEvent),
    Alcb(AlcbEvent),
    Ethdkg(EthdkgEvent),
    Snapshots(SnapshotsEvent),
    ValidatorPool(ValidatorPoolEvent),
    Governance(GovernanceEvent),
    Dynamics(DynamicsEvent),
}

impl AliceNetEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AliceNetEvent::Token(e) => e.name(),
            AliceNetEvent::Alcb(e) => e.name(),
            AliceNetEvent::Ethdkg(e) => e.name(),
            AliceNetEvent::Snapshots(e) => e.name(),
            AliceNetEvent::ValidatorPool(e) => e.name(),
            AliceNetEvent::Governance(e) => e.name(),
            AliceNetEvent::Dynamics(e) => e.name(),
        }
    }

    pub fn raw(&self) -> &RawLog {
        match self {
            AliceNetEvent::Token(e) => e.raw(),
            AliceNetEvent::Alcb(e) => e.raw(),
            AliceNetEvent::Ethdkg(e) => e.raw(),
            AliceNetEvent::Snapshots(e) => e.raw(),
            AliceNetEvent::ValidatorPool(e) => e.raw(),
            AliceNetEvent::Governance(e) => e.raw(),
            AliceNetEvent::Dynamics(e) => e.raw(),
        }
    }
}

/// Every event of every contract binding.
pub fn catalog() -> Vec<EventInfo> {
    Contract::ALL.into_iter().flat_map(Contract::events).collect()
}

/// Deployed contract addresses and the binding each one uses.
#[derive(Debug, Clone, Default)]
pub struct EventRouter {
    contracts: HashMap<Address, Contract>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a deployment; returns the contract previously at `address`.
    pub fn register(&mut self, address: Address, contract: Contract) -> Option<Contract> {
        self.contracts.insert(address, contract)
    }

    pub fn with(mut self, address: Address, contract: Contract) -> Self {
        self.register(address, contract);
        self
    }

    pub fn contract_at(&self, address: &Address) -> Option<Contract> {
        self.contracts.get(address).copied()
    }

    /// Addresses registered for `contract`, sorted.
    pub fn addresses_of(&self, contract: Contract) -> Vec<Address> {
        let mut out: Vec<Address> = self
            .contracts
            .iter()
            .filter(|(_, c)| **c == contract)
            .map(|(a, _)| *a)
            .collect();
        out.sort();
        out
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Criteria matching every event of every registered contract.
    pub fn criteria(&self) -> FilterCriteria {
        let mut addresses: Vec<Address> = self.contracts.keys().copied().collect();
        addresses.sort();
        let mut signatures: Vec<B256> = Vec::new();
        for contract in self.contracts.values() {
            for sig in contract.signatures() {
                if !signatures.contains(&sig) {
                    signatures.push(sig);
                }
            }
        }
        FilterCriteria::for_signatures("AliceNet", signatures).with_addresses(addresses)
    }

    /// Decode `log` with the binding registered for its emitting address.
    pub fn decode(&self, log: &RawLog) -> Result<AliceNetEvent, DecodeError> {
        let contract = self
            .contract_at(&log.address)
            .ok_or(DecodeError::UnknownContract {
                address: log.address,
            })?;
        debug!(%contract, address = %log.address, "routing log");
        contract.decode(log)
    }
}
