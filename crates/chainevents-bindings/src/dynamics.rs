//! Events of the Dynamics contract (protocol parameters and node versions).

use crate::common::{uint256, Initialized};
use alloy_core::dyn_abi::DynSolType;
use alloy_primitives::{Address, B256, U256};
use chainevents_core::{ContractEvent, DecodeError};
use chainevents_evm::{EventLayout, FieldReader};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicValueChanged {
    pub epoch: U256,
    /// Encoded dynamic values, opaque at this layer
    pub raw_dynamic_values: Vec<u8>,
}

impl DynamicValueChanged {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .data("epoch", uint256())
            .data("rawDynamicValues", DynSolType::Bytes)
    }
}

impl ContractEvent for DynamicValueChanged {
    const NAME: &'static str = "DynamicValueChanged";
    const SIGNATURE: &'static str = "DynamicValueChanged(uint256,bytes)";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            epoch: f.uint("epoch")?,
            raw_dynamic_values: f.bytes("rawDynamicValues")?,
        })
    }
}

/// Node software version announced on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub execution_epoch: u32,
    pub binary_hash: B256,
}

impl CanonicalVersion {
    const FIELDS: [&'static str; 5] = ["major", "minor", "patch", "executionEpoch", "binaryHash"];

    pub fn sol_type() -> DynSolType {
        DynSolType::Tuple(vec![
            DynSolType::Uint(32),
            DynSolType::Uint(32),
            DynSolType::Uint(32),
            DynSolType::Uint(32),
            DynSolType::FixedBytes(32),
        ])
    }

    fn read(t: &FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            major: t.small("major")?,
            minor: t.small("minor")?,
            patch: t.small("patch")?,
            execution_epoch: t.small("executionEpoch")?,
            binary_hash: t.word("binaryHash")?,
        })
    }
}

impl std::fmt::Display for CanonicalVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAliceNetNodeVersionAvailable {
    pub version: CanonicalVersion,
}

impl NewAliceNetNodeVersionAvailable {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME).data("version", CanonicalVersion::sol_type())
    }
}

impl ContractEvent for NewAliceNetNodeVersionAvailable {
    const NAME: &'static str = "NewAliceNetNodeVersionAvailable";
    const SIGNATURE: &'static str =
        "NewAliceNetNodeVersionAvailable((uint32,uint32,uint32,uint32,bytes32))";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            version: CanonicalVersion::read(&f.tuple("version", &CanonicalVersion::FIELDS)?)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedStorageContract {
    pub contract_addr: Address,
}

impl DeployedStorageContract {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME).data("contractAddr", DynSolType::Address)
    }
}

impl ContractEvent for DeployedStorageContract {
    const NAME: &'static str = "DeployedStorageContract";
    const SIGNATURE: &'static str = "DeployedStorageContract(address)";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            contract_addr: f.address("contractAddr")?,
        })
    }
}

event_set! {
    pub enum DynamicsEvent("Dynamics") {
        DynamicValueChanged,
        NewAliceNetNodeVersionAvailable,
        DeployedStorageContract,
        Initialized,
    }
}
