//! Pieces shared by every contract binding.

use alloy_core::dyn_abi::DynSolType;
use alloy_primitives::B256;
use chainevents_core::{ContractEvent, DecodeError};
use chainevents_evm::EventLayout;
use serde::{Deserialize, Serialize};

pub(crate) fn uint256() -> DynSolType {
    DynSolType::Uint(256)
}

pub(crate) fn uint256_array(len: usize) -> DynSolType {
    DynSolType::FixedArray(Box::new(uint256()), len)
}

/// Catalog entry describing one event of one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventInfo {
    pub contract: &'static str,
    pub name: &'static str,
    pub signature: &'static str,
    pub topic: B256,
    pub indexed: usize,
}

impl EventInfo {
    pub fn of<E: ContractEvent>(contract: &'static str) -> Self {
        Self {
            contract,
            name: E::NAME,
            signature: E::SIGNATURE,
            topic: E::signature_hash(),
            indexed: E::INDEXED_ARITY,
        }
    }
}

/// Emitted by upgradeable contracts when an initializer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initialized {
    pub version: u8,
}

impl Initialized {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME).data("version", DynSolType::Uint(8))
    }
}

impl ContractEvent for Initialized {
    const NAME: &'static str = "Initialized";
    const SIGNATURE: &'static str = "Initialized(uint8)";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            version: f.small("version")?,
        })
    }
}
