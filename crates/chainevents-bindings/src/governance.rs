//! Events of the Governance contract.

use crate::common::uint256;
use alloy_core::dyn_abi::DynSolType;
use alloy_primitives::{Address, B256, U256};
use chainevents_core::{ContractEvent, DecodeError, FilterCriteria, FilterError, TopicSet};
use chainevents_evm::EventLayout;
use serde::{Deserialize, Serialize};

/// A governance-controlled value changed, effective from `epoch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueUpdated {
    pub epoch: U256,
    pub key: U256,
    pub value: B256,
    pub who: Address,
}

impl ValueUpdated {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .indexed("epoch", uint256())
            .indexed("key", uint256())
            .indexed("value", DynSolType::FixedBytes(32))
            .data("who", DynSolType::Address)
    }

    pub fn filter(
        epoch: impl IntoIterator<Item = U256>,
        key: impl IntoIterator<Item = U256>,
        value: impl IntoIterator<Item = B256>,
    ) -> Result<FilterCriteria, FilterError> {
        FilterCriteria::for_event::<Self>(vec![
            TopicSet::of(epoch),
            TopicSet::of(key),
            TopicSet::of(value),
        ])
    }
}

impl ContractEvent for ValueUpdated {
    const NAME: &'static str = "ValueUpdated";
    const SIGNATURE: &'static str = "ValueUpdated(uint256,uint256,bytes32,address)";
    const INDEXED_ARITY: usize = 3;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            epoch: f.uint("epoch")?,
            key: f.uint("key")?,
            value: f.word("value")?,
            who: f.address("who")?,
        })
    }
}

event_set! {
    pub enum GovernanceEvent("Governance") {
        ValueUpdated,
    }
}
