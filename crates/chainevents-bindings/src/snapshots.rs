//! Events of the Snapshots contract.

use crate::common::{uint256, uint256_array, Initialized};
use alloy_core::dyn_abi::DynSolType;
use alloy_primitives::{Address, B256, U256};
use chainevents_core::{ContractEvent, DecodeError, FilterCriteria, FilterError, TopicSet};
use chainevents_evm::{EventLayout, FieldReader};
use serde::{Deserialize, Serialize};

/// Block header claims committed by a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BClaims {
    pub chain_id: u32,
    pub height: u32,
    pub tx_count: u32,
    pub prev_block: B256,
    pub tx_root: B256,
    pub state_root: B256,
    pub header_root: B256,
}

impl BClaims {
    const FIELDS: [&'static str; 7] = [
        "chainId",
        "height",
        "txCount",
        "prevBlock",
        "txRoot",
        "stateRoot",
        "headerRoot",
    ];

    pub fn sol_type() -> DynSolType {
        DynSolType::Tuple(vec![
            DynSolType::Uint(32),
            DynSolType::Uint(32),
            DynSolType::Uint(32),
            DynSolType::FixedBytes(32),
            DynSolType::FixedBytes(32),
            DynSolType::FixedBytes(32),
            DynSolType::FixedBytes(32),
        ])
    }

    fn read(t: &FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            chain_id: t.small("chainId")?,
            height: t.small("height")?,
            tx_count: t.small("txCount")?,
            prev_block: t.word("prevBlock")?,
            tx_root: t.word("txRoot")?,
            state_root: t.word("stateRoot")?,
            header_root: t.word("headerRoot")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotTaken {
    pub chain_id: U256,
    pub epoch: U256,
    pub height: U256,
    pub validator: Address,
    pub is_safe_to_proceed_consensus: bool,
    pub master_public_key: [U256; 4],
    pub signature: [U256; 2],
    pub b_claims: BClaims,
}

impl SnapshotTaken {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .data("chainId", uint256())
            .indexed("epoch", uint256())
            .data("height", uint256())
            .indexed("validator", DynSolType::Address)
            .data("isSafeToProceedConsensus", DynSolType::Bool)
            .data("masterPublicKey", uint256_array(4))
            .data("signature", uint256_array(2))
            .data("bClaims", BClaims::sol_type())
    }

    pub fn filter(
        epoch: impl IntoIterator<Item = U256>,
        validator: impl IntoIterator<Item = Address>,
    ) -> Result<FilterCriteria, FilterError> {
        FilterCriteria::for_event::<Self>(vec![TopicSet::of(epoch), TopicSet::of(validator)])
    }
}

impl ContractEvent for SnapshotTaken {
    const NAME: &'static str = "SnapshotTaken";
    const SIGNATURE: &'static str = "SnapshotTaken(uint256,uint256,uint256,address,bool,uint256[4],uint256[2],(uint32,uint32,uint32,bytes32,bytes32,bytes32,bytes32))";
    const INDEXED_ARITY: usize = 2;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            chain_id: f.uint("chainId")?,
            epoch: f.uint("epoch")?,
            height: f.uint("height")?,
            validator: f.address("validator")?,
            is_safe_to_proceed_consensus: f.boolean("isSafeToProceedConsensus")?,
            master_public_key: f.uint_array("masterPublicKey")?,
            signature: f.uint_array("signature")?,
            b_claims: BClaims::read(&f.tuple("bClaims", &BClaims::FIELDS)?)?,
        })
    }
}

event_set! {
    pub enum SnapshotsEvent("Snapshots") {
        SnapshotTaken,
        Initialized,
    }
}
