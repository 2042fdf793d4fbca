//! ERC-20 events of the ALCA, AToken and ALCB token contracts.

use crate::common::uint256;
use alloy_core::dyn_abi::DynSolType;
use alloy_primitives::{Address, B256, U256};
use chainevents_core::{ContractEvent, DecodeError, FilterCriteria, FilterError, TopicSet};
use chainevents_evm::EventLayout;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

impl Transfer {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .indexed("from", DynSolType::Address)
            .indexed("to", DynSolType::Address)
            .data("value", uint256())
    }

    /// Transfers from any of `from` to any of `to`; an empty list matches anyone.
    pub fn filter(
        from: impl IntoIterator<Item = Address>,
        to: impl IntoIterator<Item = Address>,
    ) -> Result<FilterCriteria, FilterError> {
        FilterCriteria::for_event::<Self>(vec![TopicSet::of(from), TopicSet::of(to)])
    }
}

impl ContractEvent for Transfer {
    const NAME: &'static str = "Transfer";
    const SIGNATURE: &'static str = "Transfer(address,address,uint256)";
    const INDEXED_ARITY: usize = 2;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            from: f.address("from")?,
            to: f.address("to")?,
            value: f.uint("value")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub value: U256,
}

impl Approval {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .indexed("owner", DynSolType::Address)
            .indexed("spender", DynSolType::Address)
            .data("value", uint256())
    }

    pub fn filter(
        owner: impl IntoIterator<Item = Address>,
        spender: impl IntoIterator<Item = Address>,
    ) -> Result<FilterCriteria, FilterError> {
        FilterCriteria::for_event::<Self>(vec![TopicSet::of(owner), TopicSet::of(spender)])
    }
}

impl ContractEvent for Approval {
    const NAME: &'static str = "Approval";
    const SIGNATURE: &'static str = "Approval(address,address,uint256)";
    const INDEXED_ARITY: usize = 2;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            owner: f.address("owner")?,
            spender: f.address("spender")?,
            value: f.uint("value")?,
        })
    }
}

/// ALCB deposit credited to an AliceNet account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositReceived {
    #[serde(rename = "depositID")]
    pub deposit_id: U256,
    pub account_type: u8,
    pub depositor: Address,
    pub amount: U256,
}

impl DepositReceived {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .indexed("depositID", uint256())
            .indexed("accountType", DynSolType::Uint(8))
            .indexed("depositor", DynSolType::Address)
            .data("amount", uint256())
    }

    pub fn filter(
        deposit_id: impl IntoIterator<Item = U256>,
        account_type: impl IntoIterator<Item = u8>,
        depositor: impl IntoIterator<Item = Address>,
    ) -> Result<FilterCriteria, FilterError> {
        let account_type = account_type.into_iter().map(u64::from);
        FilterCriteria::for_event::<Self>(vec![
            TopicSet::of(deposit_id),
            TopicSet::of(account_type),
            TopicSet::of(depositor),
        ])
    }
}

impl ContractEvent for DepositReceived {
    const NAME: &'static str = "DepositReceived";
    const SIGNATURE: &'static str = "DepositReceived(uint256,uint8,address,uint256)";
    const INDEXED_ARITY: usize = 3;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            deposit_id: f.uint("depositID")?,
            account_type: f.small("accountType")?,
            depositor: f.address("depositor")?,
            amount: f.uint("amount")?,
        })
    }
}

event_set! {
    /// Events of the ALCA and AToken ERC-20 contracts.
    pub enum TokenEvent("ALCA") {
        Transfer,
        Approval,
    }
}

event_set! {
    /// Events of the ALCB contract.
    pub enum AlcbEvent("ALCB") {
        Transfer,
        Approval,
        DepositReceived,
    }
}
