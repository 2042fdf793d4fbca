//! Events of the ValidatorPool contract.

use crate::common::uint256;
use alloy_core::dyn_abi::DynSolType;
use alloy_primitives::{Address, B256, U256};
use chainevents_core::{ContractEvent, DecodeError, FilterCriteria, FilterError, TopicSet};
use chainevents_evm::EventLayout;
use serde::{Deserialize, Serialize};

/// Events keyed by the validator account plus one staking token id.
macro_rules! validator_token_event {
    ($(#[$meta:meta])* $name:ident { $token:ident: $abi_name:literal }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub account: Address,
            #[serde(rename = $abi_name)]
            pub $token: U256,
        }

        impl $name {
            pub fn layout() -> EventLayout {
                EventLayout::new(Self::NAME)
                    .indexed("account", DynSolType::Address)
                    .data($abi_name, uint256())
            }

            pub fn filter(
                account: impl IntoIterator<Item = Address>,
            ) -> Result<FilterCriteria, FilterError> {
                FilterCriteria::for_event::<Self>(vec![TopicSet::of(account)])
            }
        }

        impl ContractEvent for $name {
            const NAME: &'static str = stringify!($name);
            const SIGNATURE: &'static str = concat!(stringify!($name), "(address,uint256)");
            const INDEXED_ARITY: usize = 1;

            fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
                let f = Self::layout().decode(indexed, data)?;
                Ok(Self {
                    account: f.address("account")?,
                    $token: f.uint($abi_name)?,
                })
            }
        }
    };
}

validator_token_event!(ValidatorJoined {
    validator_staking_token_id: "validatorStakingTokenID"
});
validator_token_event!(ValidatorLeft {
    public_staking_token_id: "publicStakingTokenID"
});
validator_token_event!(
    /// Minor slash: the validator keeps its position but loses stake.
    ValidatorMinorSlashed {
        public_staking_token_id: "publicStakingTokenID"
    }
);

/// Major slash: the validator is evicted and its stake burned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorMajorSlashed {
    pub account: Address,
}

impl ValidatorMajorSlashed {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME).indexed("account", DynSolType::Address)
    }

    pub fn filter(
        account: impl IntoIterator<Item = Address>,
    ) -> Result<FilterCriteria, FilterError> {
        FilterCriteria::for_event::<Self>(vec![TopicSet::of(account)])
    }
}

impl ContractEvent for ValidatorMajorSlashed {
    const NAME: &'static str = "ValidatorMajorSlashed";
    const SIGNATURE: &'static str = "ValidatorMajorSlashed(address)";
    const INDEXED_ARITY: usize = 1;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            account: f.address("account")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceScheduled;

impl MaintenanceScheduled {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
    }
}

impl ContractEvent for MaintenanceScheduled {
    const NAME: &'static str = "MaintenanceScheduled";
    const SIGNATURE: &'static str = "MaintenanceScheduled()";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        Self::layout().decode(indexed, data)?;
        Ok(Self)
    }
}

event_set! {
    pub enum ValidatorPoolEvent("ValidatorPool") {
        ValidatorJoined,
        ValidatorLeft,
        ValidatorMinorSlashed,
        ValidatorMajorSlashed,
        MaintenanceScheduled,
    }
}
