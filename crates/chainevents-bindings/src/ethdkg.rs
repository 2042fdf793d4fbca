//! Events of the ETHDKG distributed key generation contract.
//!
//! A DKG round runs through registration, share distribution, key share
//! submission, master public key and GPKj submission; each phase boundary
//! is announced by one of these events.

use crate::common::{uint256, uint256_array, Initialized};
use alloy_core::dyn_abi::DynSolType;
use alloy_primitives::{Address, B256, U256};
use chainevents_core::{ContractEvent, DecodeError};
use chainevents_evm::EventLayout;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOpened {
    pub start_block: U256,
    pub number_validators: U256,
    pub nonce: U256,
    pub phase_length: U256,
    pub confirmation_length: U256,
}

impl RegistrationOpened {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .data("startBlock", uint256())
            .data("numberValidators", uint256())
            .data("nonce", uint256())
            .data("phaseLength", uint256())
            .data("confirmationLength", uint256())
    }
}

impl ContractEvent for RegistrationOpened {
    const NAME: &'static str = "RegistrationOpened";
    const SIGNATURE: &'static str =
        "RegistrationOpened(uint256,uint256,uint256,uint256,uint256)";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            start_block: f.uint("startBlock")?,
            number_validators: f.uint("numberValidators")?,
            nonce: f.uint("nonce")?,
            phase_length: f.uint("phaseLength")?,
            confirmation_length: f.uint("confirmationLength")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRegistered {
    pub account: Address,
    pub index: U256,
    pub nonce: U256,
    pub public_key: [U256; 2],
}

impl AddressRegistered {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .data("account", DynSolType::Address)
            .data("index", uint256())
            .data("nonce", uint256())
            .data("publicKey", uint256_array(2))
    }
}

impl ContractEvent for AddressRegistered {
    const NAME: &'static str = "AddressRegistered";
    const SIGNATURE: &'static str = "AddressRegistered(address,uint256,uint256,uint256[2])";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            account: f.address("account")?,
            index: f.uint("index")?,
            nonce: f.uint("nonce")?,
            public_key: f.uint_array("publicKey")?,
        })
    }
}

/// Phase-completion events carrying only the block number.
macro_rules! phase_complete {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub block_number: U256,
        }

        impl $name {
            pub fn layout() -> EventLayout {
                EventLayout::new(Self::NAME).data("blockNumber", uint256())
            }
        }

        impl ContractEvent for $name {
            const NAME: &'static str = stringify!($name);
            const SIGNATURE: &'static str = concat!(stringify!($name), "(uint256)");
            const INDEXED_ARITY: usize = 0;

            fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
                let f = Self::layout().decode(indexed, data)?;
                Ok(Self {
                    block_number: f.uint("blockNumber")?,
                })
            }
        }
    };
}

phase_complete!(RegistrationComplete);
phase_complete!(ShareDistributionComplete);
phase_complete!(KeyShareSubmissionComplete);
phase_complete!(
    /// Every validator has submitted its GPKj; the round is ready to finish.
    GPKJSubmissionComplete
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharesDistributed {
    pub account: Address,
    pub index: U256,
    pub nonce: U256,
    pub encrypted_shares: Vec<U256>,
    pub commitments: Vec<[U256; 2]>,
}

impl SharesDistributed {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .data("account", DynSolType::Address)
            .data("index", uint256())
            .data("nonce", uint256())
            .data("encryptedShares", DynSolType::Array(Box::new(uint256())))
            .data("commitments", DynSolType::Array(Box::new(uint256_array(2))))
    }
}

impl ContractEvent for SharesDistributed {
    const NAME: &'static str = "SharesDistributed";
    const SIGNATURE: &'static str =
        "SharesDistributed(address,uint256,uint256,uint256[],uint256[2][])";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            account: f.address("account")?,
            index: f.uint("index")?,
            nonce: f.uint("nonce")?,
            encrypted_shares: f.uint_vec("encryptedShares")?,
            commitments: f.uint_array_vec("commitments")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyShareSubmitted {
    pub account: Address,
    pub index: U256,
    pub nonce: U256,
    pub key_share_g1: [U256; 2],
    pub key_share_g1_correctness_proof: [U256; 2],
    pub key_share_g2: [U256; 4],
}

impl KeyShareSubmitted {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .data("account", DynSolType::Address)
            .data("index", uint256())
            .data("nonce", uint256())
            .data("keyShareG1", uint256_array(2))
            .data("keyShareG1CorrectnessProof", uint256_array(2))
            .data("keyShareG2", uint256_array(4))
    }
}

impl ContractEvent for KeyShareSubmitted {
    const NAME: &'static str = "KeyShareSubmitted";
    const SIGNATURE: &'static str =
        "KeyShareSubmitted(address,uint256,uint256,uint256[2],uint256[2],uint256[4])";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            account: f.address("account")?,
            index: f.uint("index")?,
            nonce: f.uint("nonce")?,
            key_share_g1: f.uint_array("keyShareG1")?,
            key_share_g1_correctness_proof: f.uint_array("keyShareG1CorrectnessProof")?,
            key_share_g2: f.uint_array("keyShareG2")?,
        })
    }
}

/// The master public key of the round has been set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MPKSet {
    pub block_number: U256,
    pub nonce: U256,
    pub mpk: [U256; 4],
}

impl MPKSet {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .data("blockNumber", uint256())
            .data("nonce", uint256())
            .data("mpk", uint256_array(4))
    }
}

impl ContractEvent for MPKSet {
    const NAME: &'static str = "MPKSet";
    const SIGNATURE: &'static str = "MPKSet(uint256,uint256,uint256[4])";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            block_number: f.uint("blockNumber")?,
            nonce: f.uint("nonce")?,
            mpk: f.uint_array("mpk")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorMemberAdded {
    pub account: Address,
    pub index: U256,
    pub nonce: U256,
    pub epoch: U256,
    pub share0: U256,
    pub share1: U256,
    pub share2: U256,
    pub share3: U256,
}

impl ValidatorMemberAdded {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .data("account", DynSolType::Address)
            .data("index", uint256())
            .data("nonce", uint256())
            .data("epoch", uint256())
            .data("share0", uint256())
            .data("share1", uint256())
            .data("share2", uint256())
            .data("share3", uint256())
    }
}

impl ContractEvent for ValidatorMemberAdded {
    const NAME: &'static str = "ValidatorMemberAdded";
    const SIGNATURE: &'static str =
        "ValidatorMemberAdded(address,uint256,uint256,uint256,uint256,uint256,uint256,uint256)";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            account: f.address("account")?,
            index: f.uint("index")?,
            nonce: f.uint("nonce")?,
            epoch: f.uint("epoch")?,
            share0: f.uint("share0")?,
            share1: f.uint("share1")?,
            share2: f.uint("share2")?,
            share3: f.uint("share3")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorSetCompleted {
    pub validator_count: U256,
    pub nonce: U256,
    pub epoch: U256,
    pub eth_height: U256,
    pub alice_net_height: U256,
    pub group_key0: U256,
    pub group_key1: U256,
    pub group_key2: U256,
    pub group_key3: U256,
}

impl ValidatorSetCompleted {
    pub fn layout() -> EventLayout {
        EventLayout::new(Self::NAME)
            .data("validatorCount", uint256())
            .data("nonce", uint256())
            .data("epoch", uint256())
            .data("ethHeight", uint256())
            .data("aliceNetHeight", uint256())
            .data("groupKey0", uint256())
            .data("groupKey1", uint256())
            .data("groupKey2", uint256())
            .data("groupKey3", uint256())
    }
}

impl ContractEvent for ValidatorSetCompleted {
    const NAME: &'static str = "ValidatorSetCompleted";
    const SIGNATURE: &'static str = "ValidatorSetCompleted(uint256,uint256,uint256,uint256,uint256,uint256,uint256,uint256,uint256)";
    const INDEXED_ARITY: usize = 0;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        let f = Self::layout().decode(indexed, data)?;
        Ok(Self {
            validator_count: f.uint("validatorCount")?,
            nonce: f.uint("nonce")?,
            epoch: f.uint("epoch")?,
            eth_height: f.uint("ethHeight")?,
            alice_net_height: f.uint("aliceNetHeight")?,
            group_key0: f.uint("groupKey0")?,
            group_key1: f.uint("groupKey1")?,
            group_key2: f.uint("groupKey2")?,
            group_key3: f.uint("groupKey3")?,
        })
    }
}

event_set! {
    pub enum EthdkgEvent("ETHDKG") {
        RegistrationOpened,
        AddressRegistered,
        RegistrationComplete,
        SharesDistributed,
        ShareDistributionComplete,
        KeyShareSubmitted,
        KeyShareSubmissionComplete,
        MPKSet,
        ValidatorMemberAdded,
        GPKJSubmissionComplete,
        ValidatorSetCompleted,
        Initialized,
    }
}
