//! Shared fixtures: a hand-decoded ERC-20 `Transfer` event and log builders.

#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, B256, U256};
use chainevents_core::{ContractEvent, DecodeError, IntoTopic, RawLog};

pub fn token() -> Address {
    Address::repeat_byte(0xee)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

impl ContractEvent for Transfer {
    const NAME: &'static str = "Transfer";
    const SIGNATURE: &'static str = "Transfer(address,address,uint256)";
    const INDEXED_ARITY: usize = 2;

    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != 32 {
            return Err(DecodeError::invalid_payload(
                Self::NAME,
                format!("value: expected 32 bytes, got {}", data.len()),
            ));
        }
        Ok(Transfer {
            from: Address::from_word(indexed[0]),
            to: Address::from_word(indexed[1]),
            value: U256::from_be_slice(data),
        })
    }
}

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// A well-formed Transfer log at `(block, index)`.
pub fn transfer(from: Address, to: Address, value: u64, block: u64, index: u64) -> RawLog {
    RawLog::new(
        token(),
        vec![
            Transfer::signature_hash(),
            from.into_topic(),
            to.into_topic(),
        ],
        Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec()),
    )
    .at(block, index)
}

/// A Transfer log whose payload is truncated and cannot be decoded.
pub fn broken_transfer(block: u64, index: u64) -> RawLog {
    let mut log = transfer(addr(1), addr(2), 0, block, index);
    log.data = Bytes::from(vec![0u8; 7]);
    log
}
