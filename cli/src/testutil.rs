use alloy_primitives::{Address, U256};
use chainevents_bindings::tokens::Transfer;
use chainevents_core::{ContractEvent, RawLog};

pub fn token() -> Address {
    Address::repeat_byte(0x0a)
}

/// ALCA `Transfer` of `value` from 0x01.. to 0x02.. at `block:index`.
pub fn transfer_log(block: u64, index: u64, value: u64) -> RawLog {
    RawLog::new(
        token(),
        vec![
            Transfer::signature_hash(),
            Address::repeat_byte(0x01).into_word(),
            Address::repeat_byte(0x02).into_word(),
        ],
        U256::from(value).to_be_bytes::<32>().to_vec(),
    )
    .at(block, index)
}
