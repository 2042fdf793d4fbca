//! Event signature topics and indexed-value topic encoding.
//!
//! The topic of an EVM event is the keccak256 hash of its canonical
//! signature string, e.g.:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! Indexed value types occupy one 32-byte topic each, left-padded.
//! Reference types (string, bytes, arrays, tuples) are stored as the
//! keccak256 of their encoding; build those with [`hashed_topic`].

use alloy_primitives::{Address, B256, U256};
use tiny_keccak::{Hasher, Keccak};

/// keccak256 of arbitrary bytes.
pub fn keccak256(bytes: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(bytes);
    hasher.finalize(&mut output);
    B256::from(output)
}

/// Compute topics[0] for an event signature.
/// Input: `"EventName(type1,type2,...)"`, the canonical ABI signature.
pub fn event_topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// Topic value for an indexed reference-type field (string, bytes, ...).
pub fn hashed_topic(encoded: &[u8]) -> B256 {
    keccak256(encoded)
}

/// Conversion of an indexed field value into its 32-byte topic form.
pub trait IntoTopic {
    fn into_topic(self) -> B256;
}

impl IntoTopic for B256 {
    fn into_topic(self) -> B256 {
        self
    }
}

impl IntoTopic for Address {
    fn into_topic(self) -> B256 {
        self.into_word()
    }
}

impl IntoTopic for U256 {
    fn into_topic(self) -> B256 {
        B256::from(self.to_be_bytes::<32>())
    }
}

impl IntoTopic for u64 {
    fn into_topic(self) -> B256 {
        U256::from(self).into_topic()
    }
}

impl IntoTopic for bool {
    fn into_topic(self) -> B256 {
        B256::with_last_byte(self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_transfer_topic() {
        let topic = event_topic("Transfer(address,address,uint256)");
        assert_eq!(
            topic.to_string(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn address_topic_is_left_padded() {
        let addr = Address::repeat_byte(0xab);
        let topic = addr.into_topic();
        assert_eq!(&topic[..12], &[0u8; 12]);
        assert_eq!(&topic[12..], addr.as_slice());
    }

    #[test]
    fn integer_topics_are_big_endian() {
        let topic = 0x0102u64.into_topic();
        assert_eq!(topic[30], 0x01);
        assert_eq!(topic[31], 0x02);
        assert_eq!(topic, U256::from(0x0102u64).into_topic());
        assert_eq!(true.into_topic()[31], 1);
    }
}
