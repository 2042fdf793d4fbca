//! Decoding logs with mixed static, dynamic and tuple parameters.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, U256};
use chainevents_core::{event_topic, DecodeError};
use chainevents_evm::EventLayout;

fn uint(v: u64, bits: usize) -> DynSolValue {
    DynSolValue::Uint(U256::from(v), bits)
}

fn hex_word(s: &str) -> B256 {
    let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s)).unwrap();
    B256::from_slice(&bytes)
}

/// `Claimed(address indexed who, uint32 round, bytes proof, (uint32,bytes32) header)`
fn claimed() -> EventLayout {
    EventLayout::new("Claimed")
        .indexed("who", DynSolType::Address)
        .data("round", DynSolType::Uint(32))
        .data("proof", DynSolType::Bytes)
        .data(
            "header",
            DynSolType::Tuple(vec![DynSolType::Uint(32), DynSolType::FixedBytes(32)]),
        )
}

#[test]
fn signature_renders_tuples_inline() {
    assert_eq!(
        claimed().signature(),
        "Claimed(address,uint32,bytes,(uint32,bytes32))"
    );
}

#[test]
fn decodes_dynamic_payload() {
    let who = Address::repeat_byte(0x42);
    let root = B256::repeat_byte(0x07);
    let data = DynSolValue::Tuple(vec![
        uint(12, 32),
        DynSolValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
        DynSolValue::Tuple(vec![uint(3, 32), DynSolValue::FixedBytes(root, 32)]),
    ])
    .abi_encode_params();

    let fields = claimed().decode(&[who.into_word()], &data).unwrap();
    assert_eq!(fields.address("who").unwrap(), who);
    assert_eq!(fields.small::<u32>("round").unwrap(), 12);
    assert_eq!(fields.bytes("proof").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);

    let header = fields.tuple("header", &["chainId", "root"]).unwrap();
    assert_eq!(header.small::<u32>("chainId").unwrap(), 3);
    assert_eq!(header.word("root").unwrap(), root);
}

#[test]
fn truncated_dynamic_payload_fails() {
    let data = DynSolValue::Tuple(vec![
        uint(12, 32),
        DynSolValue::Bytes(vec![1; 40]),
        DynSolValue::Tuple(vec![uint(3, 32), DynSolValue::FixedBytes(B256::ZERO, 32)]),
    ])
    .abi_encode_params();

    let err = claimed()
        .decode(&[B256::ZERO], &data[..data.len() - 32])
        .unwrap_err();
    assert!(matches!(err, DecodeError::InvalidPayload { .. }));
}

#[test]
fn layout_signature_hashes_to_known_topic() {
    let layout = EventLayout::new("Approval")
        .indexed("owner", DynSolType::Address)
        .indexed("spender", DynSolType::Address)
        .data("value", DynSolType::Uint(256));
    assert_eq!(
        event_topic(&layout.signature()),
        hex_word("0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925")
    );
}
