//! Decoding logs through the per-contract event sets and the router.

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};
use chainevents_bindings::{
    dynamics::DynamicsEvent,
    ethdkg::{EthdkgEvent, SharesDistributed},
    governance::ValueUpdated,
    snapshots::{SnapshotTaken, SnapshotsEvent},
    tokens::{TokenEvent, Transfer},
    validator_pool::{ValidatorPoolEvent, ValidatorMajorSlashed},
    AliceNetEvent, Contract, EventRouter,
};
use chainevents_core::{
    ContractEvent, DecodeError, DecodeLog, Decoded, EventFilterer, IntoTopic, MemoryLogSource,
    RawLog,
};

fn uint(v: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(v), 256)
}

fn uint32(v: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(v), 32)
}

fn word(b: u8) -> DynSolValue {
    DynSolValue::FixedBytes(B256::repeat_byte(b), 32)
}

fn fixed(values: &[u64]) -> DynSolValue {
    DynSolValue::FixedArray(values.iter().map(|v| uint(*v)).collect())
}

fn data(values: Vec<DynSolValue>) -> Vec<u8> {
    DynSolValue::Tuple(values).abi_encode_params()
}

fn log<E: ContractEvent>(address: Address, indexed: Vec<B256>, payload: Vec<u8>) -> RawLog {
    let mut topics = vec![E::signature_hash()];
    topics.extend(indexed);
    RawLog::new(address, topics, payload)
}

fn transfer_log(from: Address, to: Address, value: u64) -> RawLog {
    log::<Transfer>(
        Address::repeat_byte(0xa1),
        vec![from.into_topic(), to.into_topic()],
        data(vec![uint(value)]),
    )
}

fn snapshot_log() -> RawLog {
    let validator = Address::repeat_byte(0x77);
    log::<SnapshotTaken>(
        Address::repeat_byte(0x5a),
        vec![U256::from(12u64).into_topic(), validator.into_topic()],
        data(vec![
            uint(42),
            uint(1024),
            DynSolValue::Bool(true),
            fixed(&[1, 2, 3, 4]),
            fixed(&[5, 6]),
            DynSolValue::Tuple(vec![
                uint32(42),
                uint32(1024),
                uint32(3),
                word(0x01),
                word(0x02),
                word(0x03),
                word(0x04),
            ]),
        ]),
    )
}

#[test]
fn transfer_decodes_with_provenance() {
    let raw = transfer_log(Address::repeat_byte(1), Address::repeat_byte(2), 500).at(77, 3);
    let event = Decoded::<Transfer>::decode_log(&raw).unwrap();
    assert_eq!(event.from, Address::repeat_byte(1));
    assert_eq!(event.to, Address::repeat_byte(2));
    assert_eq!(event.value, U256::from(500u64));
    assert_eq!(event.raw.block_number, 77);
    assert_eq!(event.raw.log_index, 3);
}

#[test]
fn erc721_style_transfer_is_rejected() {
    // Same signature hash, but tokenId is indexed: three topics after topics[0].
    let raw = log::<Transfer>(
        Address::ZERO,
        vec![B256::ZERO, B256::ZERO, U256::from(9u64).into_topic()],
        Vec::new(),
    );
    assert_eq!(
        Decoded::<Transfer>::decode_log(&raw).unwrap_err(),
        DecodeError::TopicCountMismatch {
            event: "Transfer".into(),
            expected: 2,
            got: 3
        }
    );
}

#[test]
fn snapshot_taken_decodes_bclaims() {
    let event = Decoded::<SnapshotTaken>::decode_log(&snapshot_log()).unwrap();
    assert_eq!(event.chain_id, U256::from(42u64));
    assert_eq!(event.epoch, U256::from(12u64));
    assert_eq!(event.validator, Address::repeat_byte(0x77));
    assert!(event.is_safe_to_proceed_consensus);
    assert_eq!(event.master_public_key[3], U256::from(4u64));
    assert_eq!(event.signature, [U256::from(5u64), U256::from(6u64)]);
    assert_eq!(event.b_claims.height, 1024);
    assert_eq!(event.b_claims.tx_count, 3);
    assert_eq!(event.b_claims.header_root, B256::repeat_byte(0x04));
}

#[test]
fn shares_distributed_decodes_dynamic_arrays() {
    let raw = log::<SharesDistributed>(
        Address::ZERO,
        vec![],
        data(vec![
            DynSolValue::Address(Address::repeat_byte(0x10)),
            uint(2),
            uint(1),
            DynSolValue::Array(vec![uint(100), uint(200), uint(300)]),
            DynSolValue::Array(vec![fixed(&[1, 2]), fixed(&[3, 4])]),
        ]),
    );
    let event = Decoded::<SharesDistributed>::decode_log(&raw).unwrap();
    assert_eq!(event.encrypted_shares.len(), 3);
    assert_eq!(event.commitments[1], [U256::from(3u64), U256::from(4u64)]);
}

#[test]
fn value_updated_reads_three_topics() {
    let raw = log::<ValueUpdated>(
        Address::ZERO,
        vec![
            U256::from(5u64).into_topic(),
            U256::from(8u64).into_topic(),
            B256::repeat_byte(0xcc),
        ],
        data(vec![DynSolValue::Address(Address::repeat_byte(0xdd))]),
    );
    let event = Decoded::<ValueUpdated>::decode_log(&raw).unwrap();
    assert_eq!(event.key, U256::from(8u64));
    assert_eq!(event.value, B256::repeat_byte(0xcc));
    assert_eq!(event.who, Address::repeat_byte(0xdd));
}

#[test]
fn event_set_dispatches_on_topic0() {
    let raw = snapshot_log();
    match SnapshotsEvent::decode_log(&raw).unwrap() {
        SnapshotsEvent::SnapshotTaken(e) => assert_eq!(e.raw, raw),
        other => panic!("unexpected {}", other.name()),
    }

    let slashed = log::<ValidatorMajorSlashed>(
        Address::ZERO,
        vec![Address::repeat_byte(3).into_topic()],
        Vec::new(),
    );
    let event = ValidatorPoolEvent::decode_log(&slashed).unwrap();
    assert_eq!(event.name(), "ValidatorMajorSlashed");
}

#[test]
fn event_set_rejects_foreign_signature() {
    let raw = transfer_log(Address::ZERO, Address::ZERO, 1);
    assert_eq!(
        EthdkgEvent::decode_log(&raw).unwrap_err(),
        DecodeError::UnknownEvent {
            signature: Transfer::signature_hash()
        }
    );
    assert!(matches!(
        DynamicsEvent::decode_log(&RawLog::new(Address::ZERO, vec![], Vec::<u8>::new())),
        Err(DecodeError::MissingSignature { .. })
    ));
}

#[test]
fn router_picks_binding_by_address() {
    let token = Address::repeat_byte(0xa1);
    let snapshots = Address::repeat_byte(0x5a);
    let router = EventRouter::new()
        .with(token, Contract::Alca)
        .with(snapshots, Contract::Snapshots);

    let event = router
        .decode(&transfer_log(Address::ZERO, Address::repeat_byte(9), 1))
        .unwrap();
    assert!(matches!(event, AliceNetEvent::Token(TokenEvent::Transfer(_))));
    assert_eq!(event.raw().address, token);

    let event = router.decode(&snapshot_log()).unwrap();
    assert_eq!(event.name(), "SnapshotTaken");
}

#[test]
fn decoded_events_serialize_with_names() {
    let raw = transfer_log(Address::repeat_byte(1), Address::repeat_byte(2), 16);
    let event = Contract::Alca.decode(&raw).unwrap();
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["contract"], "Token");
    assert_eq!(json["event"]["name"], "Transfer");
    assert_eq!(json["event"]["event"]["value"], "0x10");
    assert!(json["event"]["raw"]["topics"].is_array());
}

#[tokio::test]
async fn typed_filter_queries_by_recipient() {
    let abc = Address::repeat_byte(0xab);
    let source = MemoryLogSource::with_logs(vec![
        transfer_log(Address::repeat_byte(1), abc, 10).at(1, 0),
        transfer_log(Address::repeat_byte(1), Address::repeat_byte(2), 20).at(2, 0),
        transfer_log(abc, Address::repeat_byte(3), 30).at(3, 0),
        transfer_log(Address::repeat_byte(4), abc, 40).at(4, 0),
    ]);
    let criteria = Transfer::filter(None, Some(abc)).unwrap();
    let values: Vec<U256> = EventFilterer::new(source)
        .query::<Decoded<Transfer>>(criteria)
        .await
        .unwrap()
        .map(|item| item.unwrap().value)
        .collect();
    assert_eq!(values, vec![U256::from(10u64), U256::from(40u64)]);
}
