//! `FilterCriteria`: which logs to retrieve, and the single predicate that
//! decides whether a log matches.

use crate::decoder::ContractEvent;
use crate::error::FilterError;
use crate::log::RawLog;
use crate::signature::IntoTopic;
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Acceptable values for one indexed field. An empty set is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSet(Vec<B256>);

impl TopicSet {
    /// Matches any value.
    pub fn any() -> Self {
        Self(Vec::new())
    }

    /// Matches exactly one value.
    pub fn exact(value: impl IntoTopic) -> Self {
        Self(vec![value.into_topic()])
    }

    /// Matches any of the given values. An empty iterator yields a wildcard.
    pub fn of<T: IntoTopic>(values: impl IntoIterator<Item = T>) -> Self {
        let mut topics: Vec<B256> = Vec::new();
        for topic in values.into_iter().map(IntoTopic::into_topic) {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        Self(topics)
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.is_empty()
    }

    pub fn accepts(&self, topic: &B256) -> bool {
        self.0.is_empty() || self.0.contains(topic)
    }

    pub fn values(&self) -> &[B256] {
        &self.0
    }

    fn to_rpc(&self) -> Value {
        match self.0.as_slice() {
            [] => Value::Null,
            [one] => json!(one),
            many => json!(many),
        }
    }
}

/// Block window of a query or subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BlockRange {
    /// Bounded historical window. `to: None` means "up to the latest block".
    Historical { from: u64, to: Option<u64> },
    /// Live feed. `from: None` is the "from now" marker.
    Live { from: Option<u64> },
}

impl Default for BlockRange {
    fn default() -> Self {
        BlockRange::Historical { from: 0, to: None }
    }
}

impl BlockRange {
    pub fn is_live(&self) -> bool {
        matches!(self, BlockRange::Live { .. })
    }

    pub fn contains(&self, block_number: u64) -> bool {
        match *self {
            BlockRange::Historical { from, to } => {
                block_number >= from && to.map_or(true, |to| block_number <= to)
            }
            BlockRange::Live { from } => from.map_or(true, |from| block_number >= from),
        }
    }

    fn mode(&self) -> &'static str {
        match self {
            BlockRange::Historical { .. } => "historical",
            BlockRange::Live { .. } => "live",
        }
    }
}

/// Declarative description of which logs to retrieve.
///
/// Built per event with [`FilterCriteria::for_event`], which rejects a topic
/// set count that differs from the event's indexed arity. Deserialization
/// goes through the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CriteriaFields")]
pub struct FilterCriteria {
    /// Event (or event set) name, for diagnostics
    event: String,
    /// Emitting contracts (empty = any contract)
    addresses: Vec<Address>,
    /// Acceptable topics[0] values
    signatures: Vec<B256>,
    /// Indexed field count of the single selected event; `None` for a
    /// signature set, which carries no indexed constraints
    arity: Option<usize>,
    /// One set per indexed field, in declaration order
    indexed: Vec<TopicSet>,
    range: BlockRange,
}

/// Unchecked wire form of [`FilterCriteria`].
#[derive(Deserialize)]
struct CriteriaFields {
    event: String,
    #[serde(default)]
    addresses: Vec<Address>,
    signatures: Vec<B256>,
    #[serde(default)]
    arity: Option<usize>,
    #[serde(default)]
    indexed: Vec<TopicSet>,
    #[serde(default)]
    range: BlockRange,
}

impl TryFrom<CriteriaFields> for FilterCriteria {
    type Error = FilterError;

    fn try_from(fields: CriteriaFields) -> Result<Self, Self::Error> {
        let CriteriaFields {
            event,
            addresses,
            signatures,
            arity,
            indexed,
            range,
        } = fields;

        let criteria = match arity {
            Some(arity) => {
                let [signature] = signatures[..] else {
                    return Err(FilterError::SignatureCount {
                        event,
                        got: signatures.len(),
                    });
                };
                Self::new(event, signature, arity, indexed)?
            }
            None if indexed.is_empty() => Self::for_signatures(event, signatures),
            None => {
                return Err(FilterError::ArityMismatch {
                    event,
                    expected: 0,
                    got: indexed.len(),
                })
            }
        };

        let criteria = criteria.with_addresses(addresses);
        match range {
            BlockRange::Historical { from, to } => criteria.between(from, to),
            BlockRange::Live { from: Some(from) } => Ok(criteria.live_from(from)),
            BlockRange::Live { from: None } => Ok(criteria.live()),
        }
    }
}

impl FilterCriteria {
    /// Criteria for a single event with explicit per-field topic sets.
    pub fn new(
        event: impl Into<String>,
        signature: B256,
        indexed_arity: usize,
        indexed: Vec<TopicSet>,
    ) -> Result<Self, FilterError> {
        let event = event.into();
        if indexed.len() != indexed_arity {
            return Err(FilterError::ArityMismatch {
                event,
                expected: indexed_arity,
                got: indexed.len(),
            });
        }
        Ok(Self {
            event,
            addresses: Vec::new(),
            signatures: vec![signature],
            arity: Some(indexed_arity),
            indexed,
            range: BlockRange::default(),
        })
    }

    /// Criteria for event `E`; `indexed` must hold one set per indexed field.
    pub fn for_event<E: ContractEvent>(indexed: Vec<TopicSet>) -> Result<Self, FilterError> {
        Self::new(E::NAME, E::signature_hash(), E::INDEXED_ARITY, indexed)
    }

    /// Criteria for event `E` with every indexed field left as a wildcard.
    pub fn any_of<E: ContractEvent>() -> Self {
        Self {
            event: E::NAME.to_string(),
            addresses: Vec::new(),
            signatures: vec![E::signature_hash()],
            arity: Some(E::INDEXED_ARITY),
            indexed: vec![TopicSet::any(); E::INDEXED_ARITY],
            range: BlockRange::default(),
        }
    }

    /// Criteria matching any of several event signatures (e.g. every event
    /// a contract emits).
    ///
    /// This is the signature-only form: it never constrains indexed fields
    /// and records no arity, so there is nothing to check against topic
    /// sets. To filter on indexed values of one event use
    /// [`for_event`](Self::for_event) or [`new`](Self::new).
    pub fn for_signatures(name: impl Into<String>, signatures: Vec<B256>) -> Self {
        Self {
            event: name.into(),
            addresses: Vec::new(),
            signatures,
            arity: None,
            indexed: Vec::new(),
            range: BlockRange::default(),
        }
    }

    /// Restrict to logs emitted by `address` (can be called multiple times).
    pub fn at(mut self, address: Address) -> Self {
        if !self.addresses.contains(&address) {
            self.addresses.push(address);
        }
        self
    }

    pub fn with_addresses(mut self, addresses: impl IntoIterator<Item = Address>) -> Self {
        for address in addresses {
            self = self.at(address);
        }
        self
    }

    /// Historical window `[from, to]`; `to: None` means up to the latest block.
    pub fn between(mut self, from: u64, to: Option<u64>) -> Result<Self, FilterError> {
        if let Some(to) = to {
            if from > to {
                return Err(FilterError::InvalidRange { from, to });
            }
        }
        self.range = BlockRange::Historical { from, to };
        Ok(self)
    }

    /// Switch to live mode, starting from the next block that arrives.
    pub fn live(mut self) -> Self {
        self.range = BlockRange::Live { from: None };
        self
    }

    /// Switch to live mode, ignoring any arriving log before `from`.
    pub fn live_from(mut self, from: u64) -> Self {
        self.range = BlockRange::Live { from: Some(from) };
        self
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn signatures(&self) -> &[B256] {
        &self.signatures
    }

    /// Declared indexed arity; `None` for signature-only criteria.
    pub fn indexed_arity(&self) -> Option<usize> {
        self.arity
    }

    pub fn indexed(&self) -> &[TopicSet] {
        &self.indexed
    }

    pub fn range(&self) -> BlockRange {
        self.range
    }

    /// Fails unless the criteria are in the requested mode.
    pub(crate) fn require_mode(&self, live: bool) -> Result<(), FilterError> {
        if self.range.is_live() == live {
            return Ok(());
        }
        let expected = if live { "live" } else { "historical" };
        Err(FilterError::RangeMode {
            event: self.event.clone(),
            expected,
            actual: self.range.mode(),
        })
    }

    /// The selection predicate shared by historical and live mode.
    pub fn matches(&self, log: &RawLog) -> bool {
        if !self.addresses.is_empty() && !self.addresses.contains(&log.address) {
            return false;
        }
        match log.signature() {
            Some(sig) if self.signatures.is_empty() || self.signatures.contains(&sig) => {}
            _ => return false,
        }
        if !self.range.contains(log.block_number) {
            return false;
        }
        let topics = log.indexed_topics();
        self.indexed.iter().enumerate().all(|(i, set)| {
            if set.is_wildcard() {
                return true;
            }
            topics.get(i).is_some_and(|topic| set.accepts(topic))
        })
    }

    /// Render as a JSON-RPC filter object (`eth_getLogs` / `eth_subscribe`).
    ///
    /// Live criteria carry no block bounds; trailing wildcard topics are
    /// trimmed since nodes treat missing positions as wildcards.
    pub fn to_rpc_filter(&self) -> Value {
        let mut filter = serde_json::Map::new();

        match self.addresses.as_slice() {
            [] => {}
            [one] => {
                filter.insert("address".into(), json!(one));
            }
            many => {
                filter.insert("address".into(), json!(many));
            }
        }

        let mut topics = Vec::with_capacity(1 + self.indexed.len());
        topics.push(match self.signatures.as_slice() {
            [] => Value::Null,
            [one] => json!(one),
            many => json!(many),
        });
        topics.extend(self.indexed.iter().map(TopicSet::to_rpc));
        while topics.len() > 1 && topics.last().is_some_and(Value::is_null) {
            topics.pop();
        }
        if !(topics.len() == 1 && topics[0].is_null()) {
            filter.insert("topics".into(), Value::Array(topics));
        }

        if let BlockRange::Historical { from, to } = self.range {
            filter.insert("fromBlock".into(), json!(format!("{from:#x}")));
            let to = to.map_or_else(|| "latest".to_string(), |to| format!("{to:#x}"));
            filter.insert("toBlock".into(), json!(to));
        }

        Value::Object(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::event_topic;
    use alloy_primitives::Bytes;

    fn transfer_sig() -> B256 {
        event_topic("Transfer(address,address,uint256)")
    }

    fn transfer_criteria(from: TopicSet, to: TopicSet) -> FilterCriteria {
        FilterCriteria::new("Transfer", transfer_sig(), 2, vec![from, to]).unwrap()
    }

    fn transfer_log(from: Address, to: Address, block: u64) -> RawLog {
        RawLog::new(
            Address::repeat_byte(0xaa),
            vec![transfer_sig(), from.into_topic(), to.into_topic()],
            Bytes::from(vec![0u8; 32]),
        )
        .at(block, 0)
    }

    #[test]
    fn arity_mismatch_is_rejected_at_construction() {
        let err = FilterCriteria::new("Transfer", transfer_sig(), 2, vec![TopicSet::any()])
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::ArityMismatch {
                event: "Transfer".into(),
                expected: 2,
                got: 1
            }
        );
        assert!(FilterCriteria::new("Transfer", transfer_sig(), 2, vec![TopicSet::any(); 3]).is_err());
    }

    fn tampered(criteria: &FilterCriteria, field: &str, value: Value) -> Value {
        let mut raw = serde_json::to_value(criteria).unwrap();
        raw[field] = value;
        raw
    }

    #[test]
    fn deserialization_rechecks_arity() {
        let criteria = transfer_criteria(TopicSet::any(), TopicSet::any())
            .at(Address::repeat_byte(0xaa))
            .between(5, Some(9))
            .unwrap();
        let raw = serde_json::to_value(&criteria).unwrap();
        let back: FilterCriteria = serde_json::from_value(raw).unwrap();
        assert_eq!(back, criteria);
        assert_eq!(back.indexed_arity(), Some(2));

        let three = serde_json::to_value(vec![TopicSet::any(); 3]).unwrap();
        let err = serde_json::from_value::<FilterCriteria>(tampered(&criteria, "indexed", three))
            .unwrap_err();
        assert!(err.to_string().contains("declares 2 indexed fields, got 3"), "{err}");

        let sigs = json!([transfer_sig(), B256::repeat_byte(1)]);
        let err = serde_json::from_value::<FilterCriteria>(tampered(&criteria, "signatures", sigs))
            .unwrap_err();
        assert!(err.to_string().contains("exactly one signature"), "{err}");
    }

    #[test]
    fn deserialized_historical_range_is_checked() {
        let criteria = transfer_criteria(TopicSet::any(), TopicSet::any());
        let range = json!({ "mode": "historical", "from": 10, "to": 3 });
        let err = serde_json::from_value::<FilterCriteria>(tampered(&criteria, "range", range))
            .unwrap_err();
        assert!(err.to_string().contains("from 10 is after to 3"), "{err}");
    }

    #[test]
    fn signature_set_carries_no_indexed_sets() {
        let criteria = FilterCriteria::for_signatures("ALCA", vec![transfer_sig()]).live_from(7);
        assert_eq!(criteria.indexed_arity(), None);
        let back: FilterCriteria =
            serde_json::from_value(serde_json::to_value(&criteria).unwrap()).unwrap();
        assert_eq!(back, criteria);

        let one = serde_json::to_value(vec![TopicSet::any()]).unwrap();
        let err = serde_json::from_value::<FilterCriteria>(tampered(&criteria, "indexed", one))
            .unwrap_err();
        assert!(err.to_string().contains("declares 0 indexed fields, got 1"), "{err}");
    }

    #[test]
    fn wildcard_matches_any_value() {
        let criteria = transfer_criteria(TopicSet::any(), TopicSet::any());
        assert!(criteria.matches(&transfer_log(Address::repeat_byte(1), Address::repeat_byte(2), 1)));
    }

    #[test]
    fn topic_set_restricts_position() {
        let abc = Address::repeat_byte(0xab);
        let criteria = transfer_criteria(TopicSet::any(), TopicSet::exact(abc));
        assert!(criteria.matches(&transfer_log(Address::repeat_byte(1), abc, 1)));
        assert!(!criteria.matches(&transfer_log(abc, Address::repeat_byte(1), 1)));
    }

    #[test]
    fn signature_and_address_must_match() {
        let criteria = transfer_criteria(TopicSet::any(), TopicSet::any()).at(Address::repeat_byte(0xbb));
        assert!(!criteria.matches(&transfer_log(Address::ZERO, Address::ZERO, 1)));

        let mut log = transfer_log(Address::ZERO, Address::ZERO, 1);
        log.address = Address::repeat_byte(0xbb);
        assert!(criteria.matches(&log));
        log.topics[0] = B256::repeat_byte(0x01);
        assert!(!criteria.matches(&log));
    }

    #[test]
    fn block_range_bounds_are_inclusive() {
        let criteria = transfer_criteria(TopicSet::any(), TopicSet::any())
            .between(10, Some(20))
            .unwrap();
        assert!(!criteria.matches(&transfer_log(Address::ZERO, Address::ZERO, 9)));
        assert!(criteria.matches(&transfer_log(Address::ZERO, Address::ZERO, 10)));
        assert!(criteria.matches(&transfer_log(Address::ZERO, Address::ZERO, 20)));
        assert!(!criteria.matches(&transfer_log(Address::ZERO, Address::ZERO, 21)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = transfer_criteria(TopicSet::any(), TopicSet::any())
            .between(5, Some(4))
            .unwrap_err();
        assert_eq!(err, FilterError::InvalidRange { from: 5, to: 4 });
    }

    #[test]
    fn missing_topic_fails_a_constrained_position() {
        let criteria = transfer_criteria(TopicSet::exact(Address::ZERO), TopicSet::any());
        let short = RawLog::new(Address::ZERO, vec![transfer_sig()], Bytes::new());
        assert!(!criteria.matches(&short));
    }

    #[test]
    fn rpc_filter_trims_trailing_wildcards() {
        let from = Address::repeat_byte(0x01);
        let criteria = transfer_criteria(TopicSet::exact(from), TopicSet::any())
            .between(16, None)
            .unwrap();
        let filter = criteria.to_rpc_filter();
        let topics = filter["topics"].as_array().unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0], json!(transfer_sig()));
        assert_eq!(filter["fromBlock"], "0x10");
        assert_eq!(filter["toBlock"], "latest");
        assert!(filter.get("address").is_none());
    }

    #[test]
    fn live_rpc_filter_has_no_block_bounds() {
        let criteria = transfer_criteria(TopicSet::any(), TopicSet::any())
            .at(Address::repeat_byte(0x02))
            .live();
        let filter = criteria.to_rpc_filter();
        assert!(filter.get("fromBlock").is_none());
        assert!(filter.get("toBlock").is_none());
        assert!(filter["address"].is_string());
    }

    #[test]
    fn topic_set_of_deduplicates() {
        let a = Address::repeat_byte(0x01);
        let set = TopicSet::of([a, a, Address::repeat_byte(0x02)]);
        assert_eq!(set.values().len(), 2);
        assert!(TopicSet::of(Vec::<Address>::new()).is_wildcard());
    }
}
