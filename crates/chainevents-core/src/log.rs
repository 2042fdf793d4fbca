//! Raw log records as produced by an RPC node.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// A raw, undecoded EVM log. This is the input to every decoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawLog {
    /// Contract address that emitted the log
    pub address: Address,
    /// topics[0] is the event signature hash; additional topics are indexed params
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed parameters
    pub data: Bytes,
    pub block_number: u64,
    pub block_hash: B256,
    pub transaction_hash: B256,
    pub transaction_index: u64,
    /// Log index within the block
    pub log_index: u64,
    /// Set when the log was dropped by a chain reorganisation
    #[serde(default)]
    pub removed: bool,
}

impl RawLog {
    /// Build a log with zeroed positional metadata.
    pub fn new(address: Address, topics: Vec<B256>, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            topics,
            data: data.into(),
            block_number: 0,
            block_hash: B256::ZERO,
            transaction_hash: B256::ZERO,
            transaction_index: 0,
            log_index: 0,
            removed: false,
        }
    }

    /// Set the block number and in-block log index.
    pub fn at(mut self, block_number: u64, log_index: u64) -> Self {
        self.block_number = block_number;
        self.log_index = log_index;
        self
    }

    /// topics[0], the event signature hash, if present.
    pub fn signature(&self) -> Option<B256> {
        self.topics.first().copied()
    }

    /// topics[1..], the indexed field values.
    pub fn indexed_topics(&self) -> &[B256] {
        self.topics.get(1..).unwrap_or(&[])
    }

    pub fn position(&self) -> LogPosition {
        LogPosition {
            block_number: self.block_number,
            log_index: self.log_index,
        }
    }
}

/// On-chain ordering key: ascending block number, then ascending log index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogPosition {
    pub block_number: u64,
    pub log_index: u64,
}

impl std::fmt::Display for LogPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}
