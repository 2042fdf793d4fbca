//! Error types for the ChainEvents log pipeline.

use alloy_primitives::{Address, B256};
use thiserror::Error;

/// Errors that can occur while decoding a single raw log into a typed event.
///
/// Decoding is deterministic, so the same log always produces the same
/// variant. `PartialEq` lets callers (and tests) compare failure classes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{event}: log carries no topics, cannot read the event signature")]
    MissingSignature { event: String },

    #[error("{event}: signature mismatch, expected {expected}, got {got}")]
    SignatureMismatch {
        event: String,
        expected: B256,
        got: B256,
    },

    #[error("{event}: expected {expected} indexed topics, got {got}")]
    TopicCountMismatch {
        event: String,
        expected: usize,
        got: usize,
    },

    #[error("{event}: invalid payload: {reason}")]
    InvalidPayload { event: String, reason: String },

    #[error("No event in this set has signature {signature}")]
    UnknownEvent { signature: B256 },

    #[error("No binding registered for contract {address}")]
    UnknownContract { address: Address },
}

impl DecodeError {
    pub fn invalid_payload(event: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            event: event.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building a `FilterCriteria`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("{event} declares {expected} indexed fields, got {got} topic sets")]
    ArityMismatch {
        event: String,
        expected: usize,
        got: usize,
    },

    #[error("{event} selects a single event and needs exactly one signature, got {got}")]
    SignatureCount { event: String, got: usize },

    #[error("Invalid block range: from {from} is after to {to}")]
    InvalidRange { from: u64, to: u64 },

    #[error("Criteria for {event} use a {actual} range where a {expected} range is required")]
    RangeMode {
        event: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Faults reported by a `LogSource` (the RPC collaborator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Log source closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

/// Returned by an `EventSink` whose consumer has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Event sink closed")]
pub struct SinkClosed;

/// The error taxonomy surfaced to callers of `query`, `watch` and the
/// subscription completion signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("Historical log query failed: {0}")]
    Query(#[source] SourceError),

    #[error("Log subscription failed: {0}")]
    Subscribe(#[source] SourceError),

    #[error("Live log feed failed: {0}")]
    Feed(#[source] SourceError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error("Subscription task aborted: {0}")]
    Aborted(String),
}

impl EventError {
    /// Returns `true` if the failure came from the RPC collaborator rather
    /// than from the shape of a log; such failures may succeed on re-issue.
    pub fn is_source_fault(&self) -> bool {
        matches!(self, Self::Query(_) | Self::Subscribe(_) | Self::Feed(_))
    }
}
