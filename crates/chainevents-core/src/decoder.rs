//! Typed event decoding.
//!
//! A generated binding implements [`ContractEvent`] once per event; the
//! check of topics[0] and of the indexed topic count lives here so every
//! binding rejects mis-shaped logs the same way.

use crate::error::DecodeError;
use crate::log::RawLog;
use crate::signature::event_topic;
use alloy_primitives::B256;
use serde::Serialize;
use std::ops::Deref;

/// Static description plus field decoder for one contract event.
pub trait ContractEvent: Sized + Clone + Send + Sync + 'static {
    /// Event name, e.g. `"Transfer"`
    const NAME: &'static str;
    /// Canonical ABI signature, e.g. `"Transfer(address,address,uint256)"`
    const SIGNATURE: &'static str;
    /// Number of indexed fields (topics after topics[0])
    const INDEXED_ARITY: usize;

    /// topics[0] for this event.
    fn signature_hash() -> B256 {
        event_topic(Self::SIGNATURE)
    }

    /// Build the event from its indexed topics (topics[1..]) and ABI data.
    ///
    /// Called only after the signature and topic count have been checked.
    fn decode_fields(indexed: &[B256], data: &[u8]) -> Result<Self, DecodeError>;
}

/// Anything that can be produced from a single raw log.
///
/// Implemented by [`Decoded<E>`] for single events and by event-set enums
/// that dispatch on topics[0].
pub trait DecodeLog: Sized + Send + 'static {
    fn decode_log(log: &RawLog) -> Result<Self, DecodeError>;
}

/// A decoded event together with the raw log it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoded<E> {
    pub event: E,
    pub raw: RawLog,
}

impl<E> Decoded<E> {
    pub fn into_event(self) -> E {
        self.event
    }
}

impl<E> Deref for Decoded<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.event
    }
}

impl<E: ContractEvent> DecodeLog for Decoded<E> {
    fn decode_log(log: &RawLog) -> Result<Self, DecodeError> {
        let event = decode_event::<E>(log)?;
        Ok(Decoded {
            event,
            raw: log.clone(),
        })
    }
}

/// Decode `log` as event `E`.
pub fn decode_event<E: ContractEvent>(log: &RawLog) -> Result<E, DecodeError> {
    let got = log.signature().ok_or_else(|| DecodeError::MissingSignature {
        event: E::NAME.to_string(),
    })?;
    let expected = E::signature_hash();
    if got != expected {
        return Err(DecodeError::SignatureMismatch {
            event: E::NAME.to_string(),
            expected,
            got,
        });
    }

    let indexed = log.indexed_topics();
    if indexed.len() != E::INDEXED_ARITY {
        return Err(DecodeError::TopicCountMismatch {
            event: E::NAME.to_string(),
            expected: E::INDEXED_ARITY,
            got: indexed.len(),
        });
    }

    E::decode_fields(indexed, &log.data)
}
