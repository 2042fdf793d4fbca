//! `EventLayout`: the ABI shape of one event (parameter names, types and
//! which of them are indexed) and the decode of a log against it.

use crate::fields::FieldReader;
use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::B256;
use chainevents_core::DecodeError;
use tracing::trace;

/// One event parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub ty: DynSolType,
    pub indexed: bool,
}

/// Parameter list of an event, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLayout {
    event: &'static str,
    params: Vec<Param>,
}

impl EventLayout {
    pub fn new(event: &'static str) -> Self {
        Self {
            event,
            params: Vec::new(),
        }
    }

    /// Append an indexed parameter (stored in a topic).
    pub fn indexed(mut self, name: &'static str, ty: DynSolType) -> Self {
        self.params.push(Param {
            name,
            ty,
            indexed: true,
        });
        self
    }

    /// Append a non-indexed parameter (stored in the data payload).
    pub fn data(mut self, name: &'static str, ty: DynSolType) -> Self {
        self.params.push(Param {
            name,
            ty,
            indexed: false,
        });
        self
    }

    pub fn event(&self) -> &'static str {
        self.event
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn indexed_arity(&self) -> usize {
        self.params.iter().filter(|p| p.indexed).count()
    }

    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub fn signature(&self) -> String {
        let types: Vec<_> = self.params.iter().map(|p| p.ty.sol_type_name()).collect();
        format!("{}({})", self.event, types.join(","))
    }

    /// Decode indexed topics (topics[1..]) and the data payload.
    pub fn decode(&self, topics: &[B256], data: &[u8]) -> Result<FieldReader, DecodeError> {
        let arity = self.indexed_arity();
        if topics.len() != arity {
            return Err(DecodeError::TopicCountMismatch {
                event: self.event.to_string(),
                expected: arity,
                got: topics.len(),
            });
        }

        let mut indexed = topics.iter();
        let mut topic_values = Vec::with_capacity(arity);
        for param in self.params.iter().filter(|p| p.indexed) {
            // Length checked above.
            let Some(topic) = indexed.next() else { break };
            topic_values.push(self.decode_topic(param, topic)?);
        }

        let data_types: Vec<DynSolType> = self
            .params
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.ty.clone())
            .collect();
        let data_values = if data_types.is_empty() {
            Vec::new()
        } else {
            match DynSolType::Tuple(data_types).abi_decode_params(data) {
                Ok(DynSolValue::Tuple(values)) => values,
                Ok(other) => vec![other],
                Err(e) => {
                    return Err(DecodeError::invalid_payload(
                        self.event,
                        format!("data: {e}"),
                    ))
                }
            }
        };

        let mut topic_values = topic_values.into_iter();
        let mut data_values = data_values.into_iter();
        let mut fields = Vec::with_capacity(self.params.len());
        for param in &self.params {
            let value = if param.indexed {
                topic_values.next()
            } else {
                data_values.next()
            };
            let value = value.ok_or_else(|| {
                DecodeError::invalid_payload(self.event, format!("{}: missing value", param.name))
            })?;
            fields.push((param.name, value));
        }

        trace!(event = self.event, fields = fields.len(), "decoded event fields");
        Ok(FieldReader::new(self.event, fields))
    }

    /// Value types are stored padded in the topic; reference types
    /// (string, bytes, arrays, tuples) only as the keccak256 of their
    /// encoding, so the hash itself is returned.
    fn decode_topic(&self, param: &Param, topic: &B256) -> Result<DynSolValue, DecodeError> {
        match param.ty {
            DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_) => Ok(DynSolValue::FixedBytes(*topic, 32)),
            _ => param.ty.abi_decode(topic.as_slice()).map_err(|e| {
                DecodeError::invalid_payload(self.event, format!("topic {}: {e}", param.name))
            }),
        }
    }
}
