//! JSON-RPC wire types.
//!
//! Quantities go over the wire as 0x-prefixed hex strings
//! (`"blockNumber": "0x1b4"`), so `RpcLog` keeps them as text and
//! [`RawLog`] conversion parses them.

use alloy_primitives::{Address, Bytes, B256};
use chainevents_core::{RawLog, SourceError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A log object exactly as returned by `eth_getLogs` or carried in a
/// `logs` subscription notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    /// `null` for pending logs
    pub block_number: Option<String>,
    pub block_hash: Option<B256>,
    pub transaction_hash: Option<B256>,
    pub transaction_index: Option<String>,
    pub log_index: Option<String>,
    #[serde(default)]
    pub removed: bool,
}

impl From<&RawLog> for RpcLog {
    fn from(log: &RawLog) -> Self {
        Self {
            address: log.address,
            topics: log.topics.clone(),
            data: log.data.clone(),
            block_number: Some(format!("{:#x}", log.block_number)),
            block_hash: Some(log.block_hash),
            transaction_hash: Some(log.transaction_hash),
            transaction_index: Some(format!("{:#x}", log.transaction_index)),
            log_index: Some(format!("{:#x}", log.log_index)),
            removed: log.removed,
        }
    }
}

impl TryFrom<RpcLog> for RawLog {
    type Error = SourceError;

    fn try_from(log: RpcLog) -> Result<Self, Self::Error> {
        let block_number = required_quantity(log.block_number.as_deref(), "blockNumber")?;
        let log_index = required_quantity(log.log_index.as_deref(), "logIndex")?;
        let transaction_index = log
            .transaction_index
            .as_deref()
            .map(parse_hex_u64)
            .transpose()?
            .unwrap_or_default();

        Ok(RawLog {
            address: log.address,
            topics: log.topics,
            data: log.data,
            block_number,
            block_hash: log.block_hash.unwrap_or_default(),
            transaction_hash: log.transaction_hash.unwrap_or_default(),
            transaction_index,
            log_index,
            removed: log.removed,
        })
    }
}

fn required_quantity(value: Option<&str>, field: &str) -> Result<u64, SourceError> {
    match value {
        Some(v) => parse_hex_u64(v),
        None => Err(SourceError::InvalidResponse(format!(
            "log has no {field} (pending logs are not supported)"
        ))),
    }
}

/// Parse a JSON-RPC quantity such as `"0x1b4"`.
pub fn parse_hex_u64(s: &str) -> Result<u64, SourceError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| SourceError::InvalidResponse(format!("quantity {s:?} lacks 0x prefix")))?;
    if digits.is_empty() {
        return Err(SourceError::InvalidResponse(format!("empty quantity {s:?}")));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| SourceError::InvalidResponse(format!("quantity {s:?}: {e}")))
}

/// Convert an `eth_getLogs` result array.
pub fn parse_logs(result: Value) -> Result<Vec<RawLog>, SourceError> {
    let logs: Vec<RpcLog> = serde_json::from_value(result)
        .map_err(|e| SourceError::InvalidResponse(format!("eth_getLogs result: {e}")))?;
    logs.into_iter().map(RawLog::try_from).collect()
}

/// Convert the `result` of a `logs` subscription notification.
pub fn parse_log(result: Value) -> Result<RawLog, SourceError> {
    let log: RpcLog = serde_json::from_value(result)
        .map_err(|e| SourceError::InvalidResponse(format!("log notification: {e}")))?;
    RawLog::try_from(log)
}

pub(crate) fn request(id: u64, method: &str, params: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
    .to_string()
}

/// A text frame received from the node, classified.
#[derive(Debug, PartialEq)]
pub(crate) enum Incoming {
    Response {
        id: u64,
        result: Result<Value, SourceError>,
    },
    Notification {
        subscription: String,
        result: Value,
    },
    Unrecognised(String),
}

pub(crate) fn classify(text: &str) -> Incoming {
    let msg: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => return Incoming::Unrecognised(format!("malformed JSON: {e}")),
    };

    if msg.get("method").and_then(Value::as_str) == Some("eth_subscription") {
        let params = &msg["params"];
        return match params.get("subscription").and_then(Value::as_str) {
            Some(id) => Incoming::Notification {
                subscription: id.to_string(),
                result: params.get("result").cloned().unwrap_or(Value::Null),
            },
            None => Incoming::Unrecognised("notification without subscription id".into()),
        };
    }

    let Some(id) = msg.get("id").and_then(Value::as_u64) else {
        return Incoming::Unrecognised("message without numeric id".into());
    };
    let result = match msg.get("error") {
        Some(err) => Err(SourceError::Rpc {
            code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        }),
        None => Ok(msg.get("result").cloned().unwrap_or(Value::Null)),
    };
    Incoming::Response { id, result }
}
