//! `FieldReader`: typed access to decoded event parameters.
//!
//! Every accessor fails with `DecodeError::InvalidPayload` naming the field
//! when the value is missing or has an unexpected ABI type.

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};
use chainevents_core::DecodeError;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldReader {
    event: &'static str,
    fields: Vec<(&'static str, DynSolValue)>,
}

impl FieldReader {
    pub fn new(event: &'static str, fields: Vec<(&'static str, DynSolValue)>) -> Self {
        Self { event, fields }
    }

    pub fn event(&self) -> &'static str {
        self.event
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn mismatch(&self, name: &str, expected: &str, got: &DynSolValue) -> DecodeError {
        let got = got
            .as_type()
            .map(|ty| ty.sol_type_name().into_owned())
            .unwrap_or_else(|| "unknown".to_string());
        DecodeError::invalid_payload(self.event, format!("{name}: expected {expected}, got {got}"))
    }

    pub fn get(&self, name: &str) -> Result<&DynSolValue, DecodeError> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| DecodeError::invalid_payload(self.event, format!("{name}: no such field")))
    }

    pub fn address(&self, name: &str) -> Result<Address, DecodeError> {
        match self.get(name)? {
            DynSolValue::Address(a) => Ok(*a),
            other => Err(self.mismatch(name, "address", other)),
        }
    }

    pub fn uint(&self, name: &str) -> Result<U256, DecodeError> {
        match self.get(name)? {
            DynSolValue::Uint(u, _) => Ok(*u),
            other => Err(self.mismatch(name, "uint", other)),
        }
    }

    /// A `uint` narrowed to a machine integer (`u8`…`u128`).
    pub fn small<T: TryFrom<U256>>(&self, name: &str) -> Result<T, DecodeError> {
        let value = self.uint(name)?;
        T::try_from(value).map_err(|_| {
            DecodeError::invalid_payload(
                self.event,
                format!("{name}: {value} does not fit in {}", std::any::type_name::<T>()),
            )
        })
    }

    pub fn boolean(&self, name: &str) -> Result<bool, DecodeError> {
        match self.get(name)? {
            DynSolValue::Bool(b) => Ok(*b),
            other => Err(self.mismatch(name, "bool", other)),
        }
    }

    /// A `bytes32` value, or the hash of an indexed reference type.
    pub fn word(&self, name: &str) -> Result<B256, DecodeError> {
        match self.get(name)? {
            DynSolValue::FixedBytes(word, 32) => Ok(*word),
            other => Err(self.mismatch(name, "bytes32", other)),
        }
    }

    pub fn bytes(&self, name: &str) -> Result<Vec<u8>, DecodeError> {
        match self.get(name)? {
            DynSolValue::Bytes(b) => Ok(b.clone()),
            other => Err(self.mismatch(name, "bytes", other)),
        }
    }

    pub fn string(&self, name: &str) -> Result<String, DecodeError> {
        match self.get(name)? {
            DynSolValue::String(s) => Ok(s.clone()),
            other => Err(self.mismatch(name, "string", other)),
        }
    }

    fn element(&self, name: &str, item: &DynSolValue) -> Result<U256, DecodeError> {
        match item {
            DynSolValue::Uint(u, _) => Ok(*u),
            other => Err(self.mismatch(name, "uint256 element", other)),
        }
    }

    fn fixed_uints<const N: usize>(
        &self,
        name: &str,
        value: &DynSolValue,
    ) -> Result<[U256; N], DecodeError> {
        let items = match value {
            DynSolValue::FixedArray(items) if items.len() == N => items,
            other => return Err(self.mismatch(name, &format!("uint256[{N}]"), other)),
        };
        let mut out = [U256::ZERO; N];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = self.element(name, item)?;
        }
        Ok(out)
    }

    /// A fixed `uint256[N]` array.
    pub fn uint_array<const N: usize>(&self, name: &str) -> Result<[U256; N], DecodeError> {
        self.fixed_uints(name, self.get(name)?)
    }

    /// A dynamic `uint256[]` array.
    pub fn uint_vec(&self, name: &str) -> Result<Vec<U256>, DecodeError> {
        match self.get(name)? {
            DynSolValue::Array(items) => items.iter().map(|i| self.element(name, i)).collect(),
            other => Err(self.mismatch(name, "uint256[]", other)),
        }
    }

    /// A dynamic array of fixed arrays, e.g. `uint256[2][]`.
    pub fn uint_array_vec<const N: usize>(
        &self,
        name: &str,
    ) -> Result<Vec<[U256; N]>, DecodeError> {
        match self.get(name)? {
            DynSolValue::Array(items) => items
                .iter()
                .map(|i| self.fixed_uints::<N>(name, i))
                .collect(),
            other => Err(self.mismatch(name, &format!("uint256[{N}][]"), other)),
        }
    }

    /// A tuple field, with its components given positional `names`.
    pub fn tuple(&self, name: &str, names: &[&'static str]) -> Result<FieldReader, DecodeError> {
        let items = match self.get(name)? {
            DynSolValue::Tuple(items) if items.len() == names.len() => items,
            other => {
                return Err(self.mismatch(name, &format!("{}-tuple", names.len()), other))
            }
        };
        Ok(FieldReader::new(
            self.event,
            names.iter().copied().zip(items.iter().cloned()).collect(),
        ))
    }
}
