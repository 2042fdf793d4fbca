//! # chainevents-evm
//!
//! ABI decoding of EVM event logs for ChainEvents bindings.
//!
//! ## Implementation notes
//! - Uses `alloy-core` dyn-abi for the actual ABI decode
//! - Topics[1..] → indexed parameters (each 32 bytes); reference types stay hashed
//! - `data` → non-indexed parameters (ABI-encoded parameter sequence)
//! - [`EventLayout`] describes one event; [`FieldReader`] hands back typed values

pub mod fields;
pub mod layout;

pub use fields::FieldReader;
pub use layout::{EventLayout, Param};
