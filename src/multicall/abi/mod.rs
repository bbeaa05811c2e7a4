//! Solidity ABI codec for the subset of types used by multicall batches:
//! 32 byte big-endian words, with dynamic values placed in a tail region
//! behind offsets relative to the start of their enclosing block.

pub mod decode;
pub mod encode;
pub mod types;

pub use decode::decode;
pub use encode::{encode, encode_params};
pub use types::{AbiType, AbiValue};
