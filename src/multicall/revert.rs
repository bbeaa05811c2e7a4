use alloy::{
    hex,
    primitives::{Bytes, Selector, U256},
};
use std::fmt;

use super::abi::{decode, AbiType, AbiValue};

/// `Error(string)`
pub const ERROR_SELECTOR: Selector = Selector::new(hex!("08c379a0"));
/// `Panic(uint256)`
pub const PANIC_SELECTOR: Selector = Selector::new(hex!("4e487b71"));

/// Marker for a sub-call that reverted inside a tolerant aggregate. Carries
/// whatever the target returned, often empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFailed {
    pub return_data: Bytes,
}

impl fmt::Display for CallFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call reverted: {}", self.revert())
    }
}

impl std::error::Error for CallFailed {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revert {
    Empty,
    /// `Error(string)`, emitted by `require` and `revert("...")`
    Error(String),
    /// `Panic(uint256)`, emitted on assertion failures and arithmetic errors
    Panic(U256),
    /// Custom error or anything else that could not be decoded
    Custom(Bytes),
}

impl fmt::Display for Revert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revert::Empty => f.write_str("no data"),
            Revert::Error(reason) => f.write_str(reason),
            Revert::Panic(code) => write!(f, "panic code {code:#x}"),
            Revert::Custom(data) => write!(f, "custom error {data}"),
        }
    }
}

impl CallFailed {
    pub fn new(return_data: Bytes) -> Self {
        Self { return_data }
    }

    pub fn revert(&self) -> Revert {
        let data = &self.return_data;
        if data.is_empty() {
            return Revert::Empty;
        }
        if data.len() >= 4 {
            let (selector, args) = data.split_at(4);
            if selector == ERROR_SELECTOR.as_slice() {
                if let Ok(values) = decode(&[AbiType::String], args) {
                    if let Some(AbiValue::String(reason)) = values.into_iter().next() {
                        return Revert::Error(reason);
                    }
                }
            } else if selector == PANIC_SELECTOR.as_slice() {
                if let Ok(values) = decode(&[AbiType::Uint(256)], args) {
                    if let Some(AbiValue::Uint(code)) = values.into_iter().next() {
                        return Revert::Panic(code);
                    }
                }
            }
        }
        Revert::Custom(data.clone())
    }

    /// The `Error(string)` message, if that is what the call reverted with.
    pub fn revert_reason(&self) -> Option<String> {
        match self.revert() {
            Revert::Error(reason) => Some(reason),
            _ => None,
        }
    }
}
