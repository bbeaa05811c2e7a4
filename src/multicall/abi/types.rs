use alloy::{
    dyn_abi::DynSolType,
    primitives::{Address, Bytes, I256, U256},
};
use std::fmt;

use crate::multicall::error::EncodeError;

/// Solidity types understood by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Address,
    Bool,
    /// `uintN`, N in bits
    Uint(usize),
    /// `intN`, N in bits
    Int(usize),
    /// `bytesN`, N in bytes
    FixedBytes(usize),
    Bytes,
    String,
    Array(Box<AbiType>),
    FixedArray(Box<AbiType>, usize),
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// True when the encoding size depends on the value, which places the
    /// value in the tail of its enclosing block behind an offset.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(elem, _) => elem.is_dynamic(),
            AbiType::Tuple(fields) => fields.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Number of bytes this type occupies in the head of its enclosing block,
    /// `None` when that does not fit in a `usize`.
    pub fn head_size(&self) -> Option<usize> {
        if self.is_dynamic() {
            return Some(32);
        }
        match self {
            AbiType::FixedArray(elem, len) => elem.head_size()?.checked_mul(*len),
            AbiType::Tuple(fields) => fields
                .iter()
                .try_fold(0usize, |size, field| size.checked_add(field.head_size()?)),
            _ => Some(32),
        }
    }

    /// `uintN`/`intN` need N in 8..=256 in steps of 8 and `bytesN` needs N in
    /// 1..=32, at every nesting level.
    pub fn has_valid_width(&self) -> bool {
        match self {
            AbiType::Uint(bits) | AbiType::Int(bits) => (8..=256).contains(bits) && bits % 8 == 0,
            AbiType::FixedBytes(len) => (1..=32).contains(len),
            AbiType::Array(elem) | AbiType::FixedArray(elem, _) => elem.has_valid_width(),
            AbiType::Tuple(fields) => fields.iter().all(AbiType::has_valid_width),
            _ => true,
        }
    }

    /// Parses a Solidity type string such as `uint256`, `bytes32[]` or
    /// `(address,bytes)[]`.
    pub fn parse(s: &str) -> Result<Self, EncodeError> {
        DynSolType::parse(s.trim())
            .map_err(|_| EncodeError::InvalidType(s.to_string()))?
            .try_into()
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::FixedBytes(len) => write!(f, "bytes{len}"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::Array(elem) => write!(f, "{elem}[]"),
            AbiType::FixedArray(elem, len) => write!(f, "{elem}[{len}]"),
            AbiType::Tuple(fields) => {
                f.write_str("(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A decoded (or to be encoded) ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Bool(bool),
    Uint(U256),
    Int(I256),
    FixedBytes(Bytes),
    Bytes(Bytes),
    String(String),
    Array(Vec<AbiValue>),
    FixedArray(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Address(_) => "address",
            AbiValue::Bool(_) => "bool",
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::FixedArray(_) => "fixed array",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(address) => Some(*address),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Components of a tuple, array or fixed array.
    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(values) | AbiValue::FixedArray(values) | AbiValue::Tuple(values) => {
                Some(values)
            }
            _ => None,
        }
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        AbiValue::Address(value)
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        AbiValue::Uint(value)
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        AbiValue::Uint(U256::from(value))
    }
}

impl From<I256> for AbiValue {
    fn from(value: I256) -> Self {
        AbiValue::Int(value)
    }
}

impl From<Bytes> for AbiValue {
    fn from(value: Bytes) -> Self {
        AbiValue::Bytes(value)
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        AbiValue::String(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_string())
    }
}

impl TryFrom<DynSolType> for AbiType {
    type Error = EncodeError;

    fn try_from(ty: DynSolType) -> Result<Self, Self::Error> {
        let converted = match ty {
            DynSolType::Address => AbiType::Address,
            DynSolType::Bool => AbiType::Bool,
            DynSolType::Uint(bits) => AbiType::Uint(bits),
            DynSolType::Int(bits) => AbiType::Int(bits),
            DynSolType::FixedBytes(len) => AbiType::FixedBytes(len),
            DynSolType::Bytes => AbiType::Bytes,
            DynSolType::String => AbiType::String,
            DynSolType::Array(elem) => AbiType::Array(Box::new(AbiType::try_from(*elem)?)),
            DynSolType::FixedArray(elem, len) => {
                AbiType::FixedArray(Box::new(AbiType::try_from(*elem)?), len)
            }
            DynSolType::Tuple(fields) => AbiType::Tuple(
                fields
                    .into_iter()
                    .map(AbiType::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            // `function` and EIP-712 structs have no codec here
            other => return Err(EncodeError::InvalidType(other.sol_type_name().into_owned())),
        };

        if !converted.has_valid_width() || converted.head_size().is_none() {
            return Err(EncodeError::InvalidType(converted.to_string()));
        }
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_elementary_types() {
        assert_eq!(AbiType::parse("address").unwrap(), AbiType::Address);
        assert_eq!(AbiType::parse("uint").unwrap(), AbiType::Uint(256));
        assert_eq!(AbiType::parse("uint24").unwrap(), AbiType::Uint(24));
        assert_eq!(AbiType::parse("int16").unwrap(), AbiType::Int(16));
        assert_eq!(AbiType::parse("bytes32").unwrap(), AbiType::FixedBytes(32));
        assert_eq!(AbiType::parse(" bytes ").unwrap(), AbiType::Bytes);

        assert!(AbiType::parse("uint7").is_err());
        assert!(AbiType::parse("uint264").is_err());
        assert!(AbiType::parse("bytes33").is_err());
        assert!(AbiType::parse("float").is_err());
    }

    #[test]
    fn parse_nested_types() {
        let calls = AbiType::parse("(address,bytes)[]").unwrap();
        assert_eq!(
            calls,
            AbiType::Array(Box::new(AbiType::Tuple(vec![
                AbiType::Address,
                AbiType::Bytes
            ])))
        );
        assert_eq!(calls.to_string(), "(address,bytes)[]");

        let matrix = AbiType::parse("uint8[2][]").unwrap();
        assert_eq!(
            matrix,
            AbiType::Array(Box::new(AbiType::FixedArray(
                Box::new(AbiType::Uint(8)),
                2
            )))
        );

        let nested = AbiType::parse("(uint256,(bool,string)[3])").unwrap();
        assert_eq!(nested.to_string(), "(uint256,(bool,string)[3])");
        assert_eq!(AbiType::parse("()").unwrap(), AbiType::Tuple(vec![]));
    }

    #[test]
    fn parse_rejects_malformed_strings() {
        assert!(AbiType::parse("address owner").is_err());
        assert!(AbiType::parse("(address,bytes").is_err());
        assert!(AbiType::parse("function").is_err());
    }

    #[test]
    fn parse_rejects_unrepresentable_sizes() {
        assert!(AbiType::parse("uint256[1000000000000000000]").is_err());
        assert!(AbiType::parse("(uint256[4294967296],uint256[4294967296])[4294967296]").is_err());
    }

    #[test]
    fn dynamic_classification() {
        let static_tuple = AbiType::parse("(uint256,bool,address)").unwrap();
        assert!(!static_tuple.is_dynamic());
        assert_eq!(static_tuple.head_size(), Some(96));

        let static_array = AbiType::parse("uint256[4]").unwrap();
        assert!(!static_array.is_dynamic());
        assert_eq!(static_array.head_size(), Some(128));

        assert!(AbiType::parse("(uint256,bytes)").unwrap().is_dynamic());
        assert!(AbiType::parse("string[2]").unwrap().is_dynamic());
        assert_eq!(AbiType::parse("uint256[]").unwrap().head_size(), Some(32));
    }

    #[test]
    fn head_size_overflow_is_none() {
        let huge = AbiType::FixedArray(Box::new(AbiType::Uint(256)), usize::MAX);
        assert_eq!(huge.head_size(), None);
        assert_eq!(AbiType::Tuple(vec![huge.clone(), AbiType::Bool]).head_size(), None);
        // behind an offset the inner size no longer matters
        assert_eq!(AbiType::Tuple(vec![huge, AbiType::Bytes]).head_size(), Some(32));
    }

    #[test]
    fn width_validation() {
        assert!(AbiType::Uint(8).has_valid_width());
        assert!(AbiType::FixedBytes(1).has_valid_width());
        assert!(!AbiType::Uint(0).has_valid_width());
        assert!(!AbiType::Int(0).has_valid_width());
        assert!(!AbiType::Int(12).has_valid_width());
        assert!(!AbiType::FixedBytes(0).has_valid_width());
        assert!(!AbiType::FixedBytes(33).has_valid_width());
        let nested = AbiType::Array(Box::new(AbiType::Tuple(vec![AbiType::Uint(264)])));
        assert!(!nested.has_valid_width());
    }

    #[test]
    fn conversion_from_dyn_sol_type() {
        let ty = DynSolType::Array(Box::new(DynSolType::Tuple(vec![
            DynSolType::Bool,
            DynSolType::Bytes,
        ])));
        assert_eq!(AbiType::try_from(ty).unwrap().to_string(), "(bool,bytes)[]");
        assert!(AbiType::try_from(DynSolType::Function).is_err());
        assert!(AbiType::try_from(DynSolType::FixedBytes(33)).is_err());
    }
}
