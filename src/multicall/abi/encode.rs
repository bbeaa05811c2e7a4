use alloy::primitives::U256;

use super::types::{AbiType, AbiValue};
use crate::multicall::error::EncodeError;

/// Encodes `values` as a parameter list (`abi.encode(v1, v2, ...)`).
pub fn encode_params(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
    if types.len() != values.len() {
        return Err(EncodeError::LengthMismatch {
            ty: AbiType::Tuple(types.to_vec()).to_string(),
            expected: types.len(),
            found: values.len(),
        });
    }
    if let Some(ty) = types.iter().find(|ty| !ty.has_valid_width()) {
        return Err(EncodeError::InvalidType(ty.to_string()));
    }
    let mut out = Vec::new();
    encode_tuple(types.iter().zip(values).collect(), &mut out)?;
    Ok(out)
}

/// Encodes a single value as a one element parameter list.
pub fn encode(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, EncodeError> {
    encode_params(std::slice::from_ref(ty), std::slice::from_ref(value))
}

pub(crate) fn word(n: usize) -> [u8; 32] {
    U256::from(n).to_be_bytes::<32>()
}

/// Head/tail encoding of a sequence; offsets are relative to the start of
/// the sequence.
fn encode_tuple(items: Vec<(&AbiType, &AbiValue)>, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let head_len = items
        .iter()
        .try_fold(0usize, |len, (ty, _)| len.checked_add(ty.head_size()?))
        .ok_or_else(|| {
            let types = items.iter().map(|(ty, _)| (*ty).clone()).collect();
            EncodeError::InvalidType(AbiType::Tuple(types).to_string())
        })?;
    let mut head = Vec::new();
    let mut tail = Vec::new();

    for (ty, value) in items {
        if ty.is_dynamic() {
            head.extend_from_slice(&word(head_len + tail.len()));
            encode_value(ty, value, &mut tail)?;
        } else {
            encode_value(ty, value, &mut head)?;
        }
    }

    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Ok(())
}

fn encode_value(ty: &AbiType, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let overflow = || EncodeError::Overflow { ty: ty.to_string() };

    match (ty, value) {
        (AbiType::Address, AbiValue::Address(address)) => {
            out.extend_from_slice(&[0u8; 12]);
            out.extend_from_slice(address.as_slice());
        }
        (AbiType::Bool, AbiValue::Bool(b)) => out.extend_from_slice(&word(*b as usize)),
        (AbiType::Uint(bits), AbiValue::Uint(v)) => {
            if v.bit_len() > *bits {
                return Err(overflow());
            }
            out.extend_from_slice(&v.to_be_bytes::<32>());
        }
        (AbiType::Int(bits), AbiValue::Int(v)) => {
            let raw = v.into_raw();
            if !is_sign_extended(raw, *bits) {
                return Err(overflow());
            }
            out.extend_from_slice(&raw.to_be_bytes::<32>());
        }
        (AbiType::FixedBytes(len), AbiValue::FixedBytes(b)) => {
            if b.len() != *len {
                return Err(EncodeError::LengthMismatch {
                    ty: ty.to_string(),
                    expected: *len,
                    found: b.len(),
                });
            }
            out.extend_from_slice(b);
            out.resize(out.len() + 32 - len, 0);
        }
        (AbiType::Bytes, AbiValue::Bytes(b)) => encode_dynamic_bytes(b, out),
        (AbiType::String, AbiValue::String(s)) => encode_dynamic_bytes(s.as_bytes(), out),
        (AbiType::Array(elem), AbiValue::Array(values)) => {
            out.extend_from_slice(&word(values.len()));
            encode_tuple(values.iter().map(|v| (elem.as_ref(), v)).collect(), out)?;
        }
        (
            AbiType::FixedArray(elem, len),
            AbiValue::FixedArray(values) | AbiValue::Array(values),
        ) => {
            if values.len() != *len {
                return Err(EncodeError::LengthMismatch {
                    ty: ty.to_string(),
                    expected: *len,
                    found: values.len(),
                });
            }
            encode_tuple(values.iter().map(|v| (elem.as_ref(), v)).collect(), out)?;
        }
        (AbiType::Tuple(fields), AbiValue::Tuple(values)) => {
            if values.len() != fields.len() {
                return Err(EncodeError::LengthMismatch {
                    ty: ty.to_string(),
                    expected: fields.len(),
                    found: values.len(),
                });
            }
            encode_tuple(fields.iter().zip(values).collect(), out)?;
        }
        (ty, value) => {
            return Err(EncodeError::TypeMismatch {
                expected: ty.to_string(),
                found: value.kind(),
            })
        }
    }
    Ok(())
}

/// Length word, then the content right padded to a multiple of 32 bytes.
fn encode_dynamic_bytes(data: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&word(data.len()));
    out.extend_from_slice(data);
    out.resize(out.len() + padding(data.len()), 0);
}

pub(crate) fn padding(len: usize) -> usize {
    (32 - len % 32) % 32
}

/// True when the bits above `bits - 1` are copies of the sign bit.
pub(crate) fn is_sign_extended(raw: U256, bits: usize) -> bool {
    match bits {
        0 => raw.is_zero(),
        256.. => true,
        _ => {
            let high = raw >> (bits - 1);
            high.is_zero() || high == U256::MAX >> (bits - 1)
        }
    }
}
