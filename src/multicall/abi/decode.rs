use alloy::primitives::{Address, Bytes, I256, U256};
use std::iter;

use super::{
    encode::{is_sign_extended, padding},
    types::{AbiType, AbiValue},
};
use crate::multicall::error::DecodeError;

/// Decodes a parameter list. Bytes past the encoded parameters are ignored,
/// anything missing is a [`DecodeError`].
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
    if let Some(ty) = types.iter().find(|ty| !ty.has_valid_width()) {
        return Err(DecodeError::InvalidType(ty.to_string()));
    }
    decode_tuple(types.iter(), data)
}

fn decode_tuple<'a>(
    types: impl Iterator<Item = &'a AbiType>,
    block: &[u8],
) -> Result<Vec<AbiValue>, DecodeError> {
    let mut head = 0usize;
    let mut values = Vec::new();

    for ty in types {
        let size = head_size(ty)?;
        let value = if ty.is_dynamic() {
            let offset = read_usize(block, head)?;
            let tail = block.get(offset..).ok_or(DecodeError::OffsetOutOfRange {
                offset,
                len: block.len(),
            })?;
            decode_value(ty, tail)?
        } else {
            let inline = block.get(head..).ok_or(DecodeError::Truncated {
                at: head,
                needed: size,
                len: block.len(),
            })?;
            decode_value(ty, inline)?
        };
        head = head
            .checked_add(size)
            .ok_or_else(|| DecodeError::InvalidType(ty.to_string()))?;
        values.push(value);
    }

    Ok(values)
}

/// `buf` starts at the value: its inline position for static types, the
/// target of its offset for dynamic ones.
fn decode_value(ty: &AbiType, buf: &[u8]) -> Result<AbiValue, DecodeError> {
    let invalid = || DecodeError::InvalidValue { ty: ty.to_string() };

    let value = match ty {
        AbiType::Address => {
            let word = read_word(buf, 0)?;
            if word[..12].iter().any(|b| *b != 0) {
                return Err(invalid());
            }
            AbiValue::Address(Address::from_slice(&word[12..]))
        }
        AbiType::Bool => match U256::from_be_slice(read_word(buf, 0)?) {
            v if v.is_zero() => AbiValue::Bool(false),
            v if v == U256::from(1) => AbiValue::Bool(true),
            _ => return Err(invalid()),
        },
        AbiType::Uint(bits) => {
            let v = U256::from_be_slice(read_word(buf, 0)?);
            if v.bit_len() > *bits {
                return Err(invalid());
            }
            AbiValue::Uint(v)
        }
        AbiType::Int(bits) => {
            let raw = U256::from_be_slice(read_word(buf, 0)?);
            if !is_sign_extended(raw, *bits) {
                return Err(invalid());
            }
            AbiValue::Int(I256::from_raw(raw))
        }
        AbiType::FixedBytes(len) => {
            let word = read_word(buf, 0)?;
            if word[*len..].iter().any(|b| *b != 0) {
                return Err(invalid());
            }
            AbiValue::FixedBytes(Bytes::copy_from_slice(&word[..*len]))
        }
        AbiType::Bytes => AbiValue::Bytes(Bytes::copy_from_slice(read_dynamic_bytes(buf)?)),
        AbiType::String => {
            let data = read_dynamic_bytes(buf)?;
            let s = std::str::from_utf8(data).map_err(|_| DecodeError::InvalidUtf8)?;
            AbiValue::String(s.to_string())
        }
        AbiType::Array(elem) => {
            let len = read_usize(buf, 0)?;
            let content = &buf[32..];
            check_element_count(elem, len, content.len())?;
            AbiValue::Array(decode_tuple(iter::repeat(elem.as_ref()).take(len), content)?)
        }
        AbiType::FixedArray(elem, len) => {
            check_element_count(elem, *len, buf.len())?;
            AbiValue::FixedArray(decode_tuple(iter::repeat(elem.as_ref()).take(*len), buf)?)
        }
        AbiType::Tuple(fields) => AbiValue::Tuple(decode_tuple(fields.iter(), buf)?),
    };

    Ok(value)
}

fn head_size(ty: &AbiType) -> Result<usize, DecodeError> {
    ty.head_size()
        .ok_or_else(|| DecodeError::InvalidType(ty.to_string()))
}

/// Bounds `len` by the bytes left before anything is allocated. Every element
/// takes at least one word, inline or as an offset, zero sized tuples included.
fn check_element_count(elem: &AbiType, len: usize, remaining: usize) -> Result<(), DecodeError> {
    let needed = len.checked_mul(head_size(elem)?.max(32));
    if needed.map_or(true, |needed| needed > remaining) {
        return Err(DecodeError::LengthOutOfRange {
            declared: len,
            remaining,
        });
    }
    Ok(())
}

fn read_word(buf: &[u8], at: usize) -> Result<&[u8], DecodeError> {
    at.checked_add(32)
        .and_then(|end| buf.get(at..end))
        .ok_or(DecodeError::Truncated {
            at,
            needed: 32,
            len: buf.len(),
        })
}

fn read_usize(buf: &[u8], at: usize) -> Result<usize, DecodeError> {
    let v = U256::from_be_slice(read_word(buf, at)?);
    usize::try_from(v).map_err(|_| DecodeError::WordOverflow)
}

/// Reads a length prefixed byte string. The padding up to the next word
/// boundary must be present; the length itself is taken only from the prefix.
fn read_dynamic_bytes(buf: &[u8]) -> Result<&[u8], DecodeError> {
    let len = read_usize(buf, 0)?;
    let remaining = buf.len() - 32;
    let padded = len.checked_add(padding(len));
    if padded.map_or(true, |padded| padded > remaining) {
        return Err(DecodeError::LengthOutOfRange {
            declared: len,
            remaining,
        });
    }
    Ok(&buf[32..32 + len])
}
