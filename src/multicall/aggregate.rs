use alloy::primitives::Bytes;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use super::{
    abi::{decode, encode_params, AbiType, AbiValue},
    call::EncodedCall,
    error::{DecodeError, EncodeError, MulticallError},
    revert::CallFailed,
    selector::{FunctionSignature, Param},
};

/// `tryAggregate(bool requireSuccess, (address target, bytes callData)[] calls)
/// returns ((bool success, bytes returnData)[])`
pub static TRY_AGGREGATE: Lazy<FunctionSignature> = Lazy::new(|| {
    let call = AbiType::Tuple(vec![AbiType::Address, AbiType::Bytes]);
    let result = AbiType::Tuple(vec![AbiType::Bool, AbiType::Bytes]);
    FunctionSignature::new(
        "tryAggregate",
        vec![
            Param::new("requireSuccess", AbiType::Bool),
            Param::new("calls", AbiType::Array(Box::new(call))),
        ],
        vec![Param::new("returnData", AbiType::Array(Box::new(result)))],
    )
});

/// The aggregator's own call. With `require_success` set the aggregator
/// reverts the whole batch as soon as one sub-call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateRequest<'a> {
    pub require_success: bool,
    pub calls: &'a [EncodedCall],
}

impl<'a> AggregateRequest<'a> {
    pub fn new(require_success: bool, calls: &'a [EncodedCall]) -> Self {
        Self {
            require_success,
            calls,
        }
    }

    pub fn encode(&self) -> Result<Bytes, EncodeError> {
        build_aggregate_request(self.require_success, self.calls)
    }
}

/// Raw outcome of one sub-call, positionally aligned with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    pub success: bool,
    pub return_data: Bytes,
}

/// Result of one keyed call after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Success(AbiValue),
    Failed(CallFailed),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    pub fn value(&self) -> Option<&AbiValue> {
        match self {
            CallOutcome::Success(value) => Some(value),
            CallOutcome::Failed(_) => None,
        }
    }

    pub fn into_result(self) -> Result<AbiValue, CallFailed> {
        match self {
            CallOutcome::Success(value) => Ok(value),
            CallOutcome::Failed(failed) => Err(failed),
        }
    }
}

/// Selector of `tryAggregate` followed by `(requireSuccess, calls)`.
pub fn build_aggregate_request(
    require_success: bool,
    calls: &[EncodedCall],
) -> Result<Bytes, EncodeError> {
    let calls = calls
        .iter()
        .map(|call| {
            AbiValue::Tuple(vec![
                AbiValue::Address(call.target),
                AbiValue::Bytes(call.payload.clone()),
            ])
        })
        .collect();

    let mut data = TRY_AGGREGATE.selector().to_vec();
    data.extend(encode_params(
        &TRY_AGGREGATE.input_types(),
        &[AbiValue::Bool(require_success), AbiValue::Array(calls)],
    )?);
    Ok(data.into())
}

/// Decodes the outer `(bool,bytes)[]` of an aggregate response.
pub fn decode_call_results(raw: &[u8]) -> Result<Vec<CallResult>, DecodeError> {
    let malformed = || DecodeError::InvalidValue {
        ty: TRY_AGGREGATE.outputs()[0].ty.to_string(),
    };

    let entries = match decode(&TRY_AGGREGATE.output_types(), raw)?.pop() {
        Some(AbiValue::Array(entries)) => entries,
        _ => return Err(malformed()),
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            AbiValue::Tuple(fields) => match fields.as_slice() {
                [AbiValue::Bool(success), AbiValue::Bytes(return_data)] => Ok(CallResult {
                    success: *success,
                    return_data: return_data.clone(),
                }),
                _ => Err(malformed()),
            },
            _ => Err(malformed()),
        })
        .collect()
}

/// Single-value unwrap: a call declaring exactly one output yields that value
/// bare, any other arity yields a tuple. This is a convenience applied after
/// decoding, the ABI itself always returns a tuple.
pub fn normalize_outputs(mut values: Vec<AbiValue>) -> AbiValue {
    if values.len() == 1 {
        if let Some(value) = values.pop() {
            return value;
        }
    }
    AbiValue::Tuple(values)
}

/// Decodes an aggregate response and keys each result by the request key at
/// the same position. `output_types` and `keys` must be in submission order.
pub fn decode_aggregate_response<K: Ord + Clone>(
    raw: &[u8],
    output_types: &[Vec<AbiType>],
    keys: &[K],
) -> Result<BTreeMap<K, CallOutcome>, MulticallError> {
    if output_types.len() != keys.len() {
        return Err(MulticallError::LengthMismatch {
            expected: keys.len(),
            found: output_types.len(),
        });
    }

    let results = decode_call_results(raw)?;
    if results.len() != keys.len() {
        return Err(MulticallError::LengthMismatch {
            expected: keys.len(),
            found: results.len(),
        });
    }

    let mut outcomes = BTreeMap::new();
    let entries = keys.iter().zip(output_types).zip(results);
    for (index, ((key, types), result)) in entries.enumerate() {
        let outcome = if result.success {
            let values = decode(types, &result.return_data)
                .map_err(|source| MulticallError::ReturnData { index, source })?;
            CallOutcome::Success(normalize_outputs(values))
        } else {
            CallOutcome::Failed(CallFailed::new(result.return_data))
        };
        if outcomes.insert(key.clone(), outcome).is_some() {
            return Err(MulticallError::DuplicateKey);
        }
    }

    Ok(outcomes)
}
