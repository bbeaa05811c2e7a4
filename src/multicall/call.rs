use alloy::primitives::{Address, Bytes};
use std::collections::BTreeSet;

use super::{
    abi::{encode_params, AbiType, AbiValue},
    error::MulticallError,
    selector::FunctionSignature,
};

/// A single call ready to be aggregated: `payload = selector ‖ abi(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    pub target: Address,
    pub payload: Bytes,
}

pub fn encode_call(
    signature: &FunctionSignature,
    target: Address,
    args: &[AbiValue],
) -> Result<EncodedCall, MulticallError> {
    if args.len() != signature.inputs().len() {
        return Err(MulticallError::ArgumentCount {
            function: signature.canonical(),
            expected: signature.inputs().len(),
            found: args.len(),
        });
    }

    let mut payload = signature.selector().to_vec();
    payload.extend(encode_params(&signature.input_types(), args)?);

    Ok(EncodedCall {
        target,
        payload: payload.into(),
    })
}

/// An ordered set of keyed calls. The output types of every call are kept
/// next to it, outside of the wire format, so that the raw return data can be
/// decoded once the aggregate comes back.
///
/// Position in the batch is the only link between a request and its result,
/// so the order here is the order on the wire.
#[derive(Debug, Clone)]
pub struct CallBatch<K> {
    keys: Vec<K>,
    calls: Vec<EncodedCall>,
    outputs: Vec<Vec<AbiType>>,
    seen: BTreeSet<K>,
}

impl<K: Ord + Clone> Default for CallBatch<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone> CallBatch<K> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            calls: Vec::new(),
            outputs: Vec::new(),
            seen: BTreeSet::new(),
        }
    }

    /// Encodes `signature(args)` against `target` and appends it under `key`.
    pub fn add(
        &mut self,
        key: K,
        target: Address,
        signature: &FunctionSignature,
        args: &[AbiValue],
    ) -> Result<&mut Self, MulticallError> {
        let call = encode_call(signature, target, args)?;
        self.push(key, call, signature.output_types())
    }

    /// Appends an already encoded call.
    pub fn push(
        &mut self,
        key: K,
        call: EncodedCall,
        outputs: Vec<AbiType>,
    ) -> Result<&mut Self, MulticallError> {
        if !self.seen.insert(key.clone()) {
            return Err(MulticallError::DuplicateKey);
        }
        self.keys.push(key);
        self.calls.push(call);
        self.outputs.push(outputs);
        Ok(self)
    }

    /// Builds a batch from calls encoded out of order (e.g. on several
    /// tasks), fixing the wire order by key.
    pub fn from_unordered(
        entries: impl IntoIterator<Item = (K, EncodedCall, Vec<AbiType>)>,
    ) -> Result<Self, MulticallError> {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut batch = Self::new();
        for (key, call, outputs) in entries {
            batch.push(key, call, outputs)?;
        }
        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn calls(&self) -> &[EncodedCall] {
        &self.calls
    }

    pub fn output_types(&self) -> &[Vec<AbiType>] {
        &self.outputs
    }

    /// Splits into consecutive batches of at most `size` calls, keeping order.
    pub fn into_chunks(self, size: usize) -> Vec<CallBatch<K>> {
        let size = size.max(1);
        let mut chunks = Vec::with_capacity(self.len().div_ceil(size));
        let mut current = Self::new();

        let entries = self.keys.into_iter().zip(self.calls).zip(self.outputs);
        for ((key, call), outputs) in entries {
            if current.len() == size {
                chunks.push(std::mem::take(&mut current));
            }
            current.seen.insert(key.clone());
            current.keys.push(key);
            current.calls.push(call);
            current.outputs.push(outputs);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}
