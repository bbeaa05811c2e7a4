use alloy::primitives::{Address, Bytes};
use eyre::{eyre, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{
    abi::{decode, encode, encode_params, AbiType, AbiValue},
    aggregate::{CallResult, TRY_AGGREGATE},
    client::ChainClient,
    error::EncodeError,
    revert::ERROR_SELECTOR,
};

/// In-memory stand-in for a node with a `tryAggregate` contract deployed at
/// `address`. Every sub-call is answered by `handler`.
pub struct MockAggregator<F> {
    pub address: Address,
    handler: F,
    dispatched: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl<F> MockAggregator<F>
where
    F: Fn(Address, &[u8]) -> CallResult + Send + Sync,
{
    pub fn new(address: Address, handler: F) -> Self {
        Self {
            address,
            handler,
            dispatched: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Number of aggregates received so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Most aggregates that were awaiting a response at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, target: Address, data: &[u8]) -> Result<Bytes> {
        if target != self.address {
            return Err(eyre!("no aggregator deployed at {target}"));
        }
        let (selector, args) = data.split_at(4.min(data.len()));
        if selector != TRY_AGGREGATE.selector().as_slice() {
            return Err(eyre!("unknown selector"));
        }

        let mut inputs = decode(&TRY_AGGREGATE.input_types(), args)?.into_iter();
        let (Some(AbiValue::Bool(require_success)), Some(AbiValue::Array(calls))) =
            (inputs.next(), inputs.next())
        else {
            return Err(eyre!("malformed tryAggregate arguments"));
        };

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let (target, payload) = match call.as_slice() {
                Some([AbiValue::Address(target), AbiValue::Bytes(payload)]) => {
                    (*target, payload.clone())
                }
                _ => return Err(eyre!("malformed call tuple")),
            };
            let result = (self.handler)(target, &payload);
            if require_success && !result.success {
                return Err(eyre!("execution reverted: Multicall3: call failed"));
            }
            results.push(result);
        }

        Ok(encode_call_results(&results)?)
    }
}

impl<F> ChainClient for MockAggregator<F>
where
    F: Fn(Address, &[u8]) -> CallResult + Send + Sync,
{
    async fn call(&self, target: Address, data: Bytes) -> Result<Bytes> {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        // let other dispatches start before this one answers
        tokio::task::yield_now().await;
        let response = self.respond(target, &data);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

/// What an aggregator returns for `results`, the `(bool,bytes)[]` output of
/// `tryAggregate`.
pub fn encode_call_results(results: &[CallResult]) -> Result<Bytes, EncodeError> {
    let entries = results
        .iter()
        .map(|result| {
            AbiValue::Tuple(vec![
                AbiValue::Bool(result.success),
                AbiValue::Bytes(result.return_data.clone()),
            ])
        })
        .collect();
    Ok(encode_params(&TRY_AGGREGATE.output_types(), &[AbiValue::Array(entries)])?.into())
}

pub fn success(value: &AbiValue, ty: &AbiType) -> CallResult {
    CallResult {
        success: true,
        return_data: encode(ty, value).unwrap_or_default().into(),
    }
}

pub fn revert_with(reason: &str) -> CallResult {
    let mut data = ERROR_SELECTOR.to_vec();
    data.extend(encode(&AbiType::String, &reason.into()).unwrap_or_default());
    CallResult {
        success: false,
        return_data: data.into(),
    }
}
