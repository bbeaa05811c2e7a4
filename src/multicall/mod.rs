pub mod abi;
pub mod aggregate;
pub mod call;
pub mod client;
pub mod error;
pub mod revert;
pub mod selector;
pub mod utils;

#[cfg(test)]
mod test_utils;

use alloy::primitives::Address;
use eyre::Result;
use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info, warn};
use std::collections::BTreeMap;

use crate::config::MulticallConfig;
use abi::AbiValue;
use aggregate::{decode_aggregate_response, AggregateRequest, CallOutcome};
use call::CallBatch;
use client::ChainClient;
use selector::FunctionSignature;

/// Fans a keyed batch of read-only calls into aggregates, dispatches them
/// through a [`ChainClient`] and fans the decoded results back in under the
/// caller's keys.
pub struct Multicall<C> {
    client: C,
    config: MulticallConfig,
}

impl<C: ChainClient> Multicall<C> {
    pub fn new(client: C, config: MulticallConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &MulticallConfig {
        &self.config
    }

    /// Encodes and executes `(key, target, function, args)` requests.
    /// Requests are sent in the order given.
    pub async fn call_all<'a, K, I>(&self, requests: I) -> Result<BTreeMap<K, CallOutcome>>
    where
        K: Ord + Clone,
        I: IntoIterator<Item = (K, Address, &'a FunctionSignature, Vec<AbiValue>)>,
    {
        let mut batch = CallBatch::new();
        for (key, target, signature, args) in requests {
            batch.add(key, target, signature, &args)?;
        }
        self.execute(batch).await
    }

    /// Every key of `batch` is present in the returned map, either decoded
    /// or as a failure marker. Batches over `batch_size` calls go out as
    /// several aggregates, at most `concurrency` of them in flight.
    pub async fn execute<K: Ord + Clone>(
        &self,
        batch: CallBatch<K>,
    ) -> Result<BTreeMap<K, CallOutcome>> {
        if batch.is_empty() {
            debug!("empty batch, nothing to dispatch");
            return Ok(BTreeMap::new());
        }

        let total = batch.len();
        let chunks = batch.into_chunks(self.config.batch_size);
        info!(
            "dispatching {total} calls in {} aggregate(s) to {}",
            chunks.len(),
            self.config.address
        );

        let decoded: Vec<_> = stream::iter(chunks.iter().map(|chunk| self.execute_chunk(chunk)))
            .buffered(self.config.concurrency.max(1))
            .try_collect()
            .await?;

        let mut outcomes = BTreeMap::new();
        for chunk in decoded {
            outcomes.extend(chunk);
        }

        let failed = outcomes.values().filter(|outcome| !outcome.is_success()).count();
        if failed > 0 {
            warn!("{failed} of {total} calls reverted");
        }
        Ok(outcomes)
    }

    async fn execute_chunk<K: Ord + Clone>(
        &self,
        chunk: &CallBatch<K>,
    ) -> Result<BTreeMap<K, CallOutcome>> {
        let request = AggregateRequest::new(self.config.require_success, chunk.calls());
        let raw = self.client.call(self.config.address, request.encode()?).await?;
        debug!("aggregate of {} calls returned {} bytes", chunk.len(), raw.len());
        Ok(decode_aggregate_response(&raw, chunk.output_types(), chunk.keys())?)
    }
}
