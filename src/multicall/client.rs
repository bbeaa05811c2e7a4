use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    transports::http::reqwest::Url,
};
use eyre::Result;
use log::debug;
use std::future::Future;

/// The only way the multicall pipeline talks to a node: a read-only
/// `eth_call` of `data` against `target`. Retries and timeouts belong to the
/// implementation.
pub trait ChainClient {
    fn call(&self, target: Address, data: Bytes) -> impl Future<Output = Result<Bytes>> + Send;
}

/// [`ChainClient`] backed by any alloy provider.
#[derive(Debug, Clone)]
pub struct RpcClient<P> {
    provider: P,
}

impl<P: Provider> RpcClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl RpcClient<DynProvider> {
    /// HTTP provider for `rpc_url`.
    pub fn connect(rpc_url: &str) -> Result<Self> {
        let url: Url = rpc_url.parse()?;
        let provider = ProviderBuilder::new().connect_http(url);
        Ok(Self::new(DynProvider::new(provider)))
    }
}

impl<P: Provider> ChainClient for RpcClient<P> {
    async fn call(&self, target: Address, data: Bytes) -> Result<Bytes> {
        debug!("eth_call to {target} with {} bytes of calldata", data.len());
        let tx = TransactionRequest::default().with_to(target).with_input(data);
        let output = self.provider.call(tx).await?;
        Ok(output)
    }
}
