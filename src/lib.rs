pub mod config;
pub mod multicall;

pub use crate::config::{MulticallConfig, Settings};
pub use multicall::{
    abi::{AbiType, AbiValue},
    aggregate::{
        build_aggregate_request, decode_aggregate_response, AggregateRequest, CallOutcome,
        CallResult,
    },
    call::{encode_call, CallBatch, EncodedCall},
    client::{ChainClient, RpcClient},
    error::{DecodeError, EncodeError, MulticallError},
    revert::CallFailed,
    selector::{derive_selector, FunctionSignature, Param},
    Multicall,
};
