#![warn(missing_docs)]

//! Generic JSON-RPC client used to talk to the untrusted upstream node.

mod client;

/// Types specific to JSON-RPC
pub mod jsonrpc;

pub use client::{RpcClient, RpcClientConfig, RpcClientError, RpcMethod};
