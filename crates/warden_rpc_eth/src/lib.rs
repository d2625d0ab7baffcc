#![warn(missing_docs)]

//! Ethereum-specific JSON-RPC types and the typed client for the untrusted
//! upstream node.

/// Block types returned by `eth_getBlockBy*`.
pub mod block;
/// Transaction objects for `eth_call` and `eth_estimateGas`.
pub mod call_request;
/// The typed upstream client.
pub mod client;
/// Transaction receipt types returned by `eth_getTransactionReceipt`.
pub mod receipt;
/// The JSON-RPC methods sent to the upstream.
pub mod request_methods;

pub use alloy_rpc_types_eth::{
    AccessList, AccessListItem, AccessListResult, EIP1186AccountProofResponse, EIP1186StorageProof,
    Log, Transaction,
};

pub use self::{
    block::Block, call_request::CallRequest, client::EthRpcClient, receipt::TransactionReceipt,
    request_methods::RequestMethod,
};
