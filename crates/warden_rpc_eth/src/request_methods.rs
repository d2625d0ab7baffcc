use alloy_primitives::{Address, Bytes, B256};
use warden_eth::{block_spec::BlockSpec, filter::LogFilterOptions};
use warden_rpc_client::RpcMethod;

use crate::call_request::CallRequest;

/// The JSON-RPC methods the proxy invokes on the untrusted upstream node.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "method", content = "params")]
pub enum RequestMethod {
    /// eth_blockNumber
    #[serde(rename = "eth_blockNumber", with = "warden_eth::serde::empty_params")]
    BlockNumber(()),
    /// eth_chainId
    #[serde(rename = "eth_chainId", with = "warden_eth::serde::empty_params")]
    ChainId(()),
    /// eth_createAccessList
    #[serde(rename = "eth_createAccessList")]
    CreateAccessList(CallRequest, BlockSpec),
    /// eth_getBlockByHash
    #[serde(rename = "eth_getBlockByHash")]
    GetBlockByHash(B256, bool),
    /// eth_getBlockByNumber
    #[serde(rename = "eth_getBlockByNumber")]
    GetBlockByNumber(BlockSpec, bool),
    /// eth_getBlockReceipts
    #[serde(rename = "eth_getBlockReceipts", with = "warden_eth::serde::sequence")]
    GetBlockReceipts(BlockSpec),
    /// eth_getCode
    #[serde(rename = "eth_getCode")]
    GetCode(Address, BlockSpec),
    /// eth_getLogs
    #[serde(rename = "eth_getLogs", with = "warden_eth::serde::sequence")]
    GetLogs(LogFilterOptions),
    /// eth_getProof
    #[serde(rename = "eth_getProof")]
    GetProof(Address, Vec<B256>, BlockSpec),
    /// eth_getTransactionReceipt
    #[serde(
        rename = "eth_getTransactionReceipt",
        with = "warden_eth::serde::sequence"
    )]
    GetTransactionReceipt(B256),
    /// net_version
    #[serde(rename = "net_version", with = "warden_eth::serde::empty_params")]
    NetVersion(()),
    /// eth_sendRawTransaction
    #[serde(
        rename = "eth_sendRawTransaction",
        with = "warden_eth::serde::sequence"
    )]
    SendRawTransaction(Bytes),
}

impl RpcMethod for RequestMethod {
    fn name(&self) -> &str {
        match self {
            RequestMethod::BlockNumber(()) => "eth_blockNumber",
            RequestMethod::ChainId(()) => "eth_chainId",
            RequestMethod::CreateAccessList(..) => "eth_createAccessList",
            RequestMethod::GetBlockByHash(..) => "eth_getBlockByHash",
            RequestMethod::GetBlockByNumber(..) => "eth_getBlockByNumber",
            RequestMethod::GetBlockReceipts(..) => "eth_getBlockReceipts",
            RequestMethod::GetCode(..) => "eth_getCode",
            RequestMethod::GetLogs(..) => "eth_getLogs",
            RequestMethod::GetProof(..) => "eth_getProof",
            RequestMethod::GetTransactionReceipt(..) => "eth_getTransactionReceipt",
            RequestMethod::NetVersion(()) => "net_version",
            RequestMethod::SendRawTransaction(..) => "eth_sendRawTransaction",
        }
    }
}
