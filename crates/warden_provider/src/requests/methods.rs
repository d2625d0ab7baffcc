use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use warden_eth::{block_spec::BlockSpec, filter::LogFilterOptions};
use warden_rpc_eth::CallRequest;

mod optional_block_spec {
    use super::BlockSpec;

    pub fn latest() -> Option<BlockSpec> {
        Some(BlockSpec::latest())
    }
}

/// For invoking a JSON-RPC method on the verifying provider.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum MethodInvocation {
    /// # `eth_blockNumber`
    ///
    /// Returns the number of the latest trusted block.
    #[serde(rename = "eth_blockNumber", with = "warden_eth::serde::empty_params")]
    BlockNumber(()),
    /// # `eth_call`
    ///
    /// Executes a message call against state proven at the given block, and
    /// returns the raw return data.
    #[serde(rename = "eth_call")]
    Call(
        /// `Object` - The transaction call object.
        CallRequest,
        /// `BlockSpec` - Block number or tag. Defaults to `"latest"`.
        #[serde(
            skip_serializing_if = "Option::is_none",
            default = "optional_block_spec::latest"
        )]
        Option<BlockSpec>,
    ),
    /// # `eth_chainId`
    ///
    /// Returns the chain ID of the proxied network.
    #[serde(rename = "eth_chainId", with = "warden_eth::serde::empty_params")]
    ChainId(()),
    /// # `eth_estimateGas`
    ///
    /// Estimates the gas required by a transaction, executed against proven
    /// state.
    #[serde(rename = "eth_estimateGas")]
    EstimateGas(
        /// `Object` - The transaction call object.
        CallRequest,
        /// `BlockSpec` - Block number or tag. Defaults to `"latest"`.
        #[serde(
            skip_serializing_if = "Option::is_none",
            default = "optional_block_spec::latest"
        )]
        Option<BlockSpec>,
    ),
    /// # `eth_getBalance`
    ///
    /// Returns the proven balance of the account at the provided address.
    #[serde(rename = "eth_getBalance")]
    GetBalance(
        /// `DATA, 20 bytes` - Address to check the balance of.
        Address,
        /// `BlockSpec` - Block number or tag. Defaults to `"latest"`.
        #[serde(
            skip_serializing_if = "Option::is_none",
            default = "optional_block_spec::latest"
        )]
        Option<BlockSpec>,
    ),
    /// # `eth_getBlockByHash`
    ///
    /// Returns the block with the provided hash, after verifying that it
    /// hashes to it.
    #[serde(rename = "eth_getBlockByHash")]
    GetBlockByHash(
        /// `DATA, 32 bytes` - Hash of a block.
        B256,
        /// `Boolean` - If `true`, returns full transaction objects.
        bool,
    ),
    /// # `eth_getBlockByNumber`
    ///
    /// Returns the verified block at the provided number or tag.
    #[serde(rename = "eth_getBlockByNumber")]
    GetBlockByNumber(
        /// `BlockSpec` - Block number or tag.
        BlockSpec,
        /// `Boolean` - If `true`, returns full transaction objects.
        bool,
    ),
    /// # `eth_getCode`
    ///
    /// Returns the bytecode at the provided address, verified against the
    /// proven account's code hash.
    #[serde(rename = "eth_getCode")]
    GetCode(
        /// `DATA, 20 bytes` - Address to retrieve the code from.
        Address,
        /// `BlockSpec` - Block number or tag. Defaults to `"latest"`.
        #[serde(
            skip_serializing_if = "Option::is_none",
            default = "optional_block_spec::latest"
        )]
        Option<BlockSpec>,
    ),
    /// # `eth_getLogs`
    ///
    /// Returns the logs matching the provided filter, verified against block
    /// headers, transaction sets and receipt tries.
    #[serde(rename = "eth_getLogs", with = "warden_eth::serde::sequence")]
    GetLogs(
        /// `Object` - The filter options.
        LogFilterOptions,
    ),
    /// # `eth_getTransactionCount`
    ///
    /// Returns the proven nonce of the account at the provided address.
    #[serde(rename = "eth_getTransactionCount")]
    GetTransactionCount(
        /// `DATA, 20 bytes` - Address to check.
        Address,
        /// `BlockSpec` - Block number or tag. Defaults to `"latest"`.
        #[serde(
            skip_serializing_if = "Option::is_none",
            default = "optional_block_spec::latest"
        )]
        Option<BlockSpec>,
    ),
    /// # `eth_getTransactionReceipt`
    ///
    /// Returns the receipt of the transaction, with verified block and
    /// transaction membership. Gas, price and log fields are unverified and
    /// returned as zeroed placeholders.
    #[serde(
        rename = "eth_getTransactionReceipt",
        with = "warden_eth::serde::sequence"
    )]
    GetTransactionReceipt(
        /// `DATA, 32 bytes` - The transaction hash.
        B256,
    ),
    /// # `net_version`
    ///
    /// Returns the network ID as a decimal string.
    #[serde(rename = "net_version", with = "warden_eth::serde::empty_params")]
    NetVersion(()),
    /// # `eth_sendRawTransaction`
    ///
    /// Forwards the raw transaction to the upstream opaquely and returns the
    /// locally recomputed transaction hash, so tampering with the upstream's
    /// answer is detectable.
    #[serde(
        rename = "eth_sendRawTransaction",
        with = "warden_eth::serde::sequence"
    )]
    SendRawTransaction(
        /// `DATA` - The signed, RLP-encoded transaction data.
        Bytes,
    ),
}

impl MethodInvocation {
    /// The method's name.
    pub fn name(&self) -> &'static str {
        match self {
            MethodInvocation::BlockNumber(()) => "eth_blockNumber",
            MethodInvocation::Call(..) => "eth_call",
            MethodInvocation::ChainId(()) => "eth_chainId",
            MethodInvocation::EstimateGas(..) => "eth_estimateGas",
            MethodInvocation::GetBalance(..) => "eth_getBalance",
            MethodInvocation::GetBlockByHash(..) => "eth_getBlockByHash",
            MethodInvocation::GetBlockByNumber(..) => "eth_getBlockByNumber",
            MethodInvocation::GetCode(..) => "eth_getCode",
            MethodInvocation::GetLogs(..) => "eth_getLogs",
            MethodInvocation::GetTransactionCount(..) => "eth_getTransactionCount",
            MethodInvocation::GetTransactionReceipt(..) => "eth_getTransactionReceipt",
            MethodInvocation::NetVersion(()) => "net_version",
            MethodInvocation::SendRawTransaction(..) => "eth_sendRawTransaction",
        }
    }
}
