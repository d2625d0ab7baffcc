use alloy_primitives::{Address, Bytes, B256, U64};
use alloy_rpc_types_eth::{AccessListResult, EIP1186AccountProofResponse, Log, Transaction};
use serde::de::DeserializeOwned;
use warden_eth::{block_spec::BlockSpec, filter::LogFilterOptions};
use warden_rpc_client::{RpcClient, RpcClientConfig, RpcClientError};

use crate::{
    block::Block, call_request::CallRequest, receipt::TransactionReceipt,
    request_methods::RequestMethod,
};

/// A client for executing Ethereum JSON-RPC methods on the untrusted
/// upstream node.
#[derive(Debug)]
pub struct EthRpcClient {
    inner: RpcClient<RequestMethod>,
}

impl EthRpcClient {
    /// Creates a new instance, given a remote node URL.
    pub fn new(url: &str, config: RpcClientConfig) -> Result<Self, RpcClientError> {
        let inner = RpcClient::new(url, config)?;
        Ok(Self { inner })
    }

    /// Calls `eth_blockNumber` and returns the block number.
    pub async fn block_number(&self) -> Result<u64, RpcClientError> {
        self.inner
            .call::<U64>(RequestMethod::BlockNumber(()))
            .await
            .map(|block_number| block_number.to())
    }

    /// Calls `eth_chainId` and returns the chain ID.
    pub async fn chain_id(&self) -> Result<u64, RpcClientError> {
        self.inner
            .call::<U64>(RequestMethod::ChainId(()))
            .await
            .map(|chain_id| chain_id.to())
    }

    /// Calls `net_version` and returns the network ID.
    pub async fn network_id(&self) -> Result<u64, RpcClientError> {
        // `net_version` returns a decimal string.
        let version: String = self.inner.call(RequestMethod::NetVersion(())).await?;
        match version.parse() {
            Ok(network_id) => Ok(network_id),
            Err(error) => Err(RpcClientError::InvalidResponse {
                error: <serde_json::Error as serde::de::Error>::custom(format!(
                    "invalid network id: {error}"
                )),
                response: version,
                expected_type: "u64",
            }),
        }
    }

    /// Calls `eth_createAccessList` for the given call at the given block.
    pub async fn create_access_list(
        &self,
        request: CallRequest,
        block: BlockSpec,
    ) -> Result<AccessListResult, RpcClientError> {
        self.inner
            .call(RequestMethod::CreateAccessList(request, block))
            .await
    }

    /// Calls `eth_getBlockByHash`, including full transaction data.
    pub async fn block_by_hash_with_transaction_data(
        &self,
        hash: B256,
    ) -> Result<Option<Block<Transaction>>, RpcClientError> {
        self.inner
            .call(RequestMethod::GetBlockByHash(hash, true))
            .await
    }

    /// Calls `eth_getBlockByNumber`, including full transaction data.
    pub async fn block_by_number_with_transaction_data(
        &self,
        number: u64,
    ) -> Result<Option<Block<Transaction>>, RpcClientError> {
        self.inner
            .call(RequestMethod::GetBlockByNumber(BlockSpec::Number(number), true))
            .await
    }

    /// Calls `eth_getBlockReceipts` and returns the receipts of every
    /// transaction of the block.
    pub async fn block_receipts(
        &self,
        number: u64,
    ) -> Result<Option<Vec<TransactionReceipt>>, RpcClientError> {
        self.inner
            .call(RequestMethod::GetBlockReceipts(BlockSpec::Number(number)))
            .await
    }

    /// Calls `eth_getCode`.
    pub async fn code(&self, address: Address, number: u64) -> Result<Bytes, RpcClientError> {
        self.inner
            .call(RequestMethod::GetCode(address, BlockSpec::Number(number)))
            .await
    }

    /// Calls `eth_getLogs`.
    pub async fn logs(&self, filter: LogFilterOptions) -> Result<Vec<Log>, RpcClientError> {
        self.inner.call(RequestMethod::GetLogs(filter)).await
    }

    /// Calls `eth_getProof`.
    pub async fn proof(
        &self,
        address: Address,
        storage_keys: Vec<B256>,
        number: u64,
    ) -> Result<EIP1186AccountProofResponse, RpcClientError> {
        self.inner
            .call(RequestMethod::GetProof(
                address,
                storage_keys,
                BlockSpec::Number(number),
            ))
            .await
    }

    /// Fetches the proof and the code of every listed account at the given
    /// block in a single batch, pairing them up per account.
    pub async fn proofs_and_code(
        &self,
        accounts: &[(Address, Vec<B256>)],
        number: u64,
    ) -> Result<Vec<(EIP1186AccountProofResponse, Bytes)>, RpcClientError> {
        let mut methods = Vec::with_capacity(accounts.len() * 2);
        for (address, storage_keys) in accounts {
            methods.push(RequestMethod::GetProof(
                *address,
                storage_keys.clone(),
                BlockSpec::Number(number),
            ));
            methods.push(RequestMethod::GetCode(*address, BlockSpec::Number(number)));
        }

        let results = self.inner.call_batch(&methods).await?;

        results
            .chunks_exact(2)
            .map(|pair| {
                let proof = from_value::<EIP1186AccountProofResponse>(&pair[0])?;
                let code = from_value::<Bytes>(&pair[1])?;
                Ok((proof, code))
            })
            .collect()
    }

    /// Calls `eth_getTransactionReceipt`.
    pub async fn transaction_receipt(
        &self,
        transaction_hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcClientError> {
        self.inner
            .call(RequestMethod::GetTransactionReceipt(transaction_hash))
            .await
    }

    /// Fetches the receipts of multiple transactions in a single batch.
    pub async fn transaction_receipts(
        &self,
        transaction_hashes: &[B256],
    ) -> Result<Vec<Option<TransactionReceipt>>, RpcClientError> {
        let methods: Vec<_> = transaction_hashes
            .iter()
            .map(|hash| RequestMethod::GetTransactionReceipt(*hash))
            .collect();

        let results = self.inner.call_batch(&methods).await?;
        results
            .iter()
            .map(from_value::<Option<TransactionReceipt>>)
            .collect()
    }

    /// Calls `eth_sendRawTransaction` and returns the hash the upstream
    /// reports. Callers must not trust the returned hash; it is only useful
    /// for diagnostics.
    pub async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, RpcClientError> {
        self.inner
            .call(RequestMethod::SendRawTransaction(raw))
            .await
    }
}

fn from_value<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, RpcClientError> {
    serde_json::from_value(value.clone()).map_err(|error| RpcClientError::InvalidResponse {
        response: value.to_string(),
        expected_type: std::any::type_name::<T>(),
        error,
    })
}
