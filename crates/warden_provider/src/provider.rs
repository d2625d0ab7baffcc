use std::sync::Arc;

use alloy_consensus::TxEnvelope;
use alloy_eips::eip2718::{Decodable2718, Encodable2718};
use alloy_primitives::{keccak256, Bloom, Bytes, B256, U64};
use serde::Serialize;
use tokio::runtime;
use warden_eth::{
    block_spec::{BlockSpec, BlockTag},
    filter::LogFilterOptions,
};
use warden_rpc_eth::{EthRpcClient, TransactionReceipt};

use crate::{
    call,
    chain::{ChainVerifier, VerifiedBlock},
    config::ProviderConfig,
    error::{CreationError, ProviderError},
    head::TrustedHeadStore,
    logs::{self, LogVerificationError},
    requests::MethodInvocation,
    state,
};

/// The verifying JSON-RPC provider.
///
/// Every response is either taken from data verified against the trusted
/// block hashes, or (for the explicitly opaque operations) marked as such on
/// the individual handler.
#[derive(Clone, Debug)]
pub struct Provider {
    data: Arc<ProviderData>,
}

/// Shared state of a [`Provider`].
#[derive(Debug)]
pub struct ProviderData {
    pub(crate) config: ProviderConfig,
    pub(crate) client: Arc<EthRpcClient>,
    pub(crate) store: Arc<TrustedHeadStore>,
    pub(crate) runtime: runtime::Handle,
}

impl ProviderData {
    pub(crate) fn chain(&self) -> ChainVerifier {
        ChainVerifier::new(self.client.clone(), self.store.clone())
    }
}

impl Provider {
    /// Constructs a provider anchored at the configured trusted block.
    pub fn new(runtime: runtime::Handle, config: ProviderConfig) -> Result<Self, CreationError> {
        let client = Arc::new(EthRpcClient::new(&config.rpc_url, config.rpc.clone())?);
        let store = Arc::new(TrustedHeadStore::new(
            config.trusted_block_number,
            config.trusted_block_hash,
        ));

        Ok(Self {
            data: Arc::new(ProviderData {
                config,
                client,
                store,
                runtime,
            }),
        })
    }

    /// Feeds a freshly trusted block hash into the provider. This is the
    /// entry point of the external head follower.
    pub fn update_trusted_head(&self, hash: B256, number: u64) {
        self.data.store.update(hash, number);
    }

    /// The number of the latest trusted block.
    pub fn latest_block_number(&self) -> u64 {
        self.data.store.latest_number()
    }

    /// The upstream client, shared with auxiliary tasks such as a head
    /// follower.
    pub fn upstream_client(&self) -> Arc<EthRpcClient> {
        self.data.client.clone()
    }

    /// Handles a JSON-RPC method invocation.
    pub async fn handle_request(
        &self,
        request: MethodInvocation,
    ) -> Result<serde_json::Value, ProviderError> {
        tracing::debug!(method = request.name(), "handling request");

        match request {
            MethodInvocation::BlockNumber(()) => {
                to_json(U64::from(self.data.store.latest_number()))
            }
            MethodInvocation::ChainId(()) => to_json(U64::from(self.data.config.chain_id)),
            MethodInvocation::NetVersion(()) => to_json(self.data.config.network_id().to_string()),
            MethodInvocation::GetBalance(address, block_spec) => {
                let number = self.resolve_block_spec(block_spec).await?;
                let proof = state::verified_account(&self.data, address, number).await?;
                to_json(proof.balance)
            }
            MethodInvocation::GetTransactionCount(address, block_spec) => {
                let number = self.resolve_block_spec(block_spec).await?;
                let proof = state::verified_account(&self.data, address, number).await?;
                to_json(U64::from(proof.nonce))
            }
            MethodInvocation::GetCode(address, block_spec) => {
                let number = self.resolve_block_spec(block_spec).await?;
                let code = state::verified_code(&self.data, address, number).await?;
                to_json(code)
            }
            MethodInvocation::GetBlockByNumber(block_spec, full) => {
                let number = self.resolve_block_spec(Some(block_spec)).await?;
                let chain = self.data.chain();
                let header = chain.verified_header_at(number).await?;
                let block = chain.block(&header).await?;
                block_response(block, full)
            }
            MethodInvocation::GetBlockByHash(hash, full) => {
                let chain = self.data.chain();
                let header = chain.header_by_hash(hash).await?;
                let block = chain.block(&header).await?;
                block_response(block, full)
            }
            MethodInvocation::GetLogs(filter) => self.get_logs(filter).await,
            MethodInvocation::Call(call_request, block_spec) => {
                let number = self.resolve_block_spec(block_spec).await?;
                let bytes = call::execute_call(&self.data, call_request, number).await?;
                to_json(bytes)
            }
            MethodInvocation::EstimateGas(call_request, block_spec) => {
                let number = self.resolve_block_spec(block_spec).await?;
                let gas = call::execute_estimate_gas(&self.data, call_request, number).await?;
                to_json(U64::from(gas))
            }
            MethodInvocation::SendRawTransaction(raw) => self.send_raw_transaction(raw).await,
            MethodInvocation::GetTransactionReceipt(hash) => {
                self.get_transaction_receipt(hash).await
            }
        }
    }

    /// Resolves a block specifier to a concrete block number, applying the
    /// block-tag policy: only `latest` and explicit numbers within the
    /// allowed window are served; numbers slightly beyond the head suspend
    /// until the head catches up.
    async fn resolve_block_spec(
        &self,
        block_spec: Option<BlockSpec>,
    ) -> Result<u64, ProviderError> {
        match block_spec.unwrap_or_else(BlockSpec::latest) {
            BlockSpec::Tag(BlockTag::Latest) => Ok(self.data.store.latest_number()),
            BlockSpec::Tag(tag) => Err(ProviderError::UnsupportedBlockTag { tag }),
            BlockSpec::Number(number) => {
                let latest = self.data.store.latest_number();
                let min = latest.saturating_sub(self.data.config.max_block_history);
                let max = latest.saturating_add(self.data.config.max_block_future);
                if number < min || number > max {
                    return Err(ProviderError::BlockOutOfRange {
                        requested: number,
                        min,
                        max,
                    });
                }

                if number > latest {
                    self.data.store.wait_for(number).await;
                }
                Ok(number)
            }
        }
    }

    async fn get_logs(&self, filter: LogFilterOptions) -> Result<serde_json::Value, ProviderError> {
        if filter.block_hash.is_some() && (filter.from_block.is_some() || filter.to_block.is_some())
        {
            return Err(ProviderError::InvalidFilter(
                "blockHash is mutually exclusive with fromBlock/toBlock",
            ));
        }

        let resolved = if filter.block_hash.is_some() {
            filter
        } else {
            let from = self.resolve_block_spec(filter.from_block).await?;
            let to = self.resolve_block_spec(filter.to_block).await?;
            if from > to {
                return Err(ProviderError::InvalidFilter(
                    "fromBlock is greater than toBlock",
                ));
            }

            LogFilterOptions {
                from_block: Some(BlockSpec::Number(from)),
                to_block: Some(BlockSpec::Number(to)),
                ..filter
            }
        };

        let logs = self.data.client.logs(resolved.clone()).await?;
        logs::verify_logs(&self.data.chain(), &self.data.client, &resolved, &logs).await?;
        to_json(logs)
    }

    /// Forwards a raw transaction opaquely, but answers with the locally
    /// recomputed hash of the decoded bytes so that a lying upstream cannot
    /// misdirect the caller to a different transaction.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<serde_json::Value, ProviderError> {
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|error| ProviderError::InvalidRawTransaction(error.to_string()))?;
        let local_hash = keccak256(envelope.encoded_2718());

        let upstream_hash = self.data.client.send_raw_transaction(raw).await?;
        if upstream_hash != local_hash {
            tracing::warn!(
                %upstream_hash,
                %local_hash,
                "upstream announced a different hash for a submitted transaction"
            );
        }

        to_json(local_hash)
    }

    /// Returns a partially verified receipt: block and transaction membership
    /// are checked against the trusted chain, but gas, price and log fields
    /// are not verifiable without full receipt-trie extraction and are
    /// returned as zeroed placeholders. The status field is passed through
    /// unverified.
    async fn get_transaction_receipt(
        &self,
        transaction_hash: B256,
    ) -> Result<serde_json::Value, ProviderError> {
        let Some(receipt) = self.data.client.transaction_receipt(transaction_hash).await? else {
            return Ok(serde_json::Value::Null);
        };
        let (Some(number), Some(claimed_hash)) = (receipt.block_number, receipt.block_hash) else {
            // Pending receipts cannot be verified.
            return Ok(serde_json::Value::Null);
        };
        if number > self.data.store.latest_number() {
            // The containing block is not trusted yet.
            return Ok(serde_json::Value::Null);
        }

        let chain = self.data.chain();
        let trusted = chain.block_hash(number).await?;
        if trusted != claimed_hash {
            return Err(ProviderError::BlockHashMismatch {
                expected: trusted,
                actual: claimed_hash,
            });
        }

        let header = chain.header_by_hash(trusted).await?;
        let block = chain.block(&header).await?;
        let index = block.transaction_index(receipt.transaction_hash).ok_or(
            LogVerificationError::TransactionNotInBlock {
                transaction_hash: receipt.transaction_hash,
                number,
            },
        )? as u64;
        if index != receipt.transaction_index {
            return Err(LogVerificationError::TransactionIndexMismatch {
                transaction_hash: receipt.transaction_hash,
                claimed: receipt.transaction_index,
                actual: index,
            }
            .into());
        }

        to_json(TransactionReceipt {
            gas_used: Some(0),
            cumulative_gas_used: 0,
            effective_gas_price: Some(0),
            logs: Vec::new(),
            logs_bloom: Bloom::ZERO,
            ..receipt
        })
    }
}

fn block_response(block: VerifiedBlock, full: bool) -> Result<serde_json::Value, ProviderError> {
    if full {
        to_json(block.block)
    } else {
        let hashes = block.transaction_hashes.clone();
        to_json(block.block.with_transactions::<B256>(hashes))
    }
}

fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value, ProviderError> {
    serde_json::to_value(value).map_err(ProviderError::Serialization)
}
