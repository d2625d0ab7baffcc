use std::collections::HashMap;

use alloy_primitives::{BloomInput, B256};
use alloy_rpc_types_eth::Log;
use warden_eth::{filter::LogFilterOptions, trie::ordered_trie_root};
use warden_rpc_client::RpcClientError;
use warden_rpc_eth::{EthRpcClient, TransactionReceipt};

use crate::{
    chain::{ChainVerifier, VerifiedBlock},
    error::ProviderError,
};

/// Error that occurs when an upstream log fails verification.
#[derive(Debug, thiserror::Error)]
pub enum LogVerificationError {
    /// The log lacks block or transaction coordinates.
    #[error("log of transaction {transaction_hash:?} is pending")]
    PendingLog {
        /// The log's transaction hash, when present
        transaction_hash: Option<B256>,
    },
    /// The log does not match the requested filter.
    #[error("log of transaction {transaction_hash} does not match the requested filter")]
    FilterMismatch {
        /// The log's transaction hash
        transaction_hash: B256,
    },
    /// The log names a block hash other than the trusted one at its height.
    #[error("log claims block {claimed}, but the trusted block at height {number} is {trusted}")]
    BlockHashMismatch {
        /// The block hash named by the log
        claimed: B256,
        /// The block number named by the log
        number: u64,
        /// The trusted hash at that height
        trusted: B256,
    },
    /// The log names a transaction that is not part of its block.
    #[error("transaction {transaction_hash} is not part of block {number}")]
    TransactionNotInBlock {
        /// The transaction hash named by the log
        transaction_hash: B256,
        /// The block number named by the log
        number: u64,
    },
    /// The log names a transaction index other than the verified one.
    #[error("transaction {transaction_hash} has index {actual}, log claims {claimed}")]
    TransactionIndexMismatch {
        /// The transaction hash named by the log
        transaction_hash: B256,
        /// The index claimed by the log
        claimed: u64,
        /// The verified index
        actual: u64,
    },
    /// The log's address or topics are not present in the header's bloom.
    #[error("log of transaction {transaction_hash} is not covered by the header bloom")]
    BloomMismatch {
        /// The log's transaction hash
        transaction_hash: B256,
    },
    /// The block's receipts carry no receipt for the log's transaction.
    #[error("no receipt for transaction {0}")]
    MissingReceipt(B256),
    /// The verified receipt does not contain the claimed log.
    #[error("receipt of transaction {0} does not contain the claimed log")]
    LogNotInReceipt(B256),
}

/// Verifies a batch of upstream logs against the trusted chain.
///
/// Per log: block membership via the trusted hash at its height, transaction
/// membership via the verified transaction set, bloom coverage in the
/// verified header, and finally containment in the receipt located in the
/// reconstructed (root-checked) receipt set of the block. Blocks and receipt
/// sets are fetched once per height within a single verification run.
pub async fn verify_logs(
    chain: &ChainVerifier,
    client: &EthRpcClient,
    filter: &LogFilterOptions,
    logs: &[Log],
) -> Result<(), ProviderError> {
    let mut blocks: HashMap<u64, VerifiedBlock> = HashMap::new();
    let mut receipts: HashMap<u64, Vec<TransactionReceipt>> = HashMap::new();

    for log in logs {
        let (Some(number), Some(claimed_hash), Some(_), Some(transaction_hash), Some(claimed_index)) = (
            log.block_number,
            log.block_hash,
            log.log_index,
            log.transaction_hash,
            log.transaction_index,
        ) else {
            return Err(LogVerificationError::PendingLog {
                transaction_hash: log.transaction_hash,
            }
            .into());
        };

        if !filter.matches_log(&log.inner.address, log.inner.data.topics()) {
            return Err(LogVerificationError::FilterMismatch { transaction_hash }.into());
        }
        if let Some(warden_eth::block_spec::BlockSpec::Number(from)) = filter.from_block {
            if number < from {
                return Err(LogVerificationError::FilterMismatch { transaction_hash }.into());
            }
        }
        if let Some(warden_eth::block_spec::BlockSpec::Number(to)) = filter.to_block {
            if number > to {
                return Err(LogVerificationError::FilterMismatch { transaction_hash }.into());
            }
        }
        if let Some(expected_hash) = filter.block_hash {
            if claimed_hash != expected_hash {
                return Err(LogVerificationError::FilterMismatch { transaction_hash }.into());
            }
        }

        let block = match blocks.entry(number) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                let header = chain.verified_header_at(number).await?;
                entry.insert(chain.block(&header).await?)
            }
        };

        if block.hash != claimed_hash {
            return Err(LogVerificationError::BlockHashMismatch {
                claimed: claimed_hash,
                number,
                trusted: block.hash,
            }
            .into());
        }

        let actual_index = block.transaction_index(transaction_hash).ok_or(
            LogVerificationError::TransactionNotInBlock {
                transaction_hash,
                number,
            },
        )? as u64;
        if actual_index != claimed_index {
            return Err(LogVerificationError::TransactionIndexMismatch {
                transaction_hash,
                claimed: claimed_index,
                actual: actual_index,
            }
            .into());
        }

        let bloom = &block.header.logs_bloom;
        let bloom_covered = bloom.contains_input(BloomInput::Raw(log.inner.address.as_slice()))
            && log
                .inner
                .data
                .topics()
                .iter()
                .all(|topic| bloom.contains_input(BloomInput::Raw(topic.as_slice())));
        if !bloom_covered {
            return Err(LogVerificationError::BloomMismatch { transaction_hash }.into());
        }

        let block_receipts = match receipts.entry(number) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(verified_block_receipts(client, block).await?)
            }
        };

        let receipt = block_receipts
            .iter()
            .find(|receipt| receipt.transaction_hash == transaction_hash)
            .ok_or(LogVerificationError::MissingReceipt(transaction_hash))?;

        let contained = receipt.logs.iter().any(|receipt_log| {
            receipt_log.inner.address == log.inner.address
                && receipt_log.inner.data.data == log.inner.data.data
                && receipt_log.inner.data.topics() == log.inner.data.topics()
        });
        if !contained {
            return Err(LogVerificationError::LogNotInReceipt(transaction_hash).into());
        }
    }

    Ok(())
}

/// Fetches all receipts of a verified block and checks that they reproduce
/// the header's receipt root.
///
/// `eth_getBlockReceipts` is preferred; when the upstream reports the method
/// as unsupported, the receipts are fetched through a single batch of
/// `eth_getTransactionReceipt` calls instead. Any other failure is fatal.
pub async fn verified_block_receipts(
    client: &EthRpcClient,
    block: &VerifiedBlock,
) -> Result<Vec<TransactionReceipt>, ProviderError> {
    let number = block.header.number;

    let receipts = match client.block_receipts(number).await {
        Ok(Some(receipts)) => receipts,
        Ok(None) => return Err(ProviderError::MissingBlock { number }),
        Err(RpcClientError::UnsupportedMethod { .. }) => {
            per_transaction_receipts(client, block).await?
        }
        Err(RpcClientError::JsonRpcError { error, .. }) if error.is_method_not_found() => {
            per_transaction_receipts(client, block).await?
        }
        Err(error) => return Err(error.into()),
    };

    if receipts.len() != block.transaction_hashes.len() {
        return Err(ProviderError::ReceiptRootMismatch { number });
    }

    let encoded = receipts
        .iter()
        .map(|receipt| {
            receipt
                .to_execution_receipt()
                .map(|receipt| receipt.encoded())
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ordered_trie_root(&encoded) != block.header.receipts_root {
        return Err(ProviderError::ReceiptRootMismatch { number });
    }

    Ok(receipts)
}

async fn per_transaction_receipts(
    client: &EthRpcClient,
    block: &VerifiedBlock,
) -> Result<Vec<TransactionReceipt>, ProviderError> {
    tracing::debug!(
        number = block.header.number,
        "upstream lacks eth_getBlockReceipts, falling back to per-transaction receipts"
    );

    let receipts = client
        .transaction_receipts(&block.transaction_hashes)
        .await?;

    receipts
        .into_iter()
        .zip(&block.transaction_hashes)
        .map(|(receipt, transaction_hash)| {
            receipt.ok_or_else(|| {
                LogVerificationError::MissingReceipt(*transaction_hash).into()
            })
        })
        .collect()
}
