use std::sync::Arc;

use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{keccak256, B256};
use alloy_rpc_types_eth::Transaction;
use tokio::runtime;
use warden_eth::{block::BlockHeader, trie::ordered_trie_root};
use warden_evm::{BlockHashSource, StateAccessError};
use warden_rpc_eth::{Block, EthRpcClient};

use crate::{error::ProviderError, head::TrustedHeadStore};

/// A block whose header, hash and transaction set have been verified against
/// the trusted-head store.
#[derive(Clone, Debug)]
pub struct VerifiedBlock {
    /// The block's hash
    pub hash: B256,
    /// The verified header
    pub header: BlockHeader,
    /// The upstream block object, for response passthrough
    pub block: Block<Transaction>,
    /// Locally recomputed transaction hashes, index-aligned with the block's
    /// transactions
    pub transaction_hashes: Vec<B256>,
}

impl VerifiedBlock {
    /// The index of the transaction with the given hash, if it is part of
    /// this block.
    pub fn transaction_index(&self, transaction_hash: B256) -> Option<usize> {
        self.transaction_hashes
            .iter()
            .position(|hash| *hash == transaction_hash)
    }
}

/// Fetches headers and blocks from the upstream and verifies them against
/// the trusted-head store, walking parent pointers to anchor historical
/// blocks.
#[derive(Clone, Debug)]
pub struct ChainVerifier {
    client: Arc<EthRpcClient>,
    store: Arc<TrustedHeadStore>,
}

impl ChainVerifier {
    /// Creates a verifier over the given upstream client and store.
    pub fn new(client: Arc<EthRpcClient>, store: Arc<TrustedHeadStore>) -> Self {
        Self { client, store }
    }

    /// The underlying trusted-head store.
    pub fn store(&self) -> &TrustedHeadStore {
        &self.store
    }

    /// Fetches the header with the given hash and verifies that it actually
    /// hashes to it. Verified headers are cached.
    pub async fn header_by_hash(&self, hash: B256) -> Result<BlockHeader, ProviderError> {
        if let Some(header) = self.store.cached_header(&hash) {
            return Ok(header);
        }

        let block = self
            .client
            .block_by_hash_with_transaction_data(hash)
            .await?
            .ok_or(ProviderError::MissingBlockByHash { hash })?;

        let header = block.to_header()?;
        let actual = header.hash();
        if actual != hash {
            return Err(ProviderError::HeaderHashMismatch {
                expected: hash,
                actual,
            });
        }

        self.store.cache_header(hash, header.clone());
        Ok(header)
    }

    /// The trusted hash of the block at the given height.
    ///
    /// Heights without a recorded hash are anchored by walking parent
    /// pointers down from the nearest trusted descendant, verifying each
    /// header on the way and recording the derived hashes.
    pub async fn block_hash(&self, number: u64) -> Result<B256, ProviderError> {
        if let Some(hash) = self.store.recorded_hash(number) {
            return Ok(hash);
        }

        let latest = self.store.latest_number();
        if number > latest {
            return Err(ProviderError::BlockAboveTrustedHead { number, latest });
        }

        let (mut height, mut hash) = self
            .store
            .nearest_recorded_at_or_above(number)
            .ok_or(ProviderError::BlockAboveTrustedHead { number, latest })?;

        while height > number {
            let header = self.header_by_hash(hash).await?;
            hash = header.parent_hash;
            height -= 1;
            self.store.record_derived_hash(height, hash);

            // A hash recorded below may re-anchor the walk closer to the
            // target after a concurrent update.
            if let Some(recorded) = self.store.recorded_hash(height) {
                hash = recorded;
            }
        }

        Ok(hash)
    }

    /// The verified header of the block at the given height.
    pub async fn verified_header_at(&self, number: u64) -> Result<BlockHeader, ProviderError> {
        let hash = self.block_hash(number).await?;
        self.header_by_hash(hash).await
    }

    /// Fetches the full block committed to by the given verified header and
    /// validates its transaction set.
    ///
    /// The block is rejected unless its hash matches the header and inserting
    /// each transaction's encoding at its index into an empty trie reproduces
    /// the header's transaction root. Uncle lists must be empty; uncle
    /// verification is not implemented.
    pub async fn block(&self, header: &BlockHeader) -> Result<VerifiedBlock, ProviderError> {
        let expected = header.hash();

        let block = self
            .client
            .block_by_number_with_transaction_data(header.number)
            .await?
            .ok_or(ProviderError::MissingBlock {
                number: header.number,
            })?;

        let actual = block.to_header()?.hash();
        if actual != expected {
            return Err(ProviderError::BlockHashMismatch { expected, actual });
        }

        if !block.uncles.is_empty() {
            return Err(ProviderError::UnclesUnsupported {
                number: header.number,
            });
        }

        let encoded: Vec<Vec<u8>> = block
            .transactions
            .iter()
            .map(|transaction| transaction.inner.inner().encoded_2718())
            .collect();

        if ordered_trie_root(&encoded) != header.transactions_root {
            return Err(ProviderError::TransactionRootMismatch {
                number: header.number,
            });
        }

        let transaction_hashes = encoded.iter().map(keccak256).collect();

        Ok(VerifiedBlock {
            hash: expected,
            header: header.clone(),
            block,
            transaction_hashes,
        })
    }
}

/// Bridges the EVM's synchronous `BLOCKHASH` lookups into the async chain
/// verifier.
#[derive(Clone, Debug)]
pub struct TrustedBlockHashes {
    verifier: ChainVerifier,
    runtime: runtime::Handle,
}

impl TrustedBlockHashes {
    /// Creates a bridge running lookups on the given runtime.
    pub fn new(verifier: ChainVerifier, runtime: runtime::Handle) -> Self {
        Self { verifier, runtime }
    }
}

impl BlockHashSource for TrustedBlockHashes {
    fn block_hash_at(&self, number: u64) -> Result<B256, StateAccessError> {
        tokio::task::block_in_place(|| {
            self.runtime.block_on(self.verifier.block_hash(number))
        })
        .map_err(|error| StateAccessError::BlockHash {
            number,
            reason: error.to_string(),
        })
    }
}
