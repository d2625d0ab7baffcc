use alloy_eips::eip4895::Withdrawal;
use alloy_primitives::{Address, Bloom, Bytes, B256, B64, U256};
use warden_eth::block::{BlobGas, BlockHeader};

/// block object returned by `eth_getBlockBy*`
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block<TX> {
    /// Hash of the block. None when its pending block.
    pub hash: Option<B256>,
    /// hash of the parent block.
    pub parent_hash: B256,
    /// SHA3 of the uncles data in the block
    pub sha3_uncles: B256,
    /// the root of the final state trie of the block
    pub state_root: B256,
    /// the root of the transaction trie of the block
    pub transactions_root: B256,
    /// the root of the receipts trie of the block
    pub receipts_root: B256,
    /// the block number. None when its pending block.
    #[serde(default, with = "warden_eth::serde::optional_quantity")]
    pub number: Option<u64>,
    /// the total used gas by all transactions in this block
    #[serde(with = "warden_eth::serde::quantity")]
    pub gas_used: u64,
    /// the maximum gas allowed in this block
    #[serde(with = "warden_eth::serde::quantity")]
    pub gas_limit: u64,
    /// the "extra data" field of this block
    pub extra_data: Bytes,
    /// the bloom filter for the logs of the block
    pub logs_bloom: Bloom,
    /// the unix timestamp for when the block was collated
    #[serde(with = "warden_eth::serde::quantity")]
    pub timestamp: u64,
    /// integer of the difficulty for this block
    pub difficulty: U256,
    /// integer of the total difficulty of the chain until this block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_difficulty: Option<U256>,
    /// Array of uncle hashes
    #[serde(default)]
    pub uncles: Vec<B256>,
    /// Array of transaction objects, or 32 Bytes transaction hashes depending
    /// on the last given parameter
    #[serde(default = "Vec::new")]
    pub transactions: Vec<TX>,
    /// the length of the RLP encoding of this block in bytes
    #[serde(with = "warden_eth::serde::quantity")]
    pub size: u64,
    /// Mix hash. None when it's a pending block.
    pub mix_hash: Option<B256>,
    /// hash of the generated proof-of-work. null when its pending block.
    pub nonce: Option<B64>,
    /// base fee per gas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<U256>,
    /// the address of the beneficiary to whom the mining rewards were given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miner: Option<Address>,
    /// withdrawals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawals: Option<Vec<Withdrawal>>,
    /// withdrawals root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawals_root: Option<B256>,
    /// The total amount of gas used by the blob transactions.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "warden_eth::serde::optional_quantity"
    )]
    pub blob_gas_used: Option<u64>,
    /// A running total of blob gas consumed in excess of the target, prior to
    /// the block.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "warden_eth::serde::optional_quantity"
    )]
    pub excess_blob_gas: Option<u64>,
    /// Root of the parent beacon block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_beacon_block_root: Option<B256>,
    /// Commitment of the block's EIP-7685 execution requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_hash: Option<B256>,
}

/// Error that occurs when an RPC block cannot be converted into a block
/// header.
#[derive(Debug, thiserror::Error)]
pub enum HeaderConversionError {
    /// The block is pending and carries no consensus identity yet.
    #[error("pending blocks cannot be verified")]
    Pending,
    /// A required field was missing from the block object.
    #[error("missing block field: '{0}'")]
    MissingField(&'static str),
    /// The block carried only one of the two EIP-4844 blob gas fields.
    #[error("inconsistent blob gas fields")]
    InconsistentBlobGas,
}

impl<TX> Block<TX> {
    /// Replaces the block's transactions, e.g. full objects with bare hashes.
    pub fn with_transactions<NewTX>(self, transactions: Vec<NewTX>) -> Block<NewTX> {
        Block {
            hash: self.hash,
            parent_hash: self.parent_hash,
            sha3_uncles: self.sha3_uncles,
            state_root: self.state_root,
            transactions_root: self.transactions_root,
            receipts_root: self.receipts_root,
            number: self.number,
            gas_used: self.gas_used,
            gas_limit: self.gas_limit,
            extra_data: self.extra_data,
            logs_bloom: self.logs_bloom,
            timestamp: self.timestamp,
            difficulty: self.difficulty,
            total_difficulty: self.total_difficulty,
            uncles: self.uncles,
            transactions,
            size: self.size,
            mix_hash: self.mix_hash,
            nonce: self.nonce,
            base_fee_per_gas: self.base_fee_per_gas,
            miner: self.miner,
            withdrawals: self.withdrawals,
            withdrawals_root: self.withdrawals_root,
            blob_gas_used: self.blob_gas_used,
            excess_blob_gas: self.excess_blob_gas,
            parent_beacon_block_root: self.parent_beacon_block_root,
            requests_hash: self.requests_hash,
        }
    }

    /// Reconstructs the consensus header committed to by this block object.
    ///
    /// Pending blocks are rejected: without a number, nonce and mix hash the
    /// header cannot be hashed, so it can never be verified.
    pub fn to_header(&self) -> Result<BlockHeader, HeaderConversionError> {
        let blob_gas = match (self.blob_gas_used, self.excess_blob_gas) {
            (Some(gas_used), Some(excess_gas)) => Some(BlobGas {
                gas_used,
                excess_gas,
            }),
            (None, None) => None,
            _ => return Err(HeaderConversionError::InconsistentBlobGas),
        };

        Ok(BlockHeader {
            parent_hash: self.parent_hash,
            ommers_hash: self.sha3_uncles,
            beneficiary: self
                .miner
                .ok_or(HeaderConversionError::MissingField("miner"))?,
            state_root: self.state_root,
            transactions_root: self.transactions_root,
            receipts_root: self.receipts_root,
            logs_bloom: self.logs_bloom,
            difficulty: self.difficulty,
            number: self.number.ok_or(HeaderConversionError::Pending)?,
            gas_limit: self.gas_limit,
            gas_used: self.gas_used,
            timestamp: self.timestamp,
            extra_data: self.extra_data.clone(),
            mix_hash: self.mix_hash.ok_or(HeaderConversionError::Pending)?,
            nonce: self.nonce.ok_or(HeaderConversionError::Pending)?,
            base_fee_per_gas: self.base_fee_per_gas.map(|base_fee| base_fee.to()),
            withdrawals_root: self.withdrawals_root,
            blob_gas,
            parent_beacon_block_root: self.parent_beacon_block_root,
            requests_hash: self.requests_hash,
        })
    }
}
