use alloy_primitives::{B256, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

use crate::{KECCAK_EMPTY, KECCAK_NULL_RLP};

/// An Ethereum account record, as stored in the state trie.
#[derive(Clone, Debug, PartialEq, Eq, RlpDecodable, RlpEncodable)]
pub struct TrieAccount {
    /// The account's nonce
    pub nonce: u64,
    /// The account's balance, in wei
    pub balance: U256,
    /// Root of the account's storage trie
    pub storage_root: B256,
    /// KECCAK-256 hash of the account's code
    pub code_hash: B256,
}

impl TrieAccount {
    /// Constructs an account record from raw RPC fields, substituting the
    /// canonical sentinels for the all-zero hashes some upstreams return for
    /// accounts without storage or code.
    pub fn from_rpc_parts(nonce: u64, balance: U256, storage_hash: B256, code_hash: B256) -> Self {
        Self {
            nonce,
            balance,
            storage_root: if storage_hash.is_zero() {
                KECCAK_NULL_RLP
            } else {
                storage_hash
            },
            code_hash: if code_hash.is_zero() {
                KECCAK_EMPTY
            } else {
                code_hash
            },
        }
    }

    /// Whether this is the canonical empty account: zero nonce and balance,
    /// empty storage trie, no code.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for TrieAccount {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::ZERO,
            storage_root: KECCAK_NULL_RLP,
            code_hash: KECCAK_EMPTY,
        }
    }
}
