#![warn(missing_docs)]

//! Merkle-Patricia proof verification against trusted state roots.
//!
//! An untrusted upstream answers `eth_getProof` with an account record, a set
//! of storage slots, and the trie nodes that are claimed to link them to the
//! state root. Nothing from such a response may be used before it has been
//! checked here against a state root taken from a verified header.

use alloy_primitives::{keccak256, Address, B256};
use alloy_rpc_types_eth::EIP1186AccountProofResponse;
use alloy_trie::{proof::verify_proof, Nibbles};
use warden_eth::{account::TrieAccount, KECCAK_EMPTY, KECCAK_NULL_RLP};

/// Error that occurs when an upstream proof does not verify against the
/// trusted state root.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// The account proof does not resolve to the claimed account record.
    #[error("invalid account proof for {address}: {reason}")]
    Account {
        /// The proven address
        address: Address,
        /// The underlying trie verification error
        reason: String,
    },
    /// A storage proof does not resolve to the claimed slot value.
    #[error("invalid storage proof for {address} at slot {key}: {reason}")]
    Storage {
        /// The proven address
        address: Address,
        /// The storage slot key
        key: B256,
        /// The underlying trie verification error
        reason: String,
    },
    /// The response carries no proof for a requested storage slot.
    #[error("missing storage proof for {address} at slot {key}")]
    MissingStorageProof {
        /// The proven address
        address: Address,
        /// The storage slot key
        key: B256,
    },
}

/// Verifies the account record and the requested storage slots of an
/// `eth_getProof` response against a trusted state root.
///
/// All-or-nothing: the first failing check fails the whole response, and
/// nothing from a failed response may be used.
pub fn verify_account_and_storage(
    state_root: B256,
    address: Address,
    storage_keys: &[B256],
    proof: &EIP1186AccountProofResponse,
) -> Result<(), ProofError> {
    let account = TrieAccount::from_rpc_parts(
        proof.nonce,
        proof.balance,
        proof.storage_hash,
        proof.code_hash,
    );

    // An account that serializes as the canonical empty account is not stored
    // in the state trie, so the proof must show exclusion.
    let expected = if account.is_empty() {
        None
    } else {
        Some(alloy_rlp::encode(&account))
    };

    let key = Nibbles::unpack(keccak256(address));
    verify_proof(state_root, key, expected, &proof.account_proof).map_err(|error| {
        ProofError::Account {
            address,
            reason: error.to_string(),
        }
    })?;

    let storage_root = account.storage_root;
    for key in storage_keys {
        let entry = proof
            .storage_proof
            .iter()
            .find(|entry| entry.key.as_b256() == *key)
            .ok_or(ProofError::MissingStorageProof {
                address,
                key: *key,
            })?;

        // Zero-valued slots are not stored, so their proofs must show
        // exclusion; any other value must be proven inclusive as its RLP.
        let expected = if entry.value.is_zero() {
            None
        } else {
            Some(alloy_rlp::encode_fixed_size(&entry.value).to_vec())
        };

        let hashed_key = Nibbles::unpack(keccak256(key));
        verify_proof(storage_root, hashed_key, expected, &entry.proof).map_err(|error| {
            ProofError::Storage {
                address,
                key: *key,
                reason: error.to_string(),
            }
        })?;
    }

    Ok(())
}

/// Verifies contract bytecode against the code hash of a verified account.
///
/// Empty code is accepted against both the KECCAK-256 of the empty byte
/// sequence and the all-zero hash; some upstreams report the latter for
/// accounts without code.
pub fn verify_code(code: &[u8], code_hash: B256) -> bool {
    if code.is_empty() {
        code_hash == KECCAK_EMPTY || code_hash == B256::ZERO || keccak256(code) == code_hash
    } else {
        keccak256(code) == code_hash
    }
}

/// The root of the empty storage trie, for convenience of callers matching on
/// accounts without storage.
pub const EMPTY_STORAGE_ROOT: B256 = KECCAK_NULL_RLP;
