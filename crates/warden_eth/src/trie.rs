// The keccak hasher wiring for `triehash` follows code from foundry,
// distributed under their licenses:
// - https://github.com/foundry-rs/foundry/blob/01b16238ff87dc7ca8ee3f5f13e389888c2a2ee4/LICENSE-APACHE
// - https://github.com/foundry-rs/foundry/blob/01b16238ff87dc7ca8ee3f5f13e389888c2a2ee4/LICENSE-MIT
// For the original context see: https://github.com/foundry-rs/foundry/blob/01b16238ff87dc7ca8ee3f5f13e389888c2a2ee4/anvil/core/src/eth/trie.rs

use alloy_primitives::B256;
use hash256_std_hasher::Hash256StdHasher;
use sha3::{
    digest::generic_array::{typenum::consts::U32, GenericArray},
    Digest, Keccak256,
};

/// Computes the root of the Merkle-Patricia trie that stores each value at
/// the key of its RLP-encoded position.
///
/// This is the commitment scheme of the transaction and receipt tries: a
/// block's `transactionsRoot` is `ordered_trie_root` over the EIP-2718
/// encodings of its transactions, its `receiptsRoot` the same over its
/// encoded receipts. Reconstructing these roots from upstream data and
/// comparing them against a verified header is what proves transaction and
/// receipt sets.
pub fn ordered_trie_root<I, V>(values: I) -> B256
where
    I: IntoIterator<Item = V>,
    V: AsRef<[u8]>,
{
    let indexed = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| (alloy_rlp::encode(index), value));

    B256::from_slice(triehash::trie_root::<Keccak256Hasher, _, _, _>(indexed).as_ref())
}

struct Keccak256Hasher;

impl hash_db::Hasher for Keccak256Hasher {
    type Out = GenericArray<u8, U32>;

    type StdHasher = Hash256StdHasher;

    const LENGTH: usize = 32;

    fn hash(x: &[u8]) -> Self::Out {
        Keccak256::digest(x)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::keccak256;

    use super::*;
    use crate::KECCAK_NULL_RLP;

    #[test]
    fn empty_input_yields_null_root() {
        assert_eq!(ordered_trie_root(Vec::<Vec<u8>>::new()), KECCAK_NULL_RLP);
    }

    #[test]
    fn single_value_root_is_the_hashed_leaf() {
        let value = vec![0xca, 0xfe];

        // With one entry the whole trie is a single leaf node holding the
        // path of key rlp(0) = 0x80, i.e. the nibbles [8, 0] in even-length
        // leaf form, and the value as a byte string.
        let leaf: Vec<Vec<u8>> = vec![vec![0x20, 0x80], value.clone()];
        let encoded = alloy_rlp::encode(&leaf);

        assert_eq!(ordered_trie_root([&value]), keccak256(&encoded));
    }

    #[test]
    fn roots_depend_on_every_value() {
        let values: Vec<Vec<u8>> = (0u8..4).map(|i| vec![0xab, i]).collect();

        let full = ordered_trie_root(&values);
        let truncated = ordered_trie_root(&values[..3]);
        let mut altered = values.clone();
        altered[1][1] ^= 0xff;

        assert_ne!(full, truncated);
        assert_ne!(full, ordered_trie_root(&altered));
    }
}
