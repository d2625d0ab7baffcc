#![warn(missing_docs)]

//! Core Ethereum types shared by the warden proxy crates.

/// Ethereum account state record types.
pub mod account;
/// Ethereum block header types.
pub mod block;
/// Block specifiers accepted by the JSON-RPC surface.
pub mod block_spec;
/// Log filter options of `eth_getLogs`.
pub mod filter;
/// Transaction receipt types and their consensus encoding.
pub mod receipt;
/// Helper utilities for serde.
pub mod serde;
/// Trie root reconstruction for header commitments.
pub mod trie;

pub use alloy_primitives::{
    address, b256, hex, keccak256, Address, Bloom, BloomInput, Bytes, B256, B64, U256, U64,
};

/// The KECCAK-256 hash of the empty byte sequence. Code hash of an account
/// without code.
pub const KECCAK_EMPTY: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

/// The KECCAK-256 hash of the RLP encoding of the empty string. Root of an
/// empty Merkle-Patricia trie.
pub const KECCAK_NULL_RLP: B256 =
    b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");

/// The KECCAK-256 hash of the RLP encoding of an empty list. Ommers hash of a
/// block without uncles.
pub const KECCAK_RLP_EMPTY_ARRAY: B256 =
    b256!("1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347");
