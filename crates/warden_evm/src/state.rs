use alloy_primitives::{Address, B256, U256};
use revm::{
    bytecode::Bytecode,
    database::CacheDB,
    database_interface::{DBErrorMarker, DatabaseRef},
    state::AccountInfo,
};

/// Source of trusted block hashes for the EVM's `BLOCKHASH` opcode.
///
/// The trusted-head store implements this; execution never asks the upstream
/// for a block hash directly.
pub trait BlockHashSource {
    /// Returns the trusted hash of the block at the given height.
    fn block_hash_at(&self, number: u64) -> Result<B256, StateAccessError>;
}

/// Error raised when execution reaches beyond the verified state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateAccessError {
    /// An account outside the materialized access list was read.
    #[error("account {0} was accessed outside the materialized access list")]
    UnprovenAccount(Address),
    /// A storage slot outside the materialized access list was read.
    #[error("storage slot {index} of {address} was accessed outside the materialized access list")]
    UnprovenStorage {
        /// The account whose storage was read
        address: Address,
        /// The slot index
        index: U256,
    },
    /// Code was requested by hash without a materialized account carrying it.
    #[error("code {0} was accessed without a materialized account")]
    UnprovenCode(B256),
    /// The trusted block hash for a height could not be resolved.
    #[error("trusted block hash for height {number} is unavailable: {reason}")]
    BlockHash {
        /// The requested height
        number: u64,
        /// Why the hash could not be resolved
        reason: String,
    },
}

impl DBErrorMarker for StateAccessError {}

/// Highest mainnet precompile address (EIP-2537 BLS operations).
const MAX_PRECOMPILE: u16 = 0x11;

fn is_precompile(address: &Address) -> bool {
    let (prefix, suffix) = address.as_slice().split_at(18);
    let suffix = u16::from_be_bytes([suffix[0], suffix[1]]);
    prefix.iter().all(|byte| *byte == 0) && suffix > 0 && suffix <= MAX_PRECOMPILE
}

/// The base database of a verified call.
///
/// Everything the EVM touches must have been installed from verified proofs
/// beforehand; a read that falls through the materialized overlay is an
/// upstream access list that undersold the touched state, and the call is
/// rejected rather than silently zero-filled. Precompile addresses are the
/// exception: their accounts read as empty. `BLOCKHASH` escapes to the
/// trusted-head store.
#[derive(Debug)]
pub struct AccessListBase<SourceT> {
    block_hashes: SourceT,
}

impl<SourceT: BlockHashSource> DatabaseRef for AccessListBase<SourceT> {
    type Error = StateAccessError;

    fn basic_ref(&self, address: Address) -> Result<Option<AccountInfo>, Self::Error> {
        if is_precompile(&address) {
            Ok(None)
        } else {
            Err(StateAccessError::UnprovenAccount(address))
        }
    }

    fn code_by_hash_ref(&self, code_hash: B256) -> Result<Bytecode, Self::Error> {
        Err(StateAccessError::UnprovenCode(code_hash))
    }

    fn storage_ref(&self, address: Address, index: U256) -> Result<U256, Self::Error> {
        Err(StateAccessError::UnprovenStorage { address, index })
    }

    fn block_hash_ref(&self, number: u64) -> Result<B256, Self::Error> {
        self.block_hashes.block_hash_at(number)
    }
}

/// Per-call EVM state, populated exclusively from verified proofs.
#[derive(Debug)]
pub struct VerifiedState<SourceT: BlockHashSource> {
    db: CacheDB<AccessListBase<SourceT>>,
}

impl<SourceT: BlockHashSource> VerifiedState<SourceT> {
    /// Creates an empty state over the given trusted block-hash source.
    pub fn new(block_hashes: SourceT) -> Self {
        Self {
            db: CacheDB::new(AccessListBase { block_hashes }),
        }
    }

    /// Installs a verified account, including its code.
    pub fn insert_account(&mut self, address: Address, info: AccountInfo) {
        self.db.insert_account_info(address, info);
    }

    /// Installs a verified storage slot of a previously installed account.
    pub fn insert_storage(
        &mut self,
        address: Address,
        key: B256,
        value: B256,
    ) -> Result<(), StateAccessError> {
        self.db
            .insert_account_storage(address, key.into(), value.into())
    }

    pub(crate) fn into_inner(self) -> CacheDB<AccessListBase<SourceT>> {
        self.db
    }
}
