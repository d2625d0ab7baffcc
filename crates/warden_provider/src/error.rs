use alloy_primitives::{Address, Bytes, B256};
use warden_eth::block_spec::BlockTag;
use warden_evm::EvmError;
use warden_proof::ProofError;
use warden_rpc_client::{jsonrpc, RpcClientError};
use warden_rpc_eth::{block::HeaderConversionError, receipt::ReceiptConversionError};

/// Error that occurs while creating a [`Provider`](crate::Provider).
#[derive(Debug, thiserror::Error)]
pub enum CreationError {
    /// The upstream client could not be constructed.
    #[error(transparent)]
    RpcClient(#[from] RpcClientError),
}

/// Error surfaced by the verifying provider.
///
/// Every variant maps to one of the two user-visible JSON-RPC error kinds:
/// invalid params (the caller's fault) or internal (the upstream failed, the
/// upstream lied, or local execution raised).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The requested block tag is not supported.
    #[error("block tag '{tag}' is not supported")]
    UnsupportedBlockTag {
        /// The rejected tag
        tag: BlockTag,
    },
    /// The requested block number is outside the allowed window around the
    /// trusted head.
    #[error("block number {requested} is outside the allowed range [{min}, {max}]")]
    BlockOutOfRange {
        /// The requested block number
        requested: u64,
        /// Lowest acceptable block number
        min: u64,
        /// Highest acceptable block number
        max: u64,
    },
    /// The transaction object of a call is malformed.
    #[error("invalid transaction: {0}")]
    InvalidTransactionInput(&'static str),
    /// The log filter object is malformed.
    #[error("invalid filter: {0}")]
    InvalidFilter(&'static str),
    /// The raw transaction bytes could not be decoded.
    #[error("invalid raw transaction: {0}")]
    InvalidRawTransaction(String),

    /// The upstream request failed.
    #[error(transparent)]
    RpcClient(#[from] RpcClientError),
    /// The upstream does not know a block it is required to have.
    #[error("block {number} is unknown to the upstream")]
    MissingBlock {
        /// The missing block number
        number: u64,
    },
    /// The upstream does not know a block hash it is required to have.
    #[error("block {hash} is unknown to the upstream")]
    MissingBlockByHash {
        /// The missing block hash
        hash: B256,
    },
    /// A block number beyond the trusted head was asked of the verifier.
    #[error("block {number} is above the trusted head {latest}")]
    BlockAboveTrustedHead {
        /// The requested block number
        number: u64,
        /// The trusted head at the time of the request
        latest: u64,
    },
    /// An upstream block object could not be turned into a header.
    #[error(transparent)]
    HeaderConversion(#[from] HeaderConversionError),
    /// A header does not hash to the trusted value.
    #[error("header claimed as {expected} hashes to {actual}")]
    HeaderHashMismatch {
        /// The hash the header was fetched under
        expected: B256,
        /// The hash the header actually has
        actual: B256,
    },
    /// The upstream returned a different block than the verified header.
    #[error("upstream returned block {actual} where {expected} was required")]
    BlockHashMismatch {
        /// The hash of the verified header
        expected: B256,
        /// The hash of the returned block
        actual: B256,
    },
    /// The block's transactions do not reproduce the header's transaction
    /// root.
    #[error("transaction trie of block {number} does not reproduce the header root")]
    TransactionRootMismatch {
        /// The block number
        number: u64,
    },
    /// The block carries uncles, which cannot be verified yet.
    #[error("block {number} has a non-empty uncle list")]
    UnclesUnsupported {
        /// The block number
        number: u64,
    },
    /// The block's receipts do not reproduce the header's receipt root.
    #[error("receipt trie of block {number} does not reproduce the header root")]
    ReceiptRootMismatch {
        /// The block number
        number: u64,
    },
    /// An upstream receipt could not be turned into its consensus form.
    #[error(transparent)]
    ReceiptConversion(#[from] ReceiptConversionError),
    /// An account or storage proof failed verification.
    #[error(transparent)]
    Proof(#[from] ProofError),
    /// Returned bytecode does not hash to the verified code hash.
    #[error("bytecode of {address} does not hash to the verified code hash")]
    CodeHashMismatch {
        /// The account whose code was requested
        address: Address,
    },
    /// A log returned by the upstream failed verification.
    #[error(transparent)]
    Log(#[from] crate::logs::LogVerificationError),
    /// The upstream could not produce an access list for a call.
    #[error("upstream failed to produce an access list: {0}")]
    AccessList(String),
    /// Local EVM execution failed.
    #[error(transparent)]
    Evm(#[from] EvmError),
    /// The executed call reverted.
    #[error("execution reverted: {data}")]
    ExecutionReverted {
        /// The revert payload
        data: Bytes,
    },
    /// The executed call halted exceptionally.
    #[error("execution halted: {reason}")]
    ExecutionHalted {
        /// The halt reason
        reason: String,
    },
    /// A response could not be serialized.
    #[error(transparent)]
    Serialization(serde_json::Error),
}

const INVALID_PARAMS: i16 = -32602;
const INTERNAL_ERROR: i16 = -32603;

impl ProviderError {
    /// The JSON-RPC error code of this error.
    pub fn error_code(&self) -> i16 {
        match self {
            ProviderError::UnsupportedBlockTag { .. } => INVALID_PARAMS,
            ProviderError::BlockOutOfRange { .. } => INVALID_PARAMS,
            ProviderError::InvalidTransactionInput(_) => INVALID_PARAMS,
            ProviderError::InvalidFilter(_) => INVALID_PARAMS,
            ProviderError::InvalidRawTransaction(_) => INVALID_PARAMS,
            ProviderError::RpcClient(_) => INTERNAL_ERROR,
            ProviderError::MissingBlock { .. } => INTERNAL_ERROR,
            ProviderError::MissingBlockByHash { .. } => INTERNAL_ERROR,
            ProviderError::BlockAboveTrustedHead { .. } => INTERNAL_ERROR,
            ProviderError::HeaderConversion(_) => INTERNAL_ERROR,
            ProviderError::HeaderHashMismatch { .. } => INTERNAL_ERROR,
            ProviderError::BlockHashMismatch { .. } => INTERNAL_ERROR,
            ProviderError::TransactionRootMismatch { .. } => INTERNAL_ERROR,
            ProviderError::UnclesUnsupported { .. } => INTERNAL_ERROR,
            ProviderError::ReceiptRootMismatch { .. } => INTERNAL_ERROR,
            ProviderError::ReceiptConversion(_) => INTERNAL_ERROR,
            ProviderError::Proof(_) => INTERNAL_ERROR,
            ProviderError::CodeHashMismatch { .. } => INTERNAL_ERROR,
            ProviderError::Log(_) => INTERNAL_ERROR,
            ProviderError::AccessList(_) => INTERNAL_ERROR,
            ProviderError::Evm(_) => INTERNAL_ERROR,
            ProviderError::ExecutionReverted { .. } => INTERNAL_ERROR,
            ProviderError::ExecutionHalted { .. } => INTERNAL_ERROR,
            ProviderError::Serialization(_) => INTERNAL_ERROR,
        }
    }
}

impl From<ProviderError> for jsonrpc::Error {
    fn from(error: ProviderError) -> Self {
        let data = match &error {
            ProviderError::ExecutionReverted { data } => {
                Some(serde_json::Value::String(data.to_string()))
            }
            _ => None,
        };

        jsonrpc::Error {
            code: error.error_code(),
            message: error.to_string(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_faults_map_to_invalid_params() {
        assert_eq!(
            ProviderError::UnsupportedBlockTag {
                tag: BlockTag::Pending
            }
            .error_code(),
            INVALID_PARAMS
        );
        assert_eq!(
            ProviderError::InvalidTransactionInput("missing 'to'").error_code(),
            INVALID_PARAMS
        );
    }

    #[test]
    fn verification_failures_map_to_internal() {
        let error = ProviderError::HeaderHashMismatch {
            expected: B256::ZERO,
            actual: B256::repeat_byte(1),
        };
        assert_eq!(error.error_code(), INTERNAL_ERROR);

        let converted = jsonrpc::Error::from(error);
        assert_eq!(converted.code, INTERNAL_ERROR);
    }

    #[test]
    fn revert_payload_is_attached_as_data() {
        let error = ProviderError::ExecutionReverted {
            data: Bytes::from_static(&[0x08, 0xc3, 0x79, 0xa0]),
        };
        let converted = jsonrpc::Error::from(error);
        assert_eq!(
            converted.data,
            Some(serde_json::Value::String("0x08c379a0".to_string()))
        );
    }
}
