use alloy_eips::eip7840::BlobParams;
use alloy_primitives::U256;
use revm::{
    context::{BlockEnv, CfgEnv, TxEnv},
    context_interface::{block::BlobExcessGasAndPrice, result::ResultAndState},
    primitives::hardfork::SpecId,
    Context, ExecuteEvm, MainBuilder, MainContext,
};
use warden_eth::block::BlockHeader;

use crate::state::{BlockHashSource, StateAccessError, VerifiedState};

/// Error raised while executing a call against verified state.
#[derive(Debug, thiserror::Error)]
pub enum EvmError {
    /// Execution escaped the materialized access-list state.
    #[error(transparent)]
    StateAccess(#[from] StateAccessError),
    /// The transaction was rejected before execution.
    #[error("transaction rejected: {0}")]
    InvalidTransaction(String),
    /// The block environment was rejected.
    #[error("invalid block environment: {0}")]
    InvalidHeader(String),
    /// Any other EVM failure.
    #[error("EVM failure: {0}")]
    Custom(String),
}

/// Builds the EVM block environment committed to by a verified header.
pub fn block_env_for_header(header: &BlockHeader, spec_id: SpecId) -> BlockEnv {
    BlockEnv {
        number: U256::from(header.number),
        beneficiary: header.beneficiary,
        timestamp: U256::from(header.timestamp),
        gas_limit: header.gas_limit,
        basefee: header.base_fee_per_gas.map_or(0u64, |base_fee| {
            base_fee.try_into().expect("base fee is too large")
        }),
        difficulty: header.difficulty,
        prevrandao: if spec_id >= SpecId::MERGE {
            Some(header.mix_hash)
        } else {
            None
        },
        blob_excess_gas_and_price: header.blob_gas.as_ref().map(|blob_gas| {
            let blob_params = if spec_id >= SpecId::PRAGUE {
                BlobParams::prague()
            } else {
                BlobParams::cancun()
            };

            BlobExcessGasAndPrice::new(
                blob_gas.excess_gas,
                blob_params
                    .update_fraction
                    .try_into()
                    .expect("blob update fraction is too large"),
            )
        }),
    }
}

/// Runs a transaction against the verified state without committing.
pub fn dry_run<SourceT: BlockHashSource>(
    state: VerifiedState<SourceT>,
    cfg: CfgEnv,
    block: BlockEnv,
    transaction: TxEnv,
) -> Result<ResultAndState, EvmError> {
    let mut evm = Context::mainnet()
        .with_db(state.into_inner())
        .with_cfg(cfg)
        .with_block(block)
        .build_mainnet();

    evm.transact(transaction).map_err(|error| match error {
        revm::context_interface::result::EVMError::Database(error) => error.into(),
        revm::context_interface::result::EVMError::Transaction(error) => {
            EvmError::InvalidTransaction(error.to_string())
        }
        revm::context_interface::result::EVMError::Header(error) => {
            EvmError::InvalidHeader(error.to_string())
        }
        revm::context_interface::result::EVMError::Custom(error) => EvmError::Custom(error),
    })
}

/// Runs a transaction without committing the state, while disabling balance,
/// nonce and block gas limit checks.
pub fn guaranteed_dry_run<SourceT: BlockHashSource>(
    state: VerifiedState<SourceT>,
    mut cfg: CfgEnv,
    block: BlockEnv,
    transaction: TxEnv,
) -> Result<ResultAndState, EvmError> {
    cfg.disable_balance_check = true;
    cfg.disable_block_gas_limit = true;
    cfg.disable_nonce_check = true;
    dry_run(state, cfg, block, transaction)
}
