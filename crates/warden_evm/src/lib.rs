#![warn(missing_docs)]

//! EVM execution against state materialized exclusively from verified proofs.

mod runtime;
mod state;

pub use revm::{
    bytecode::Bytecode,
    context::{BlockEnv, CfgEnv, TxEnv},
    context_interface::result::{ExecutionResult, Output, ResultAndState},
    primitives::{hardfork::SpecId, TxKind},
    state::AccountInfo,
};

pub use self::{
    runtime::{block_env_for_header, dry_run, guaranteed_dry_run, EvmError},
    state::{BlockHashSource, StateAccessError, VerifiedState},
};
