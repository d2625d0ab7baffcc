use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, B256, U256};
use warden_eth::{block::BlockHeader, KECCAK_EMPTY};
use warden_evm::{
    block_env_for_header, guaranteed_dry_run, AccountInfo, Bytecode, CfgEnv, ExecutionResult,
    Output, SpecId, TxEnv, TxKind, VerifiedState,
};
use warden_rpc_eth::CallRequest;

use crate::{
    chain::TrustedBlockHashes,
    error::ProviderError,
    provider::ProviderData,
};

/// Executes `eth_call` against state materialized exclusively from verified
/// proofs and returns the raw return bytes.
pub async fn execute_call(
    data: &ProviderData,
    request: CallRequest,
    number: u64,
) -> Result<Bytes, ProviderError> {
    validate_fee_fields(&request)?;
    let (header, state, caller_nonce) = materialize(data, &request, number).await?;

    // `eth_call` runs against a zeroed base fee, mimicking geth.
    let mut header = header;
    header.base_fee_per_gas = header.base_fee_per_gas.map(|_| 0);

    let gas_price = request
        .gas_price
        .or(request.max_priority_fee_per_gas)
        .map_or(Ok(0u128), to_u128)?;

    let transaction = TxEnv {
        caller: request.from.unwrap_or_default(),
        kind: TxKind::Call(call_target(&request)?),
        gas_limit: request.gas.unwrap_or(header.gas_limit),
        gas_price,
        value: request.value.unwrap_or_default(),
        data: request.data.clone().unwrap_or_default(),
        nonce: caller_nonce,
        ..TxEnv::default()
    };

    let spec_id = data.config.hardfork;
    let block = block_env_for_header(&header, spec_id);
    let cfg = evm_config(data, spec_id);

    let result = tokio::task::block_in_place(|| guaranteed_dry_run(state, cfg, block, transaction))?;

    match result.result {
        ExecutionResult::Success { output, .. } => Ok(match output {
            Output::Call(bytes) => bytes,
            Output::Create(bytes, _) => bytes,
        }),
        ExecutionResult::Revert { output, .. } => {
            Err(ProviderError::ExecutionReverted { data: output })
        }
        ExecutionResult::Halt { reason, .. } => Err(ProviderError::ExecutionHalted {
            reason: format!("{reason:?}"),
        }),
    }
}

/// Executes `eth_estimateGas` with relaxed validation and returns the total
/// gas spent.
pub async fn execute_estimate_gas(
    data: &ProviderData,
    request: CallRequest,
    number: u64,
) -> Result<u64, ProviderError> {
    validate_fee_fields(&request)?;
    let (header, state, caller_nonce) = materialize(data, &request, number).await?;

    let base_fee = header.base_fee_per_gas.unwrap_or_default();
    let mut transaction = TxEnv {
        caller: request.from.unwrap_or_default(),
        kind: TxKind::Call(call_target(&request)?),
        gas_limit: request.gas.unwrap_or(header.gas_limit),
        value: request.value.unwrap_or_default(),
        data: request.data.clone().unwrap_or_default(),
        nonce: caller_nonce,
        ..TxEnv::default()
    };

    // EIP-1559 typing: type 2 iff any max-fee field is present, type 1 iff an
    // access list is, legacy otherwise. Absent fee fields default from the
    // header's base fee.
    if request.max_fee_per_gas.is_some() || request.max_priority_fee_per_gas.is_some() {
        let priority = request
            .max_priority_fee_per_gas
            .map_or(Ok(0u128), to_u128)?;
        transaction.tx_type = 2;
        transaction.gas_price = request
            .max_fee_per_gas
            .map_or(Ok(base_fee.saturating_add(priority)), to_u128)?;
        transaction.gas_priority_fee = Some(priority);
    } else {
        transaction.gas_price = request.gas_price.map_or(Ok(base_fee), to_u128)?;
        if request.access_list.is_some() {
            transaction.tx_type = 1;
        }
    }
    if let Some(access_list) = &request.access_list {
        transaction.access_list = AccessList(access_list.clone());
    }

    let spec_id = data.config.hardfork;
    let block = block_env_for_header(&header, spec_id);
    let cfg = evm_config(data, spec_id);

    let result = tokio::task::block_in_place(|| guaranteed_dry_run(state, cfg, block, transaction))?;

    match result.result {
        ExecutionResult::Success { gas_used, .. } => Ok(gas_used),
        ExecutionResult::Revert { output, .. } => {
            Err(ProviderError::ExecutionReverted { data: output })
        }
        ExecutionResult::Halt { reason, .. } => Err(ProviderError::ExecutionHalted {
            reason: format!("{reason:?}"),
        }),
    }
}

/// Resolves the verified header and builds the per-call EVM state from the
/// upstream's access list, verifying every account, storage slot and code
/// blob against the header's state root on the way in.
async fn materialize(
    data: &ProviderData,
    request: &CallRequest,
    number: u64,
) -> Result<(BlockHeader, VerifiedState<TrustedBlockHashes>, u64), ProviderError> {
    let chain = data.chain();
    let header = chain.verified_header_at(number).await?;

    let access_list = data
        .client
        .create_access_list(
            request.clone(),
            warden_eth::block_spec::BlockSpec::Number(number),
        )
        .await?;
    if let Some(error) = access_list.error {
        return Err(ProviderError::AccessList(error));
    }

    let mut accounts: Vec<(Address, Vec<B256>)> = access_list
        .access_list
        .0
        .into_iter()
        .map(|item| (item.address, item.storage_keys))
        .collect();

    // The sender and the target are always touched, whether or not the
    // upstream lists them.
    let from = request.from.unwrap_or_default();
    let to = call_target(request)?;
    for address in [from, to] {
        if !accounts.iter().any(|(listed, _)| *listed == address) {
            accounts.push((address, Vec::new()));
        }
    }

    let fetched = data.client.proofs_and_code(&accounts, number).await?;

    let mut state = VerifiedState::new(TrustedBlockHashes::new(
        chain.clone(),
        data.runtime.clone(),
    ));
    let mut caller_nonce = 0;

    for ((address, storage_keys), (proof, code)) in accounts.iter().zip(fetched) {
        warden_proof::verify_account_and_storage(header.state_root, *address, storage_keys, &proof)?;
        if !warden_proof::verify_code(&code, proof.code_hash) {
            return Err(ProviderError::CodeHashMismatch { address: *address });
        }

        if *address == from {
            caller_nonce = proof.nonce;
        }

        let code_hash = if proof.code_hash.is_zero() {
            KECCAK_EMPTY
        } else {
            proof.code_hash
        };
        state.insert_account(
            *address,
            AccountInfo {
                balance: proof.balance,
                nonce: proof.nonce,
                code_hash,
                code: Some(Bytecode::new_raw(code)),
            },
        );

        for key in storage_keys {
            let value = proof
                .storage_proof
                .iter()
                .find(|entry| entry.key.as_b256() == *key)
                .map(|entry| entry.value)
                .unwrap_or_default();
            state
                .insert_storage(*address, *key, B256::from(value))
                .map_err(warden_evm::EvmError::from)?;
        }
    }

    Ok((header, state, caller_nonce))
}

fn evm_config(data: &ProviderData, spec_id: SpecId) -> CfgEnv {
    let mut cfg = CfgEnv::new_with_spec(spec_id);
    cfg.chain_id = data.config.chain_id;
    cfg
}

fn call_target(request: &CallRequest) -> Result<Address, ProviderError> {
    request.to.ok_or(ProviderError::InvalidTransactionInput(
        "missing 'to' address; contract creation cannot run against proven state",
    ))
}

fn to_u128(value: U256) -> Result<u128, ProviderError> {
    u128::try_from(value)
        .map_err(|_| ProviderError::InvalidTransactionInput("fee value exceeds 128 bits"))
}

fn validate_fee_fields(request: &CallRequest) -> Result<(), ProviderError> {
    if request.gas_price.is_some() && request.max_fee_per_gas.is_some() {
        return Err(ProviderError::InvalidTransactionInput(
            "gasPrice and maxFeePerGas are mutually exclusive",
        ));
    }
    if request.gas_price.is_some() && request.max_priority_fee_per_gas.is_some() {
        return Err(ProviderError::InvalidTransactionInput(
            "gasPrice and maxPriorityFeePerGas are mutually exclusive",
        ));
    }
    if let (Some(priority), Some(max_fee)) =
        (request.max_priority_fee_per_gas, request.max_fee_per_gas)
    {
        if priority > max_fee {
            return Err(ProviderError::InvalidTransactionInput(
                "maxPriorityFeePerGas is greater than maxFeePerGas",
            ));
        }
    }
    if request.blobs.is_some() || request.blob_hashes.is_some() {
        return Err(ProviderError::InvalidTransactionInput(
            "blob transactions cannot be executed against proven state",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contradictory_fee_fields_are_rejected() {
        let request = CallRequest {
            gas_price: Some(U256::from(1u64)),
            max_fee_per_gas: Some(U256::from(1u64)),
            ..CallRequest::default()
        };
        assert!(matches!(
            validate_fee_fields(&request),
            Err(ProviderError::InvalidTransactionInput(_))
        ));

        let request = CallRequest {
            max_priority_fee_per_gas: Some(U256::from(2u64)),
            max_fee_per_gas: Some(U256::from(1u64)),
            ..CallRequest::default()
        };
        assert!(validate_fee_fields(&request).is_err());

        let request = CallRequest {
            max_priority_fee_per_gas: Some(U256::from(1u64)),
            max_fee_per_gas: Some(U256::from(2u64)),
            ..CallRequest::default()
        };
        assert!(validate_fee_fields(&request).is_ok());
    }

    #[test]
    fn missing_target_is_invalid_params() {
        assert!(matches!(
            call_target(&CallRequest::default()),
            Err(ProviderError::InvalidTransactionInput(_))
        ));
    }
}
