use alloy_primitives::{Address, Bytes};
use alloy_rpc_types_eth::EIP1186AccountProofResponse;

use crate::{error::ProviderError, provider::ProviderData};

/// Fetches and verifies the account record of `address` at the given block
/// height. Every scalar the provider returns about an account comes from
/// such a verified proof, never from a bare upstream response.
pub async fn verified_account(
    data: &ProviderData,
    address: Address,
    number: u64,
) -> Result<EIP1186AccountProofResponse, ProviderError> {
    let header = data.chain().verified_header_at(number).await?;

    let proof = data.client.proof(address, Vec::new(), number).await?;
    warden_proof::verify_account_and_storage(header.state_root, address, &[], &proof)?;

    Ok(proof)
}

/// Fetches the account's code at the given block height and verifies it
/// against the code hash of the verified account record.
pub async fn verified_code(
    data: &ProviderData,
    address: Address,
    number: u64,
) -> Result<Bytes, ProviderError> {
    let header = data.chain().verified_header_at(number).await?;

    let mut fetched = data
        .client
        .proofs_and_code(&[(address, Vec::new())], number)
        .await?;
    let (proof, code) = fetched.pop().ok_or(ProviderError::MissingBlock { number })?;

    warden_proof::verify_account_and_storage(header.state_root, address, &[], &proof)?;
    if !warden_proof::verify_code(&code, proof.code_hash) {
        return Err(ProviderError::CodeHashMismatch { address });
    }

    Ok(code)
}
