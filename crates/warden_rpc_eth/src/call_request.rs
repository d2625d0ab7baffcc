use alloy_eips::eip2930::AccessListItem;
use alloy_primitives::{Address, Bytes, B256, U256};

/// For specifying input to methods requiring a transaction object, like
/// `eth_call` and `eth_estimateGas`
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// the address from which the transaction should be sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// the address to which the transaction should be sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// gas
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "warden_eth::serde::optional_quantity"
    )]
    pub gas: Option<u64>,
    /// gas price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// max base fee per gas sender is willing to pay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    /// miner tip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
    /// transaction value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// transaction data
    #[serde(alias = "input", skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    /// warm storage access pre-payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_list: Option<Vec<AccessListItem>>,
    /// Blob versioned hashes (EIP-4844)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_hashes: Option<Vec<B256>>,
    /// Blob sidecars (EIP-4844)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blobs: Option<Vec<Bytes>>,
}
