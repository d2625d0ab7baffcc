use alloy_primitives::{Address, Bloom, B256, U64};
use alloy_rpc_types_eth::Log;
use warden_eth::receipt::ExecutionReceipt;

/// receipt object returned by `eth_getTransactionReceipt` and
/// `eth_getBlockReceipts`
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// hash of the transaction
    pub transaction_hash: B256,
    /// index of the transaction within the block
    #[serde(with = "warden_eth::serde::quantity")]
    pub transaction_index: u64,
    /// hash of the block containing the transaction. None when pending.
    pub block_hash: Option<B256>,
    /// number of the block containing the transaction. None when pending.
    #[serde(default, with = "warden_eth::serde::optional_quantity")]
    pub block_number: Option<u64>,
    /// sender address
    pub from: Address,
    /// receiver address, None for contract creation
    #[serde(default)]
    pub to: Option<Address>,
    /// gas used by this transaction
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "warden_eth::serde::optional_quantity"
    )]
    pub gas_used: Option<u64>,
    /// cumulative gas used in the block up to and including this transaction
    #[serde(with = "warden_eth::serde::quantity")]
    pub cumulative_gas_used: u64,
    /// address of the created contract, if any
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// the logs emitted by the transaction
    pub logs: Vec<Log>,
    /// bloom filter of the emitted logs
    pub logs_bloom: Bloom,
    /// EIP-658 status; None on pre-Byzantium receipts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<U64>,
    /// pre-Byzantium state root; None on post-Byzantium receipts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<B256>,
    /// the transaction's EIP-2718 type
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none",
        with = "warden_eth::serde::optional_quantity"
    )]
    pub transaction_type: Option<u64>,
    /// the actual per-gas price paid
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "warden_eth::serde::optional_quantity"
    )]
    pub effective_gas_price: Option<u64>,
}

/// Error that occurs when an RPC receipt cannot be converted into its
/// consensus form.
#[derive(Debug, thiserror::Error)]
pub enum ReceiptConversionError {
    /// The receipt carries neither a status nor a state root.
    #[error("receipt {0} carries no status field")]
    MissingStatus(B256),
    /// Pre-Byzantium state-root receipts are outside the supported history
    /// window.
    #[error("pre-Byzantium receipt {0} is not supported")]
    PreByzantium(B256),
    /// The transaction type does not fit the EIP-2718 type byte.
    #[error("invalid transaction type {0}")]
    InvalidType(u64),
}

impl TransactionReceipt {
    /// Converts the RPC receipt into the consensus receipt committed to the
    /// block's receipt trie.
    pub fn to_execution_receipt(&self) -> Result<ExecutionReceipt, ReceiptConversionError> {
        let status = match (self.status, self.root) {
            (Some(status), _) => status == U64::from(1),
            (None, Some(_)) => {
                return Err(ReceiptConversionError::PreByzantium(self.transaction_hash))
            }
            (None, None) => {
                return Err(ReceiptConversionError::MissingStatus(self.transaction_hash))
            }
        };

        let transaction_type = self.transaction_type.unwrap_or(0);
        let transaction_type = u8::try_from(transaction_type)
            .map_err(|_| ReceiptConversionError::InvalidType(transaction_type))?;

        Ok(ExecutionReceipt {
            status,
            cumulative_gas_used: self.cumulative_gas_used,
            logs_bloom: self.logs_bloom,
            logs: self.logs.iter().map(|log| log.inner.clone()).collect(),
            transaction_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt_json(extra: &str) -> String {
        format!(
            r#"{{
                "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
                "transactionIndex": "0x0",
                "blockHash": "0x2222222222222222222222222222222222222222222222222222222222222222",
                "blockNumber": "0xf297c5",
                "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "cumulativeGasUsed": "0x5208",
                "gasUsed": "0x5208",
                "logs": [],
                "logsBloom": "0x{}"{extra}
            }}"#,
            "00".repeat(256),
        )
    }

    #[test]
    fn status_receipt_converts() -> anyhow::Result<()> {
        let receipt: TransactionReceipt =
            serde_json::from_str(&receipt_json(r#", "status": "0x1", "type": "0x2""#))?;

        let execution = receipt.to_execution_receipt()?;
        assert!(execution.status);
        assert_eq!(execution.transaction_type, 2);
        assert_eq!(execution.cumulative_gas_used, 0x5208);
        Ok(())
    }

    #[test]
    fn pre_byzantium_receipt_is_rejected() -> anyhow::Result<()> {
        let receipt: TransactionReceipt = serde_json::from_str(&receipt_json(
            r#", "root": "0x3333333333333333333333333333333333333333333333333333333333333333""#,
        ))?;

        assert!(matches!(
            receipt.to_execution_receipt(),
            Err(ReceiptConversionError::PreByzantium(_))
        ));
        Ok(())
    }
}
