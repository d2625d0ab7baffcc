use alloy_primitives::{Bloom, Log};
use alloy_rlp::{BufMut, RlpEncodable};

/// The outcome of an executed transaction, as committed to the receipt trie.
///
/// Typed (EIP-2718) receipts are stored in the trie as the transaction type
/// byte followed by the RLP payload; legacy receipts are the bare RLP list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionReceipt {
    /// Whether the transaction succeeded (EIP-658 status)
    pub status: bool,
    /// Cumulative gas used in the block up to and including this transaction
    pub cumulative_gas_used: u64,
    /// Bloom filter of the receipt's logs
    pub logs_bloom: Bloom,
    /// The logs emitted by the transaction
    pub logs: Vec<Log>,
    /// The transaction's EIP-2718 type; `0` for legacy transactions
    pub transaction_type: u8,
}

#[derive(RlpEncodable)]
struct Encodable<'receipt> {
    status: bool,
    cumulative_gas_used: u64,
    logs_bloom: &'receipt Bloom,
    logs: &'receipt Vec<Log>,
}

impl<'receipt> From<&'receipt ExecutionReceipt> for Encodable<'receipt> {
    fn from(receipt: &'receipt ExecutionReceipt) -> Self {
        Self {
            status: receipt.status,
            cumulative_gas_used: receipt.cumulative_gas_used,
            logs_bloom: &receipt.logs_bloom,
            logs: &receipt.logs,
        }
    }
}

impl ExecutionReceipt {
    /// Returns the receipt's trie value: the EIP-2718 envelope for typed
    /// receipts, the bare RLP list for legacy ones.
    pub fn encoded(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_length());
        if self.transaction_type != 0 {
            out.put_u8(self.transaction_type);
        }
        alloy_rlp::Encodable::encode(&Encodable::from(self), &mut out);
        out
    }

    fn encoded_length(&self) -> usize {
        let payload = alloy_rlp::Encodable::length(&Encodable::from(self));
        if self.transaction_type != 0 {
            1 + payload
        } else {
            payload
        }
    }
}
