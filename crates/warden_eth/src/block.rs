use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, B64, U256};
use alloy_rlp::{BufMut, Encodable as _};

/// ethereum block header
#[derive(Clone, Debug, Default, PartialEq, Eq, alloy_rlp::RlpDecodable, alloy_rlp::RlpEncodable)]
#[rlp(trailing)]
pub struct BlockHeader {
    /// The parent block's hash
    pub parent_hash: B256,
    /// The ommers' root hash
    pub ommers_hash: B256,
    /// The block's beneficiary address
    pub beneficiary: Address,
    /// The state's root hash
    pub state_root: B256,
    /// The transactions' root hash
    pub transactions_root: B256,
    /// The receipts' root hash
    pub receipts_root: B256,
    /// The logs' bloom
    pub logs_bloom: Bloom,
    /// The block's difficulty
    pub difficulty: U256,
    /// The block's number
    pub number: u64,
    /// The block's gas limit
    pub gas_limit: u64,
    /// The amount of gas used by the block
    pub gas_used: u64,
    /// The block's timestamp
    pub timestamp: u64,
    /// The block's extra data
    pub extra_data: Bytes,
    /// The block's mix hash
    pub mix_hash: B256,
    /// The block's nonce
    pub nonce: B64,
    /// `BaseFee` was added by EIP-1559 and is ignored in legacy headers.
    pub base_fee_per_gas: Option<u128>,
    /// `WithdrawalsHash` was added by EIP-4895 and is ignored in legacy
    /// headers.
    pub withdrawals_root: Option<B256>,
    /// Blob gas was added by EIP-4844 and is ignored in older headers.
    pub blob_gas: Option<BlobGas>,
    /// The hash tree root of the parent beacon block for the given execution
    /// block (EIP-4788).
    pub parent_beacon_block_root: Option<B256>,
    /// The commitment hash calculated for a list of [EIP-7685] data requests.
    ///
    /// [EIP-7685]: https://eips.ethereum.org/EIPS/eip-7685
    pub requests_hash: Option<B256>,
}

impl BlockHeader {
    /// Calculates the block's hash.
    pub fn hash(&self) -> B256 {
        let encoded = alloy_rlp::encode(self);
        keccak256(encoded)
    }
}

/// Blob gas information added to headers by EIP-4844.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlobGas {
    /// The total amount of blob gas consumed by the transactions within the
    /// block.
    pub gas_used: u64,
    /// A running total of blob gas consumed in excess of the target, prior to
    /// the block. Blocks with above-target blob gas consumption increase this
    /// value, blocks with below-target blob gas consumption decrease it
    /// (bounded at 0).
    pub excess_gas: u64,
}

// The two fields are consecutive header fields, not a nested list, so the
// encoding cannot be derived.
impl alloy_rlp::Encodable for BlobGas {
    fn encode(&self, out: &mut dyn BufMut) {
        self.gas_used.encode(out);
        self.excess_gas.encode(out);
    }

    fn length(&self) -> usize {
        self.gas_used.length() + self.excess_gas.length()
    }
}

impl alloy_rlp::Decodable for BlobGas {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(Self {
            gas_used: <u64 as alloy_rlp::Decodable>::decode(buf)?,
            excess_gas: <u64 as alloy_rlp::Decodable>::decode(buf)?,
        })
    }
}
