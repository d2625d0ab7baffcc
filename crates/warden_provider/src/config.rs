use alloy_primitives::B256;
use warden_evm::SpecId;
use warden_rpc_client::RpcClientConfig;

/// How far back from the trusted head an explicit block number may reach.
pub const DEFAULT_MAX_BLOCK_HISTORY: u64 = 256;

/// How far beyond the trusted head an explicit block number may reach before
/// it is rejected instead of awaited.
pub const DEFAULT_MAX_BLOCK_FUTURE: u64 = 3;

/// Configuration of a [`Provider`](crate::Provider).
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// URL of the untrusted upstream JSON-RPC endpoint
    pub rpc_url: String,
    /// Number of the initial trusted block
    pub trusted_block_number: u64,
    /// Hash of the initial trusted block
    pub trusted_block_hash: B256,
    /// The chain id served by `eth_chainId`
    pub chain_id: u64,
    /// The network id served by `net_version`; defaults to the chain id
    pub network_id: Option<u64>,
    /// The hardfork rules applied to local execution
    pub hardfork: SpecId,
    /// Accepted range below the trusted head for explicit block numbers
    pub max_block_history: u64,
    /// Accepted range above the trusted head for explicit block numbers
    pub max_block_future: u64,
    /// Upstream client configuration
    pub rpc: RpcClientConfig,
}

impl ProviderConfig {
    /// Creates a configuration for Ethereum mainnet with default policy
    /// bounds, anchored at the given trusted block.
    pub fn new(rpc_url: String, trusted_block_number: u64, trusted_block_hash: B256) -> Self {
        Self {
            rpc_url,
            trusted_block_number,
            trusted_block_hash,
            chain_id: 1,
            network_id: None,
            hardfork: SpecId::CANCUN,
            max_block_history: DEFAULT_MAX_BLOCK_HISTORY,
            max_block_future: DEFAULT_MAX_BLOCK_FUTURE,
            rpc: RpcClientConfig::default(),
        }
    }

    /// The network id served by `net_version`.
    pub fn network_id(&self) -> u64 {
        self.network_id.unwrap_or(self.chain_id)
    }
}
