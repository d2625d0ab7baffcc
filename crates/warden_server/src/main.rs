//! HTTP JSON-RPC front-end of the warden verifying proxy.

use std::{collections::HashSet, net::SocketAddr, time::Duration};

use alloy_primitives::B256;
use clap::Parser;
use tokio::runtime;
use tracing_subscriber::EnvFilter;
use warden_evm::SpecId;
use warden_provider::{Provider, ProviderConfig};
use warden_rpc_client::RpcClientConfig;
use warden_server::{follower, server};

#[derive(Debug, Parser)]
#[command(name = "warden", about = "Verifying Ethereum JSON-RPC proxy")]
struct Args {
    /// URL of the untrusted upstream JSON-RPC endpoint
    #[arg(long, env = "WARDEN_UPSTREAM_URL")]
    upstream_url: String,

    /// Number of the initial trusted block
    #[arg(long, env = "WARDEN_TRUSTED_BLOCK_NUMBER")]
    trusted_block_number: u64,

    /// Hash of the initial trusted block
    #[arg(long, env = "WARDEN_TRUSTED_BLOCK_HASH")]
    trusted_block_hash: B256,

    /// Address to serve JSON-RPC on
    #[arg(long, default_value = "127.0.0.1:8546", env = "WARDEN_LISTEN")]
    listen: SocketAddr,

    /// Chain id served by `eth_chainId`
    #[arg(long, default_value_t = 1)]
    chain_id: u64,

    /// Network id served by `net_version`; defaults to the chain id
    #[arg(long)]
    network_id: Option<u64>,

    /// Hardfork rules applied to local execution
    #[arg(long, default_value = "cancun", value_parser = parse_hardfork)]
    hardfork: SpecId,

    /// Poll the upstream's head and trust its announcements. This extends
    /// the trust root to the upstream; leave off when an external head
    /// follower feeds in trusted hashes instead.
    #[arg(long)]
    follow_upstream: bool,

    /// Poll interval of the head follower, in seconds
    #[arg(long, default_value_t = 12)]
    follow_interval: u64,

    /// Treat the upstream as incapable of JSON-RPC batch requests
    #[arg(long)]
    no_batching: bool,

    /// Upstream methods to fail synchronously without network traffic;
    /// can be passed multiple times
    #[arg(long = "deny-method")]
    deny_methods: Vec<String>,
}

fn parse_hardfork(raw: &str) -> Result<SpecId, String> {
    match raw.to_lowercase().as_str() {
        "merge" | "paris" => Ok(SpecId::MERGE),
        "shanghai" => Ok(SpecId::SHANGHAI),
        "cancun" => Ok(SpecId::CANCUN),
        "prague" => Ok(SpecId::PRAGUE),
        _ => Err(format!("unsupported hardfork: '{raw}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = ProviderConfig {
        chain_id: args.chain_id,
        network_id: args.network_id,
        hardfork: args.hardfork,
        rpc: RpcClientConfig {
            supports_batching: !args.no_batching,
            unsupported_methods: args.deny_methods.iter().cloned().collect::<HashSet<_>>(),
            ..RpcClientConfig::default()
        },
        ..ProviderConfig::new(
            args.upstream_url,
            args.trusted_block_number,
            args.trusted_block_hash,
        )
    };

    let provider = Provider::new(runtime::Handle::current(), config)?;

    if args.follow_upstream {
        tracing::info!(
            interval_secs = args.follow_interval,
            "following the upstream's chain head"
        );
        tokio::spawn(follower::follow_upstream(
            provider.clone(),
            Duration::from_secs(args.follow_interval),
        ));
    }

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    tracing::info!(listen = %args.listen, "serving JSON-RPC");
    axum::serve(listener, server::router(provider)).await?;

    Ok(())
}
