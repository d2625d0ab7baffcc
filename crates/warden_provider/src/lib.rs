#![warn(missing_docs)]

//! The verifying Ethereum JSON-RPC provider.
//!
//! The provider accepts standard Ethereum JSON-RPC requests, forwards the
//! data fetching to an untrusted upstream node, and returns only responses it
//! has cryptographically verified against a small set of trusted block
//! hashes supplied out-of-band.

mod call;
/// Header and block verification against the trusted-head store.
pub mod chain;
/// Provider configuration.
pub mod config;
/// The provider's error surface.
pub mod error;
/// The trusted-head store.
pub mod head;
/// Log verification.
pub mod logs;
/// The JSON-RPC request surface.
pub mod requests;

mod provider;
mod state;

pub use self::{
    chain::{ChainVerifier, VerifiedBlock},
    config::ProviderConfig,
    error::{CreationError, ProviderError},
    head::TrustedHeadStore,
    provider::Provider,
    requests::MethodInvocation,
};
