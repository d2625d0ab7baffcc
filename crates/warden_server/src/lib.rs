//! HTTP JSON-RPC transport and head-follower tasks of the warden proxy.

/// The optional upstream head follower.
pub mod follower;
/// The axum JSON-RPC router.
pub mod server;
