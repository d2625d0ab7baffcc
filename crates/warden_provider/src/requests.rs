/// The JSON-RPC methods served by the provider.
pub mod methods;

pub use methods::MethodInvocation;
