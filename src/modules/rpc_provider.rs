//! Raw JSON-RPC passthrough.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::promise::PromiEvent;

use super::ModuleContext;

// ============================================================================
// RpcProviderModule
// ============================================================================

/// Ethereum-style JSON-RPC passthrough, registered under the
/// `rpcProvider` namespace.
///
/// Forwards arbitrary method/params pairs to the relayer unchanged;
/// useful for wiring the SDK up as a web3 provider.
#[derive(Debug, Clone)]
pub struct RpcProviderModule {
    context: ModuleContext,
}

impl RpcProviderModule {
    pub(crate) fn new(context: ModuleContext) -> Self {
        Self { context }
    }

    /// Forwards a raw JSON-RPC request.
    ///
    /// ```ignore
    /// let balance: Value = sdk
    ///     .rpc_provider()
    ///     .request("eth_getBalance", vec![json!("0xabc"), json!("latest")])
    ///     .await?;
    /// ```
    pub fn request<T>(&self, method: impl Into<String>, params: Vec<Value>) -> PromiEvent<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let method = method.into();
        debug!(method = %method, "forwarding rpc request");
        self.context.request_raw(method, params)
    }
}

// ============================================================================
// Tests
// ============================================================================
