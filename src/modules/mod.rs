//! Operation modules sharing the dispatcher capability.
//!
//! Each module is a named collection of operations. Built-in modules
//! occupy fixed, reserved namespace keys; third-party [`Extension`]s
//! register additional namespaces at SDK construction.
//!
//! Modules are independent types holding a [`ModuleContext`] — the
//! shared request-sending capability — rather than variants of a common
//! base.
//!
//! # Modules
//!
//! | Module | Namespace | Description |
//! |--------|-----------|-------------|
//! | `auth` | `auth` | Login flows |
//! | `user` | `user` | Session and identity operations |
//! | `rpc_provider` | `rpcProvider` | Raw JSON-RPC passthrough |
//! | `extension` | user-chosen | Third-party extension plumbing |

// ============================================================================
// Submodules
// ============================================================================

mod auth;
mod extension;
mod rpc_provider;
mod user;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::{AuthModule, LoginWithMagicLinkConfiguration, LoginWithMagicLinkEvent};
pub use extension::Extension;
pub(crate) use extension::has_meaningful_config;
pub use rpc_provider::RpcProviderModule;
pub use user::{
    GenerateIdTokenConfiguration, GetIdTokenConfiguration, UserMetadata, UserModule,
};

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::promise::PromiEvent;
use crate::protocol::Method;
use crate::rpc::Dispatcher;

// ============================================================================
// Constants
// ============================================================================

/// Namespace keys occupied by built-in modules.
///
/// Extension registration fails fast on a collision with any of these.
pub const RESERVED_NAMESPACES: [&str; 3] = ["auth", "user", "rpcProvider"];

// ============================================================================
// ModuleContext
// ============================================================================

/// Shared request capability injected into every module and extension.
#[derive(Clone)]
pub struct ModuleContext {
    dispatcher: Arc<Dispatcher>,
}

impl ModuleContext {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Sends a built-in operation with positional params.
    pub fn request<T>(&self, method: Method, params: Vec<Value>) -> PromiEvent<T>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        self.dispatcher.send(method.as_str(), params)
    }

    /// Sends a built-in operation whose params are one serialized
    /// configuration object.
    ///
    /// A serialization failure is funneled into the wrapper's rejection
    /// path rather than surfaced synchronously.
    pub fn request_with<T, P>(&self, method: Method, configuration: &P) -> PromiEvent<T>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
        P: Serialize,
    {
        match serde_json::to_value(configuration) {
            Ok(value) => self.dispatcher.send(method.as_str(), vec![value]),
            Err(error) => PromiEvent::rejected(error.into()),
        }
    }

    /// Sends an operation with an arbitrary wire method name.
    ///
    /// This is the entry point for extensions, whose methods are not
    /// part of the built-in [`Method`] set.
    pub fn request_raw<T>(&self, method: impl Into<String>, params: Vec<Value>) -> PromiEvent<T>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        self.dispatcher.send(method, params)
    }

    /// Returns the underlying dispatcher.
    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

impl std::fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext").finish_non_exhaustive()
    }
}
