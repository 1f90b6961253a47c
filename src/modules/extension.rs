//! Third-party extension plumbing.
//!
//! Extensions plug additional namespaces into an SDK instance. Each one
//! declares a name, optionally a configuration relayed at
//! initialization, and receives the shared [`ModuleContext`] when the
//! SDK is built.
//!
//! # Example
//!
//! ```ignore
//! struct OAuthExtension {
//!     context: Option<ModuleContext>,
//! }
//!
//! impl Extension for OAuthExtension {
//!     fn name(&self) -> &str {
//!         "oauth"
//!     }
//!
//!     fn config(&self) -> Value {
//!         json!({ "redirectUri": "https://example.com/callback" })
//!     }
//!
//!     fn attach(&mut self, context: ModuleContext) {
//!         self.context = Some(context);
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let sdk = Sdk::builder()
//!     .api_key("pk_test")
//!     .transport(transport)
//!     .extension(Box::new(OAuthExtension { context: None }))
//!     .build()?;
//!
//! let oauth = sdk.extension_as::<OAuthExtension>("oauth").unwrap();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;

use serde_json::Value;

use super::ModuleContext;

// ============================================================================
// Extension
// ============================================================================

/// A pluggable module registered under a caller-chosen or self-declared
/// namespace.
pub trait Extension: Any + Send + Sync {
    /// Declared namespace of the extension.
    ///
    /// Used as the registry key when none is given explicitly, and as
    /// the key under `ext` in the configuration envelope.
    fn name(&self) -> &str;

    /// Configuration relayed to the remote service at initialization.
    ///
    /// `Null` or an empty object contributes nothing to the envelope.
    fn config(&self) -> Value {
        Value::Null
    }

    /// Receives the shared request capability at SDK construction.
    fn attach(&mut self, _context: ModuleContext) {}

    /// Upcast for typed retrieval via
    /// [`Sdk::extension_as`](crate::Sdk::extension_as).
    fn as_any(&self) -> &dyn Any;
}

// ============================================================================
// Helpers
// ============================================================================

/// Returns `true` when an extension configuration should be relayed.
///
/// Empty objects are treated like `Null`: the envelope never carries an
/// `{}` entry.
pub(crate) fn has_meaningful_config(config: &Value) -> bool {
    match config {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

// ============================================================================
// Tests
// ============================================================================
