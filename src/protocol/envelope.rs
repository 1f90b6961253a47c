//! Initialization configuration envelope.
//!
//! At SDK construction, a JSON-serializable envelope is delivered to the
//! transport for relay to the remote service. Its shape is part of the
//! SDK's contract with its environment; the physical encoding on any
//! particular channel (query parameters, bridge init message) belongs to
//! the transport.

// ============================================================================
// Imports
// ============================================================================

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

// ============================================================================
// ConfigEnvelope
// ============================================================================

/// Configuration relayed to the remote service at initialization.
///
/// # Format
///
/// ```json
/// {
///   "API_KEY": "pk_live_...",
///   "host": "relay.walletframe.dev",
///   "sdk": "walletframe",
///   "version": "0.1.0",
///   "ETH_NETWORK": "mainnet",
///   "ext": { "demo": { "hello": "world" } }
/// }
/// ```
///
/// `ETH_NETWORK` is present only when a network was configured. `ext`
/// is present only when at least one extension declared a non-empty
/// configuration; an extension with an empty or absent configuration
/// contributes nothing (never an empty `{}` entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEnvelope {
    /// Publishable API key identifying the integrating application.
    #[serde(rename = "API_KEY")]
    pub api_key: String,

    /// Host of the configured relayer endpoint.
    pub host: String,

    /// SDK package name.
    pub sdk: String,

    /// SDK package version.
    pub version: String,

    /// Selected network, if any.
    #[serde(
        rename = "ETH_NETWORK",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub network: Option<String>,

    /// Per-extension configuration, keyed by extension name.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub ext: Map<String, Value>,
}

impl ConfigEnvelope {
    /// Encodes the envelope as base64-wrapped JSON.
    ///
    /// This is the form transports embed into a URL or an init message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(BASE64.encode(json))
    }
}

// ============================================================================
// Tests
// ============================================================================
