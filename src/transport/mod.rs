//! Transport layer between the SDK and the embedded controller.
//!
//! The dispatcher depends only on the [`Transport`] capability: deliver
//! the initialization envelope, post serialized requests, and surface
//! the controller's message stream through a subscribed handler. The
//! concrete channel — iframe `postMessage`, a native webview bridge —
//! is provided by the embedding environment.
//!
//! [`ChannelTransport`] is the in-process realization used by native
//! embeddings and tests.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | In-process duplex transport |

// ============================================================================
// Submodules
// ============================================================================

mod channel;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{ChannelTransport, ControllerHandle};

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::error::Result;
use crate::protocol::{ConfigEnvelope, RelayerMessage, RpcRequest};

// ============================================================================
// Types
// ============================================================================

/// Callback invoked for each message delivered by the controller.
///
/// Held behind `Arc` so delivery never runs under the registration lock.
pub type MessageHandler = Arc<dyn Fn(RelayerMessage) + Send + Sync>;

// ============================================================================
// Transport
// ============================================================================

/// Capability of exchanging messages with the embedded controller.
pub trait Transport: Send + Sync + 'static {
    /// Delivers the initialization envelope for relay to the remote
    /// service.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope cannot be handed to the
    /// controller.
    fn initialize(&self, envelope: &ConfigEnvelope) -> Result<()>;

    /// Posts a serialized request to the embedded controller.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying channel is closed or the
    /// message cannot be handed off.
    fn post(&self, request: RpcRequest) -> Result<()>;

    /// Registers the handler invoked for each inbound message.
    ///
    /// A transport carries at most one handler; registering again
    /// replaces the previous one. Messages delivered while no handler
    /// is registered are dropped.
    fn subscribe(&self, handler: MessageHandler);
}
