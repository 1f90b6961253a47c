//! Wire message types exchanged with the embedded controller.
//!
//! This module defines the message format for communication between the
//! host application (Rust) and the embedded controller relaying to the
//! remote service.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`RpcRequest`] | Host → Controller | Operation request |
//! | [`RelayerMessage`] (final) | Controller → Host | Operation result or error |
//! | [`RelayerMessage`] (intermediate) | Controller → Host | Lifecycle event |
//! | [`ConfigEnvelope`] | Host → Controller | Initialization configuration |
//!
//! Requests and responses are correlated by
//! [`RequestId`](crate::identifiers::RequestId). A response
//! carrying a `type` field is an intermediate lifecycle event and does
//! not complete the request; a response carrying `result` or `error`
//! is final.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `envelope` | Initialization configuration envelope |
//! | `method` | Wire method names |
//! | `payload` | Request and response types |

// ============================================================================
// Submodules
// ============================================================================

/// Initialization configuration envelope.
pub mod envelope;

/// Wire method names understood by the relayer.
pub mod method;

/// Request and response message types.
pub mod payload;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::ConfigEnvelope;
pub use method::Method;
pub use payload::{ErrorPayload, MessageKind, RelayerMessage, RpcRequest};
