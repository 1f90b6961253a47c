//! Request/response correlation engine.
//!
//! The [`Dispatcher`] assigns each outgoing request a unique id, tracks
//! it in a pending set, and resolves, rejects, or re-emits events on the
//! matching [`PromiEvent`](crate::PromiEvent) when a correlated message
//! arrives from the transport.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `dispatcher` | Pending set and message routing |

// ============================================================================
// Submodules
// ============================================================================

mod dispatcher;

// ============================================================================
// Re-exports
// ============================================================================

pub use dispatcher::Dispatcher;
