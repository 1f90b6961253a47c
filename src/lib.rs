//! Walletframe - Embedded wallet relayer client SDK.
//!
//! This library lets host applications authenticate users and request
//! wallet operations by delegating to an embedded, sandboxed controller
//! that itself communicates with a remote relayer service.
//!
//! # Architecture
//!
//! The SDK follows a client-controller model:
//!
//! - **Host (Rust)**: builds JSON-RPC-shaped requests, awaits results,
//!   observes lifecycle events
//! - **Embedded controller**: executes operations against the remote
//!   relayer and streams responses back
//!
//! Key design principles:
//!
//! - Every operation returns a [`PromiEvent`]: awaitable as one value,
//!   subscribable as a stream of named lifecycle events
//! - Requests and responses are correlated by id in the [`Dispatcher`];
//!   stale and duplicate responses are discarded, never raised
//! - Modules and extensions are independent types sharing one request
//!   capability ([`ModuleContext`]); namespaces are collision-checked
//!   at construction
//!
//! # Quick Start
//!
//! ```no_run
//! use walletframe::{ChannelTransport, LoginWithMagicLinkConfiguration, Sdk};
//!
//! #[tokio::main]
//! async fn main() -> walletframe::Result<()> {
//!     let (transport, _controller) = ChannelTransport::pair();
//!
//!     let sdk = Sdk::builder()
//!         .api_key("pk_test_123")
//!         .transport(transport)
//!         .build()?;
//!
//!     let login = sdk
//!         .auth()
//!         .login_with_magic_link(LoginWithMagicLinkConfiguration::new("user@example.com"));
//!
//!     login.on("email-sent", |_| println!("check your inbox"));
//!     let token = login.await?;
//!     println!("logged in: {token:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`events`] | Typed event emitter |
//! | [`identifiers`] | Request id newtype and sequence |
//! | [`modules`] | Built-in operation modules and extensions |
//! | [`promise`] | Dual-interface operation results |
//! | [`protocol`] | Wire message types (internal) |
//! | [`rpc`] | Request/response correlation (internal) |
//! | [`sdk`] | SDK construction and composition |
//! | [`transport`] | Controller transport abstraction |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Typed event emitter with synchronous, ordered dispatch.
pub mod events;

/// Type-safe identifiers for request correlation.
pub mod identifiers;

/// Built-in operation modules and extension plumbing.
pub mod modules;

/// Dual-interface operation results: awaitable value + event stream.
pub mod promise;

/// Wire message types exchanged with the embedded controller.
pub mod protocol;

/// Request/response correlation engine.
pub mod rpc;

/// SDK construction and module composition.
pub mod sdk;

/// Transport layer between the SDK and the embedded controller.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Event types
pub use events::{EventEmitter, ListenerHandle};

// Identifier types
pub use identifiers::{IdSequence, RequestId};

// Module types
pub use modules::{
    AuthModule, Extension, GenerateIdTokenConfiguration, GetIdTokenConfiguration,
    LoginWithMagicLinkConfiguration, LoginWithMagicLinkEvent, ModuleContext, RpcProviderModule,
    UserMetadata, UserModule,
};

// Promise types
pub use promise::{Completer, EventArg, PromiEvent};

// Protocol types
pub use protocol::{ConfigEnvelope, ErrorPayload, Method, RelayerMessage, RpcRequest};

// Correlation engine
pub use rpc::Dispatcher;

// SDK types
pub use sdk::{Sdk, SdkBuilder};

// Transport types
pub use transport::{ChannelTransport, ControllerHandle, MessageHandler, Transport};
