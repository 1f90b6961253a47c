//! Error types for the walletframe SDK.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use walletframe::{Result, Sdk};
//!
//! async fn example(sdk: &Sdk) -> Result<()> {
//!     let token = sdk.user().get_id_token(None).await?;
//!     println!("{token}");
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::MissingApiKey`], [`Error::Config`], [`Error::NamespaceCollision`] |
//! | Relayer | [`Error::Rpc`] |
//! | Transport | [`Error::Transport`], [`Error::TransportClosed`] |
//! | Serialization | [`Error::Json`] |
//!
//! Configuration errors are raised synchronously at SDK construction and
//! are fatal. Every post-construction failure is delivered through the
//! rejection path of the operation's [`PromiEvent`](crate::PromiEvent),
//! never thrown into an unrelated call stack.
//!
//! # Cloneability
//!
//! [`Error`] is `Clone`: a settled rejection is observable from every
//! wrapper chained off the same operation, so the error value must be
//! duplicable. Source errors from external crates are captured as
//! messages rather than held by `#[from]`.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// No API key was provided at construction.
    #[error(
        "Missing API key: please provide an API key that you acquired from the developer dashboard"
    )]
    MissingApiKey,

    /// Configuration error.
    ///
    /// Returned when SDK configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Module namespace collision.
    ///
    /// Returned when an extension's namespace key clashes with a reserved
    /// built-in module or with another extension.
    #[error("Namespace collision: '{key}' is already registered")]
    NamespaceCollision {
        /// The contested namespace key.
        key: String,
    },

    // ========================================================================
    // Relayer Errors
    // ========================================================================
    /// Failure reported by the relayer in a final response.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// Numeric JSON-RPC error code.
        code: i64,
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<Value>,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Transport failed to hand a message to the controller.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// Transport is closed; no further messages can be exchanged.
    #[error("Transport closed")]
    TransportClosed,

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON (de)serialization error.
    #[error("JSON error: {message}")]
    Json {
        /// Description of the serialization failure.
        message: String,
    },
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a namespace collision error.
    #[inline]
    pub fn namespace_collision(key: impl Into<String>) -> Self {
        Self::NamespaceCollision { key: key.into() }
    }

    /// Creates an RPC error.
    #[inline]
    pub fn rpc(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
            data,
        }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a JSON error.
    #[inline]
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error was reported by the relayer.
    #[inline]
    #[must_use]
    pub fn is_rpc(&self) -> bool {
        matches!(self, Self::Rpc { .. })
    }

    /// Returns `true` if this is a construction-time configuration error.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey | Self::Config { .. } | Self::NamespaceCollision { .. }
        )
    }

    /// Returns `true` if this is a transport error.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::TransportClosed)
    }

    /// Returns the RPC error code, if any.
    #[inline]
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
