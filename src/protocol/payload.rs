//! Request and response message types.
//!
//! Defines the JSON-RPC-shaped message format exchanged with the
//! embedded controller.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::identifiers::RequestId;

// ============================================================================
// RpcRequest
// ============================================================================

/// An operation request from the host to the embedded controller.
///
/// # Format
///
/// ```json
/// {
///   "id": 1,
///   "method": "magic_auth_login_with_magic_link",
///   "params": [{ "email": "user@example.com", "showUI": true }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Unique identifier for request/response correlation.
    pub id: RequestId,

    /// Wire method name.
    pub method: String,

    /// Ordered positional parameters.
    pub params: Vec<Value>,
}

impl RpcRequest {
    /// Creates a new request.
    #[inline]
    #[must_use]
    pub fn new(id: RequestId, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

// ============================================================================
// RelayerMessage
// ============================================================================

/// A message delivered by the embedded controller.
///
/// # Format
///
/// Final success:
/// ```json
/// { "id": 1, "result": "didtoken" }
/// ```
///
/// Final error:
/// ```json
/// { "id": 1, "error": { "code": -32603, "message": "internal error" } }
/// ```
///
/// Intermediate lifecycle event:
/// ```json
/// { "id": 1, "type": "email-sent" }
/// ```
///
/// A message carrying a `type` is intermediate and leaves the request
/// pending; anything else is final. A final message with an absent or
/// `null` result fulfills with `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayerMessage {
    /// Matches the originating request's `id`.
    pub id: RequestId,

    /// Lifecycle event name (intermediate messages only).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    /// Lifecycle event payload (intermediate messages only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Result value (final success only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error payload (final error only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl RelayerMessage {
    /// Creates a final success message.
    #[inline]
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            id,
            event: None,
            data: None,
            result: Some(result),
            error: None,
        }
    }

    /// Creates a final error message.
    #[inline]
    #[must_use]
    pub fn failure(id: RequestId, error: ErrorPayload) -> Self {
        Self {
            id,
            event: None,
            data: None,
            result: None,
            error: Some(error),
        }
    }

    /// Creates an intermediate lifecycle event message.
    #[inline]
    #[must_use]
    pub fn event(id: RequestId, name: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            id,
            event: Some(name.into()),
            data,
            result: None,
            error: None,
        }
    }

    /// Returns `true` if this message completes its request.
    #[inline]
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.event.is_none()
    }

    /// Classifies the message for routing.
    #[must_use]
    pub fn kind(&self) -> MessageKind<'_> {
        if let Some(name) = self.event.as_deref() {
            MessageKind::Event {
                name,
                data: self.data.as_ref(),
            }
        } else if let Some(error) = &self.error {
            MessageKind::Failure(error)
        } else {
            MessageKind::Success(self.result.clone().unwrap_or(Value::Null))
        }
    }
}

// ============================================================================
// MessageKind
// ============================================================================

/// Routing classification of a [`RelayerMessage`].
#[derive(Debug)]
pub enum MessageKind<'a> {
    /// Non-terminal lifecycle notification; the request stays pending.
    Event {
        /// Event name, emitted verbatim on the request's wrapper.
        name: &'a str,
        /// Optional event payload.
        data: Option<&'a Value>,
    },

    /// Terminal failure.
    Failure(&'a ErrorPayload),

    /// Terminal success. An absent `result` fulfills with `null`.
    Success(Value),
}

// ============================================================================
// ErrorPayload
// ============================================================================

/// Structured error carried by a final error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Numeric JSON-RPC error code.
    pub code: i64,

    /// Human-readable error message.
    pub message: String,

    /// Optional structured error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorPayload {
    /// JSON-RPC parse error code.
    pub const PARSE_ERROR: i64 = -32700;
    /// JSON-RPC invalid request code.
    pub const INVALID_REQUEST: i64 = -32600;
    /// JSON-RPC method not found code.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// JSON-RPC invalid params code.
    pub const INVALID_PARAMS: i64 = -32602;
    /// JSON-RPC internal error code.
    pub const INTERNAL_ERROR: i64 = -32603;

    /// Creates an error payload.
    #[inline]
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured error data.
    #[inline]
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Converts the wire payload into the crate error type.
    #[inline]
    #[must_use]
    pub fn into_error(self) -> Error {
        Error::Rpc {
            code: self.code,
            message: self.message,
            data: self.data,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
