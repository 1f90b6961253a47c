//! Wire method names understood by the relayer.
//!
//! Built-in operations use the fixed names below. Extensions send
//! arbitrary method strings through
//! [`ModuleContext::request_raw`](crate::modules::ModuleContext::request_raw).

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Method
// ============================================================================

/// Built-in relayer method names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// Start the magic link login flow.
    #[serde(rename = "magic_auth_login_with_magic_link")]
    LoginWithMagicLink,

    /// Hydrate a session from a one-time credential.
    #[serde(rename = "magic_auth_login_with_credential")]
    LoginWithCredential,

    /// Fetch the current session's identity token.
    #[serde(rename = "magic_auth_get_id_token")]
    GetIdToken,

    /// Mint a fresh identity token, optionally with an attachment.
    #[serde(rename = "magic_auth_generate_id_token")]
    GenerateIdToken,

    /// Fetch metadata about the logged-in user.
    #[serde(rename = "magic_auth_get_metadata")]
    GetMetadata,

    /// Check whether a user session is active.
    #[serde(rename = "magic_auth_is_logged_in")]
    IsLoggedIn,

    /// Terminate the current session.
    #[serde(rename = "magic_auth_logout")]
    Logout,
}

impl Method {
    /// Returns the wire name of this method.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoginWithMagicLink => "magic_auth_login_with_magic_link",
            Self::LoginWithCredential => "magic_auth_login_with_credential",
            Self::GetIdToken => "magic_auth_get_id_token",
            Self::GenerateIdToken => "magic_auth_generate_id_token",
            Self::GetMetadata => "magic_auth_get_metadata",
            Self::IsLoggedIn => "magic_auth_is_logged_in",
            Self::Logout => "magic_auth_logout",
        }
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.as_str().to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
