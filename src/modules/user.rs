//! Session and identity operations.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::promise::PromiEvent;
use crate::protocol::Method;

use super::ModuleContext;

// ============================================================================
// Types
// ============================================================================

/// Configuration for [`UserModule::get_id_token`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetIdTokenConfiguration {
    /// Token lifespan in seconds (controller default when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifespan: Option<u64>,
}

/// Configuration for [`UserModule::generate_id_token`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateIdTokenConfiguration {
    /// Opaque value bound into the token signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,

    /// Token lifespan in seconds (controller default when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifespan: Option<u64>,
}

/// Metadata describing the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserMetadata {
    /// Decentralized identifier of the user.
    pub issuer: Option<String>,

    /// Public address of the user's wallet.
    #[serde(rename = "publicAddress")]
    pub public_address: Option<String>,

    /// Email address on the account, if any.
    pub email: Option<String>,
}

// ============================================================================
// UserModule
// ============================================================================

/// Operations on the current user session, registered under the `user`
/// namespace.
#[derive(Debug, Clone)]
pub struct UserModule {
    context: ModuleContext,
}

impl UserModule {
    pub(crate) fn new(context: ModuleContext) -> Self {
        Self { context }
    }

    /// Fetches the current session's identity token.
    pub fn get_id_token(&self, configuration: Option<GetIdTokenConfiguration>) -> PromiEvent<String> {
        debug!("fetching id token");
        match configuration {
            Some(configuration) => self.context.request_with(Method::GetIdToken, &configuration),
            None => self.context.request(Method::GetIdToken, vec![]),
        }
    }

    /// Mints a fresh identity token.
    pub fn generate_id_token(
        &self,
        configuration: Option<GenerateIdTokenConfiguration>,
    ) -> PromiEvent<String> {
        debug!("generating id token");
        match configuration {
            Some(configuration) => self
                .context
                .request_with(Method::GenerateIdToken, &configuration),
            None => self.context.request(Method::GenerateIdToken, vec![]),
        }
    }

    /// Fetches metadata about the logged-in user.
    pub fn get_metadata(&self) -> PromiEvent<UserMetadata> {
        debug!("fetching user metadata");
        self.context.request(Method::GetMetadata, vec![])
    }

    /// Checks whether a user session is active.
    pub fn is_logged_in(&self) -> PromiEvent<bool> {
        self.context.request(Method::IsLoggedIn, vec![])
    }

    /// Terminates the current session.
    ///
    /// Resolves to `true` when a session was actually torn down.
    pub fn logout(&self) -> PromiEvent<bool> {
        debug!("logging out");
        self.context.request(Method::Logout, vec![])
    }
}

// ============================================================================
// Tests
// ============================================================================
