//! Authentication flows.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::promise::PromiEvent;
use crate::protocol::Method;

use super::ModuleContext;

// ============================================================================
// Types
// ============================================================================

/// Configuration for [`AuthModule::login_with_magic_link`].
#[derive(Debug, Clone, Serialize)]
pub struct LoginWithMagicLinkConfiguration {
    /// Email address receiving the magic link.
    pub email: String,

    /// Whether the controller should show its pending-login UI.
    #[serde(rename = "showUI")]
    pub show_ui: bool,
}

impl LoginWithMagicLinkConfiguration {
    /// Creates a configuration with the controller UI shown.
    #[inline]
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            show_ui: true,
        }
    }

    /// Hides the controller's pending-login UI.
    #[inline]
    #[must_use]
    pub fn hidden_ui(mut self) -> Self {
        self.show_ui = false;
        self
    }
}

/// Lifecycle events emitted while a magic link login is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginWithMagicLinkEvent {
    /// The login email was handed to the mail provider.
    EmailSent,
    /// The mail provider could not deliver the login email.
    EmailNotDeliverable,
    /// The user asked to retry from the controller UI.
    Retry,
}

impl LoginWithMagicLinkEvent {
    /// Returns the wire event name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailSent => "email-sent",
            Self::EmailNotDeliverable => "email-not-deliverable",
            Self::Retry => "retry",
        }
    }
}

impl AsRef<str> for LoginWithMagicLinkEvent {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// ============================================================================
// AuthModule
// ============================================================================

/// Login operations, registered under the `auth` namespace.
#[derive(Debug, Clone)]
pub struct AuthModule {
    context: ModuleContext,
}

impl AuthModule {
    pub(crate) fn new(context: ModuleContext) -> Self {
        Self { context }
    }

    /// Initiates the magic link login flow.
    ///
    /// Resolves to a decentralized id token once the user completes the
    /// flow, or `None` when the controller declines to issue one. While
    /// pending, the wrapper emits [`LoginWithMagicLinkEvent`]s.
    ///
    /// ```ignore
    /// let login = sdk
    ///     .auth()
    ///     .login_with_magic_link(LoginWithMagicLinkConfiguration::new("user@example.com"));
    ///
    /// login.on(LoginWithMagicLinkEvent::EmailSent, |_| {
    ///     println!("check your inbox");
    /// });
    ///
    /// let token = login.await?;
    /// ```
    pub fn login_with_magic_link(
        &self,
        configuration: LoginWithMagicLinkConfiguration,
    ) -> PromiEvent<Option<String>> {
        debug!(email = %configuration.email, "starting magic link login");
        self.context
            .request_with(Method::LoginWithMagicLink, &configuration)
    }

    /// Hydrates a session from a one-time credential.
    ///
    /// Resolves to a decentralized id token, or `None` when the
    /// credential was not accepted.
    pub fn login_with_credential(&self, credential: impl Into<String>) -> PromiEvent<Option<String>> {
        debug!("starting credential login");
        self.context
            .request(Method::LoginWithCredential, vec![json!(credential.into())])
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::identifiers::IdSequence;
    use crate::protocol::RelayerMessage;
    use crate::rpc::Dispatcher;
    use crate::transport::{ChannelTransport, ControllerHandle};

    fn setup(first_id: u64) -> (AuthModule, ControllerHandle) {
        let (transport, controller) = ChannelTransport::pair();
        let dispatcher = Dispatcher::with_sequence(transport, IdSequence::starting_at(first_id));
        (AuthModule::new(ModuleContext::new(dispatcher)), controller)
    }

    #[tokio::test]
    async fn test_magic_link_login_request_shape_and_lifecycle() {
        let (auth, mut controller) = setup(999);

        let login = auth.login_with_magic_link(LoginWithMagicLinkConfiguration::new(
            "user@example.com",
        ));

        let email_sent = Arc::new(AtomicUsize::new(0));
        let resolved = Arc::new(AtomicUsize::new(0));
        let sent_count = Arc::clone(&email_sent);
        let resolved_view = Arc::clone(&resolved);
        login.on(LoginWithMagicLinkEvent::EmailSent, move |_| {
            // Fires strictly before the final response resolves the login.
            assert_eq!(resolved_view.load(Ordering::SeqCst), 0);
            sent_count.fetch_add(1, Ordering::SeqCst);
        });
        let resolved_count = Arc::clone(&resolved);
        login.on(crate::promise::DONE, move |_| {
            resolved_count.fetch_add(1, Ordering::SeqCst);
        });

        let request = controller.try_next_request().expect("request posted");
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            json!({
                "id": 999,
                "method": "magic_auth_login_with_magic_link",
                "params": [{"email": "user@example.com", "showUI": true}],
            })
        );

        controller.deliver(RelayerMessage::event(
            request.id,
            LoginWithMagicLinkEvent::EmailSent.as_str(),
            None,
        ));
        controller.deliver(RelayerMessage::success(request.id, json!("didtoken")));

        assert_eq!(email_sent.load(Ordering::SeqCst), 1);
        assert_eq!(login.await.expect("fulfilled"), Some("didtoken".to_string()));
    }

    #[tokio::test]
    async fn test_hidden_ui_is_serialized() {
        let (auth, mut controller) = setup(1);

        let _login = auth.login_with_magic_link(
            LoginWithMagicLinkConfiguration::new("user@example.com").hidden_ui(),
        );

        let request = controller.try_next_request().expect("request posted");
        assert_eq!(request.params, vec![json!({
            "email": "user@example.com",
            "showUI": false,
        })]);
    }

    #[tokio::test]
    async fn test_login_resolves_to_none_on_null_token() {
        let (auth, mut controller) = setup(1);

        let login =
            auth.login_with_magic_link(LoginWithMagicLinkConfiguration::new("user@example.com"));

        let id = controller.try_next_request().expect("request posted").id;
        controller.deliver(RelayerMessage::success(id, serde_json::Value::Null));

        assert_eq!(login.await.expect("fulfilled"), None);
    }

    #[tokio::test]
    async fn test_login_with_credential_request_shape() {
        let (auth, mut controller) = setup(5);

        let _login = auth.login_with_credential("one-time-credential");

        let request = controller.try_next_request().expect("request posted");
        assert_eq!(request.method, "magic_auth_login_with_credential");
        assert_eq!(request.params, vec![json!("one-time-credential")]);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(LoginWithMagicLinkEvent::EmailSent.as_str(), "email-sent");
        assert_eq!(
            LoginWithMagicLinkEvent::EmailNotDeliverable.as_str(),
            "email-not-deliverable"
        );
        assert_eq!(LoginWithMagicLinkEvent::Retry.as_str(), "retry");
    }
}
