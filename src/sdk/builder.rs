//! Builder pattern for SDK configuration.
//!
//! Provides a fluent API for configuring and creating [`Sdk`] instances.
//!
//! # Example
//!
//! ```no_run
//! use walletframe::{ChannelTransport, Sdk};
//!
//! # fn example() -> walletframe::Result<()> {
//! let (transport, _controller) = ChannelTransport::pair();
//! let sdk = Sdk::builder()
//!     .api_key("pk_test_123")
//!     .network("mainnet")
//!     .transport(transport)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::IdSequence;
use crate::modules::{Extension, RESERVED_NAMESPACES};
use crate::transport::Transport;

use super::core::Sdk;

// ============================================================================
// Constants
// ============================================================================

/// Relayer endpoint used when none is configured.
pub(crate) const DEFAULT_ENDPOINT: &str = "https://relay.walletframe.dev";

// ============================================================================
// SdkBuilder
// ============================================================================

/// Builder for configuring an [`Sdk`] instance.
///
/// Use [`Sdk::builder()`] to create a new builder.
#[derive(Default)]
pub struct SdkBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    network: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    sequence: Option<IdSequence>,
    extensions: Vec<(Option<String>, Box<dyn Extension>)>,
}

// ============================================================================
// SdkBuilder Implementation
// ============================================================================

impl SdkBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the publishable API key (required).
    #[inline]
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the relayer endpoint URL.
    ///
    /// Defaults to the hosted relayer.
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Selects a network for chain-facing operations.
    #[inline]
    #[must_use]
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Sets the transport to the embedded controller (required).
    #[inline]
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Overrides the request id sequence.
    ///
    /// Mainly useful for tests that need deterministic request ids.
    #[inline]
    #[must_use]
    pub fn id_sequence(mut self, sequence: IdSequence) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Registers an extension under its self-declared name.
    #[inline]
    #[must_use]
    pub fn extension(mut self, extension: Box<dyn Extension>) -> Self {
        self.extensions.push((None, extension));
        self
    }

    /// Registers an extension under an explicit namespace key.
    #[inline]
    #[must_use]
    pub fn extension_named(
        mut self,
        key: impl Into<String>,
        extension: Box<dyn Extension>,
    ) -> Self {
        self.extensions.push((Some(key.into()), extension));
        self
    }

    /// Builds the SDK with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingApiKey`] if no API key was set
    /// - [`Error::Config`] if the endpoint is not a valid URL or no
    ///   transport was set
    /// - [`Error::NamespaceCollision`] if an extension's key clashes
    ///   with a reserved built-in module or another extension
    pub fn build(self) -> Result<Sdk> {
        let api_key = self.validate_api_key()?;
        let endpoint = self.validate_endpoint()?;
        let transport = self.validate_transport()?;
        let extensions = Self::validate_extensions(self.extensions)?;
        let sequence = self.sequence.unwrap_or_default();

        Sdk::assemble(api_key, endpoint, self.network, transport, sequence, extensions)
    }
}

// ============================================================================
// Validation
// ============================================================================

impl SdkBuilder {
    fn validate_api_key(&self) -> Result<String> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key.to_string()),
            _ => Err(Error::MissingApiKey),
        }
    }

    fn validate_endpoint(&self) -> Result<Url> {
        let endpoint = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let url = Url::parse(endpoint)
            .map_err(|err| Error::config(format!("invalid endpoint '{endpoint}': {err}")))?;

        if url.host_str().is_none() {
            return Err(Error::config(format!(
                "endpoint '{endpoint}' has no host"
            )));
        }
        Ok(url)
    }

    fn validate_transport(&self) -> Result<Arc<dyn Transport>> {
        self.transport.clone().ok_or_else(|| {
            Error::config(
                "transport is required. Use .transport() to supply the controller channel",
            )
        })
    }

    /// Resolves each extension's namespace key and rejects collisions
    /// with reserved built-in keys or other extensions.
    fn validate_extensions(
        extensions: Vec<(Option<String>, Box<dyn Extension>)>,
    ) -> Result<Vec<(String, Box<dyn Extension>)>> {
        let mut resolved: Vec<(String, Box<dyn Extension>)> = Vec::with_capacity(extensions.len());

        for (key, extension) in extensions {
            let key = key.unwrap_or_else(|| extension.name().to_string());

            if RESERVED_NAMESPACES.contains(&key.as_str())
                || resolved.iter().any(|(taken, _)| *taken == key)
            {
                return Err(Error::namespace_collision(key));
            }
            resolved.push((key, extension));
        }
        Ok(resolved)
    }
}

impl std::fmt::Debug for SdkBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkBuilder")
            .field("api_key", &self.api_key.is_some())
            .field("endpoint", &self.endpoint)
            .field("network", &self.network)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::any::Any;

    use serde_json::Value;

    use crate::transport::ChannelTransport;

    struct NamedExtension {
        name: &'static str,
    }

    impl Extension for NamedExtension {
        fn name(&self) -> &str {
            self.name
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn extension(name: &'static str) -> Box<dyn Extension> {
        Box::new(NamedExtension { name })
    }

    #[test]
    fn test_build_fails_without_api_key() {
        let (transport, _controller) = ChannelTransport::pair();
        let result = SdkBuilder::new().transport(transport).build();

        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_build_fails_with_empty_api_key() {
        let (transport, _controller) = ChannelTransport::pair();
        let result = SdkBuilder::new().api_key("").transport(transport).build();

        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_build_fails_without_transport() {
        let result = SdkBuilder::new().api_key("pk_test").build();

        let err = result.expect_err("missing transport");
        assert!(err.to_string().contains("transport"));
    }

    #[test]
    fn test_build_fails_with_invalid_endpoint() {
        let (transport, _controller) = ChannelTransport::pair();
        let result = SdkBuilder::new()
            .api_key("pk_test")
            .endpoint("not a url")
            .transport(transport)
            .build();

        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_build_defaults_endpoint() {
        let (transport, _controller) = ChannelTransport::pair();
        let sdk = SdkBuilder::new()
            .api_key("pk_test")
            .transport(transport)
            .build()
            .expect("build");

        assert_eq!(sdk.endpoint().as_str(), format!("{DEFAULT_ENDPOINT}/"));
    }

    #[test]
    fn test_reserved_namespace_collision_fails_before_any_request() {
        let (transport, mut controller) = ChannelTransport::pair();
        let result = SdkBuilder::new()
            .api_key("pk_test")
            .transport(transport)
            .extension(extension("user"))
            .build();

        assert!(matches!(
            result,
            Err(Error::NamespaceCollision { ref key }) if key == "user"
        ));
        assert!(controller.try_next_request().is_none());
        assert!(controller.envelope().is_none());
    }

    #[test]
    fn test_explicit_key_collision_with_reserved_namespace() {
        let (transport, _controller) = ChannelTransport::pair();
        let result = SdkBuilder::new()
            .api_key("pk_test")
            .transport(transport)
            .extension_named("rpcProvider", extension("harmless"))
            .build();

        assert!(matches!(result, Err(Error::NamespaceCollision { .. })));
    }

    #[test]
    fn test_duplicate_extension_keys_collide() {
        let (transport, _controller) = ChannelTransport::pair();
        let result = SdkBuilder::new()
            .api_key("pk_test")
            .transport(transport)
            .extension(extension("twin"))
            .extension(extension("twin"))
            .build();

        assert!(matches!(
            result,
            Err(Error::NamespaceCollision { ref key }) if key == "twin"
        ));
    }

    #[test]
    fn test_explicit_key_avoids_declared_name_collision() {
        let (transport, _controller) = ChannelTransport::pair();
        let sdk = SdkBuilder::new()
            .api_key("pk_test")
            .transport(transport)
            .extension(extension("twin"))
            .extension_named("other", extension("twin"))
            .build()
            .expect("distinct keys");

        assert!(sdk.extension("twin").is_some());
        assert!(sdk.extension("other").is_some());
    }
}
