//! The assembled SDK instance.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Map;
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::identifiers::IdSequence;
use crate::modules::{
    AuthModule, Extension, ModuleContext, RpcProviderModule, UserModule, has_meaningful_config,
};
use crate::protocol::ConfigEnvelope;
use crate::rpc::Dispatcher;
use crate::transport::Transport;

use super::builder::SdkBuilder;

// ============================================================================
// Sdk
// ============================================================================

/// An SDK instance: one dispatcher, the built-in modules, and any
/// registered extensions.
///
/// Construct via [`Sdk::builder()`]. Construction-time failures
/// (missing API key, invalid endpoint, namespace collisions) surface
/// synchronously from [`SdkBuilder::build`]; every later failure is
/// delivered through the rejection path of the operation that caused
/// it.
pub struct Sdk {
    api_key: String,
    endpoint: Url,
    envelope: ConfigEnvelope,
    dispatcher: Arc<Dispatcher>,
    auth: AuthModule,
    user: UserModule,
    rpc_provider: RpcProviderModule,
    extensions: FxHashMap<String, Box<dyn Extension>>,
}

impl Sdk {
    /// Creates a new SDK builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SdkBuilder {
        SdkBuilder::new()
    }

    /// Assembles a validated configuration into a live instance.
    ///
    /// Called by [`SdkBuilder::build`] after validation; delivers the
    /// configuration envelope, creates the dispatcher, and binds every
    /// module to it.
    pub(crate) fn assemble(
        api_key: String,
        endpoint: Url,
        network: Option<String>,
        transport: Arc<dyn Transport>,
        sequence: IdSequence,
        extensions: Vec<(String, Box<dyn Extension>)>,
    ) -> Result<Self> {
        let mut ext_configs = Map::new();
        for (_, extension) in &extensions {
            let config = extension.config();
            if has_meaningful_config(&config) {
                ext_configs.insert(extension.name().to_string(), config);
            }
        }

        let envelope = ConfigEnvelope {
            api_key: api_key.clone(),
            host: endpoint.host_str().unwrap_or_default().to_string(),
            sdk: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            network,
            ext: ext_configs,
        };
        transport.initialize(&envelope)?;

        let dispatcher = Dispatcher::with_sequence(transport, sequence);
        let context = ModuleContext::new(Arc::clone(&dispatcher));

        let mut registry: FxHashMap<String, Box<dyn Extension>> = FxHashMap::default();
        for (key, mut extension) in extensions {
            extension.attach(context.clone());
            registry.insert(key, extension);
        }

        debug!(
            host = %envelope.host,
            extensions = registry.len(),
            "sdk constructed"
        );

        Ok(Self {
            api_key,
            endpoint,
            envelope,
            dispatcher,
            auth: AuthModule::new(context.clone()),
            user: UserModule::new(context.clone()),
            rpc_provider: RpcProviderModule::new(context),
            extensions: registry,
        })
    }
}

// ============================================================================
// Sdk - Accessors
// ============================================================================

impl Sdk {
    /// Returns the configured API key.
    #[inline]
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the configured relayer endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the configuration envelope delivered at initialization.
    #[inline]
    #[must_use]
    pub fn envelope(&self) -> &ConfigEnvelope {
        &self.envelope
    }

    /// Returns the envelope as base64-wrapped JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization
    /// fails.
    pub fn encoded_params(&self) -> Result<String> {
        self.envelope.encode()
    }

    /// Returns the authentication module.
    #[inline]
    #[must_use]
    pub fn auth(&self) -> &AuthModule {
        &self.auth
    }

    /// Returns the user module.
    #[inline]
    #[must_use]
    pub fn user(&self) -> &UserModule {
        &self.user
    }

    /// Returns the JSON-RPC passthrough module.
    #[inline]
    #[must_use]
    pub fn rpc_provider(&self) -> &RpcProviderModule {
        &self.rpc_provider
    }

    /// Returns the extension registered under `key`, if any.
    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&dyn Extension> {
        self.extensions.get(key).map(Box::as_ref)
    }

    /// Returns the extension registered under `key`, downcast to its
    /// concrete type.
    #[must_use]
    pub fn extension_as<E: Extension>(&self, key: &str) -> Option<&E> {
        self.extensions.get(key)?.as_any().downcast_ref::<E>()
    }

    /// Returns the dispatcher backing this instance.
    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Shuts the instance down.
    ///
    /// Every pending operation rejects with
    /// [`Error::TransportClosed`](crate::Error::TransportClosed) and
    /// subsequent operations reject immediately.
    pub fn shutdown(&self) {
        self.dispatcher.close();
    }
}

impl std::fmt::Debug for Sdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sdk")
            .field("endpoint", &self.endpoint.as_str())
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
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::{Value, json};

    use crate::error::Error;
    use crate::modules::LoginWithMagicLinkConfiguration;
    use crate::promise::PromiEvent;
    use crate::protocol::RelayerMessage;
    use crate::transport::{ChannelTransport, ControllerHandle};

    struct ConfiguredExtension {
        name: &'static str,
        config: Value,
        context: Option<ModuleContext>,
        attach_count: Arc<AtomicUsize>,
    }

    impl ConfiguredExtension {
        fn boxed(name: &'static str, config: Value) -> Box<dyn Extension> {
            Box::new(Self {
                name,
                config,
                context: None,
                attach_count: Arc::new(AtomicUsize::new(0)),
            })
        }

        fn ping(&self) -> PromiEvent<bool> {
            self.context
                .as_ref()
                .expect("attached")
                .request_raw("ext_ping", vec![])
        }
    }

    impl Extension for ConfiguredExtension {
        fn name(&self) -> &str {
            self.name
        }
        fn config(&self) -> Value {
            self.config.clone()
        }
        fn attach(&mut self, context: ModuleContext) {
            self.attach_count.fetch_add(1, Ordering::SeqCst);
            self.context = Some(context);
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn sdk_with(
        extensions: Vec<Box<dyn Extension>>,
    ) -> (Sdk, ControllerHandle) {
        let (transport, controller) = ChannelTransport::pair();
        let mut builder = Sdk::builder()
            .api_key("pk_test_123")
            .id_sequence(IdSequence::starting_at(999));
        for extension in extensions {
            builder = builder.extension(extension);
        }
        let sdk = builder.transport(transport).build().expect("build");
        (sdk, controller)
    }

    #[test]
    fn test_envelope_carries_only_meaningful_extension_configs() {
        let (sdk, controller) = sdk_with(vec![
            ConfiguredExtension::boxed("configured", json!({"hello": "world"})),
            ConfiguredExtension::boxed("silent", json!({})),
        ]);

        let envelope = controller.envelope().expect("initialized");
        assert_eq!(
            envelope.ext.get("configured"),
            Some(&json!({"hello": "world"}))
        );
        assert!(!envelope.ext.contains_key("silent"));
        assert_eq!(envelope.ext.len(), 1);
        assert_eq!(envelope.api_key, "pk_test_123");
        assert_eq!(sdk.envelope(), &envelope);
    }

    #[test]
    fn test_envelope_omits_ext_entirely_without_configured_extensions() {
        let (sdk, _controller) = sdk_with(vec![ConfiguredExtension::boxed("silent", json!({}))]);

        let encoded = serde_json::to_value(sdk.envelope()).expect("serialize");
        assert!(encoded.get("ext").is_none());
        assert_eq!(encoded["sdk"], json!("walletframe"));
    }

    #[test]
    fn test_encoded_params_roundtrip() {
        use base64::Engine as _;

        let (sdk, _controller) = sdk_with(vec![]);

        let encoded = sdk.encoded_params().expect("encode");
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .expect("base64");
        let parsed: ConfigEnvelope = serde_json::from_slice(&decoded).expect("json");

        assert_eq!(&parsed, sdk.envelope());
    }

    #[tokio::test]
    async fn test_login_through_the_assembled_sdk() {
        let (sdk, mut controller) = sdk_with(vec![]);

        let login = sdk
            .auth()
            .login_with_magic_link(LoginWithMagicLinkConfiguration::new("user@example.com"));

        let request = controller.next_request().await.expect("request posted");
        assert_eq!(request.id.as_u64(), 999);
        assert_eq!(request.method, "magic_auth_login_with_magic_link");

        controller.deliver(RelayerMessage::event(request.id, "email-sent", None));
        controller.deliver(RelayerMessage::success(request.id, json!("didtoken")));

        assert_eq!(
            login.await.expect("fulfilled"),
            Some("didtoken".to_string())
        );
    }

    #[tokio::test]
    async fn test_attached_extension_sends_through_shared_dispatcher() {
        let (sdk, mut controller) = sdk_with(vec![ConfiguredExtension::boxed(
            "probe",
            Value::Null,
        )]);

        let probe = sdk
            .extension_as::<ConfiguredExtension>("probe")
            .expect("registered");
        assert_eq!(probe.attach_count.load(Ordering::SeqCst), 1);

        let ping = probe.ping();
        let request = controller.try_next_request().expect("request posted");
        assert_eq!(request.method, "ext_ping");

        controller.deliver(RelayerMessage::success(request.id, json!(true)));
        assert!(ping.await.expect("fulfilled"));
    }

    #[test]
    fn test_extension_lookup_by_key() {
        let (sdk, _controller) =
            sdk_with(vec![ConfiguredExtension::boxed("probe", Value::Null)]);

        assert!(sdk.extension("probe").is_some());
        assert!(sdk.extension("missing").is_none());
        assert!(sdk.extension_as::<ConfiguredExtension>("probe").is_some());
    }

    #[tokio::test]
    async fn test_shutdown_rejects_pending_operations() {
        let (sdk, mut controller) = sdk_with(vec![]);

        let stranded = sdk.user().get_metadata();
        assert!(controller.try_next_request().is_some());

        sdk.shutdown();

        assert!(matches!(
            stranded.await.expect_err("rejected"),
            Error::TransportClosed
        ));
    }
}
