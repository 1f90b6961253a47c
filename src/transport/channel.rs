//! In-process duplex transport.
//!
//! [`ChannelTransport::pair`] yields the host half (a [`Transport`]) and
//! a [`ControllerHandle`] standing in for the embedded controller.
//! Native embeddings drive the controller half from their bridge; tests
//! drive it directly.
//!
//! Delivery through [`ControllerHandle::deliver`] is synchronous: the
//! subscribed handler — and therefore correlation, event emission, and
//! settlement — runs to completion before `deliver` returns.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{ConfigEnvelope, RelayerMessage, RpcRequest};

use super::{MessageHandler, Transport};

// ============================================================================
// ChannelTransport
// ============================================================================

/// Host half of an in-process transport pair.
pub struct ChannelTransport {
    outgoing: mpsc::UnboundedSender<RpcRequest>,
    handler: Arc<Mutex<Option<MessageHandler>>>,
    envelope: Arc<Mutex<Option<ConfigEnvelope>>>,
}

impl ChannelTransport {
    /// Creates a connected transport/controller pair.
    #[must_use]
    pub fn pair() -> (Arc<Self>, ControllerHandle) {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let handler: Arc<Mutex<Option<MessageHandler>>> = Arc::new(Mutex::new(None));
        let envelope: Arc<Mutex<Option<ConfigEnvelope>>> = Arc::new(Mutex::new(None));

        let transport = Arc::new(Self {
            outgoing: outgoing_tx,
            handler: Arc::clone(&handler),
            envelope: Arc::clone(&envelope),
        });
        let controller = ControllerHandle {
            requests: outgoing_rx,
            handler,
            envelope,
        };

        (transport, controller)
    }
}

impl Transport for ChannelTransport {
    fn initialize(&self, envelope: &ConfigEnvelope) -> Result<()> {
        trace!(host = %envelope.host, "delivering configuration envelope");
        *self.envelope.lock() = Some(envelope.clone());
        Ok(())
    }

    fn post(&self, request: RpcRequest) -> Result<()> {
        trace!(id = %request.id, method = %request.method, "posting request");
        self.outgoing
            .send(request)
            .map_err(|_| Error::TransportClosed)
    }

    fn subscribe(&self, handler: MessageHandler) {
        *self.handler.lock() = Some(handler);
    }
}

impl std::fmt::Debug for ChannelTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelTransport")
            .field("subscribed", &self.handler.lock().is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ControllerHandle
// ============================================================================

/// Controller half of an in-process transport pair.
///
/// Receives the host's requests and delivers the controller's messages.
pub struct ControllerHandle {
    requests: mpsc::UnboundedReceiver<RpcRequest>,
    handler: Arc<Mutex<Option<MessageHandler>>>,
    envelope: Arc<Mutex<Option<ConfigEnvelope>>>,
}

impl ControllerHandle {
    /// Receives the next posted request, waiting if none is queued.
    ///
    /// Returns `None` once the host half is dropped.
    pub async fn next_request(&mut self) -> Option<RpcRequest> {
        self.requests.recv().await
    }

    /// Receives the next posted request without waiting.
    pub fn try_next_request(&mut self) -> Option<RpcRequest> {
        self.requests.try_recv().ok()
    }

    /// Delivers a message into the host's subscribed handler.
    ///
    /// Returns `false` (and drops the message) when nothing is
    /// subscribed.
    pub fn deliver(&self, message: RelayerMessage) -> bool {
        let handler = { self.handler.lock().clone() };
        match handler {
            Some(handler) => {
                handler(message);
                true
            }
            None => {
                warn!(id = %message.id, "dropping delivery without a subscribed handler");
                false
            }
        }
    }

    /// Returns the envelope delivered at initialization, if any.
    #[must_use]
    pub fn envelope(&self) -> Option<ConfigEnvelope> {
        self.envelope.lock().clone()
    }
}

impl std::fmt::Debug for ControllerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("initialized", &self.envelope.lock().is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::identifiers::RequestId;

    fn request(id: u64) -> RpcRequest {
        RpcRequest::new(RequestId::new(id), "magic_auth_is_logged_in", vec![])
    }

    #[test]
    fn test_posted_requests_reach_controller_in_order() {
        let (transport, mut controller) = ChannelTransport::pair();

        transport.post(request(1)).expect("post");
        transport.post(request(2)).expect("post");

        assert_eq!(
            controller.try_next_request().expect("first").id,
            RequestId::new(1)
        );
        assert_eq!(
            controller.try_next_request().expect("second").id,
            RequestId::new(2)
        );
        assert!(controller.try_next_request().is_none());
    }

    #[test]
    fn test_deliver_without_handler_is_dropped() {
        let (_transport, controller) = ChannelTransport::pair();

        let delivered = controller.deliver(RelayerMessage::success(RequestId::new(1), json!(true)));
        assert!(!delivered);
    }

    #[test]
    fn test_deliver_invokes_subscribed_handler() {
        let (transport, controller) = ChannelTransport::pair();

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        transport.subscribe(Arc::new(move |message| {
            sink.lock().push(message.id);
        }));

        controller.deliver(RelayerMessage::success(RequestId::new(7), json!(null)));

        assert_eq!(*received.lock(), vec![RequestId::new(7)]);
    }

    #[test]
    fn test_initialize_exposes_envelope_to_controller() {
        let (transport, controller) = ChannelTransport::pair();
        assert!(controller.envelope().is_none());

        let envelope = ConfigEnvelope {
            api_key: "pk_test".to_string(),
            host: "relay.walletframe.dev".to_string(),
            sdk: "walletframe".to_string(),
            version: "0.1.0".to_string(),
            network: None,
            ext: serde_json::Map::new(),
        };
        transport.initialize(&envelope).expect("initialize");

        assert_eq!(controller.envelope(), Some(envelope));
    }
}
