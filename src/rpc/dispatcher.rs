//! Pending-request tracking and message routing.
//!
//! # Correlation
//!
//! [`Dispatcher::send`] registers `{id -> completer}` in the pending set
//! *before* the request is handed to the transport, so a response cannot
//! race its own registration. Routing then follows the message kind:
//!
//! - intermediate (`type`) — emit the named event on the request's
//!   wrapper; the entry stays registered
//! - final `error` — reject the wrapper; remove the entry
//! - final `result` — fulfill the wrapper; remove the entry
//! - unknown id — discard; stale, duplicate-final, and foreign messages
//!   are expected under abandonment and duplicate delivery
//!
//! Because the entry is removed on the first final message, the terminal
//! response is always the last one processed for its id.
//!
//! # Timeouts
//!
//! The dispatcher never times a request out; a request with no final
//! response stays pending until [`close`](Dispatcher::close). Callers
//! layer timeout policy on top of the returned wrapper, e.g.
//! `tokio::time::timeout(dur, operation)`.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::{IdSequence, RequestId};
use crate::promise::{Completer, PromiEvent};
use crate::protocol::{MessageKind, RelayerMessage, RpcRequest};
use crate::transport::Transport;

// ============================================================================
// Types
// ============================================================================

/// Pending set plus the closed flag, guarded together.
#[derive(Default)]
struct PendingState {
    entries: FxHashMap<RequestId, Completer>,
    closed: bool,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Correlates outgoing requests with the transport's message stream.
///
/// One dispatcher is scoped to one SDK instance; the pending set is its
/// private state and no other component touches it.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    pending: Arc<Mutex<PendingState>>,
    sequence: IdSequence,
}

impl Dispatcher {
    /// Creates a dispatcher bound to `transport` and subscribes to its
    /// message stream.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Self::with_sequence(transport, IdSequence::new())
    }

    /// Creates a dispatcher with an explicit id sequence.
    ///
    /// Mainly useful for tests that need deterministic request ids.
    #[must_use]
    pub fn with_sequence(transport: Arc<dyn Transport>, sequence: IdSequence) -> Arc<Self> {
        let pending = Arc::new(Mutex::new(PendingState::default()));

        let routing = Arc::clone(&pending);
        transport.subscribe(Arc::new(move |message| {
            Self::route_message(&routing, message);
        }));

        Arc::new(Self {
            transport,
            pending,
            sequence,
        })
    }

    /// Sends a request and returns its dual-interface result.
    ///
    /// The wrapper rejects — it never panics or returns an error
    /// synchronously — when the transport refuses the request or the
    /// dispatcher is closed.
    pub fn send<T>(&self, method: impl Into<String>, params: Vec<Value>) -> PromiEvent<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let id = self.sequence.next();
        let request = RpcRequest::new(id, method, params);
        let pending = Arc::clone(&self.pending);
        let transport = Arc::clone(&self.transport);

        PromiEvent::new(move |completer| {
            {
                let mut state = pending.lock();
                if state.closed {
                    return Err(Error::TransportClosed);
                }
                state.entries.insert(id, completer.clone());
            }

            trace!(id = %id, method = %request.method, "request registered");
            if let Err(error) = transport.post(request) {
                pending.lock().entries.remove(&id);
                return Err(error);
            }
            Ok(())
        })
    }

    /// Returns the number of requests awaiting a final response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().entries.len()
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.pending.lock().closed
    }

    /// Rejects every pending request and refuses subsequent sends.
    ///
    /// Pending wrappers reject with
    /// [`Error::TransportClosed`](crate::Error::TransportClosed).
    pub fn close(&self) {
        let drained: Vec<Completer> = {
            let mut state = self.pending.lock();
            state.closed = true;
            state.entries.drain().map(|(_, completer)| completer).collect()
        };

        let count = drained.len();
        for completer in drained {
            completer.reject(Error::TransportClosed);
        }
        if count > 0 {
            debug!(count, "rejected pending requests on close");
        }
    }

    /// Routes one inbound message to its pending request.
    ///
    /// Completers are cloned out of the pending set before any event or
    /// settlement runs, so no lock is held across user callbacks.
    fn route_message(pending: &Mutex<PendingState>, message: RelayerMessage) {
        match message.kind() {
            MessageKind::Event { name, data } => {
                let completer = pending.lock().entries.get(&message.id).cloned();
                match completer {
                    Some(completer) => {
                        trace!(id = %message.id, event = name, "lifecycle event");
                        completer.emit(name, data.cloned());
                    }
                    None => {
                        trace!(id = %message.id, "discarding event for unknown request");
                    }
                }
            }

            MessageKind::Failure(error) => {
                let completer = pending.lock().entries.remove(&message.id);
                match completer {
                    Some(completer) => {
                        trace!(id = %message.id, code = error.code, "request failed");
                        completer.reject(error.clone().into_error());
                    }
                    None => {
                        trace!(id = %message.id, "discarding error for unknown request");
                    }
                }
            }

            MessageKind::Success(value) => {
                let completer = pending.lock().entries.remove(&message.id);
                match completer {
                    Some(completer) => {
                        trace!(id = %message.id, "request fulfilled");
                        completer.resolve(value);
                    }
                    None => {
                        trace!(id = %message.id, "discarding result for unknown request");
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
