//! Dual-interface operation result: awaitable value + event stream.
//!
//! A [`PromiEvent`] wraps a single asynchronous operation so callers can
//! either `.await` it as one eventual value, or subscribe to named events
//! fired during the operation's lifetime — or both. A "log in with a
//! magic link" operation, for example, emits `email-sent` long before it
//! resolves to a token.
//!
//! # Structure
//!
//! Every wrapper owns two halves, shared across all wrappers chained from
//! the same origin:
//!
//! - a settlement cell holding the operation's eventual `Result`
//! - an [`EventEmitter`] for named lifecycle events
//!
//! The producer side is a [`Completer`]: cloneable, settles the cell at
//! most once via [`resolve`](Completer::resolve) /
//! [`reject`](Completer::reject), and relays intermediate lifecycle
//! events via [`emit`](Completer::emit).
//!
//! # Default Events
//!
//! Settlement always emits the default completion events, exactly once,
//! whether or not anything is subscribed or awaiting:
//!
//! | Outcome | Events, in order |
//! |---------|------------------|
//! | fulfilled | [`DONE`] (with the value), then [`SETTLED`] |
//! | rejected | [`ERROR`] (with the error), then [`SETTLED`] |
//!
//! Both events fire before any awaiting future is woken, so chained
//! observers always run after them.
//!
//! # Example
//!
//! ```ignore
//! let login = sdk.auth().login_with_magic_link(configuration);
//!
//! login.on(LoginWithMagicLinkEvent::EmailSent, |_| {
//!     println!("check your inbox");
//! });
//!
//! let token = login.await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};
use crate::events::{EventEmitter, ListenerHandle};

// ============================================================================
// Constants
// ============================================================================

/// Default event emitted with the resolved value on fulfillment.
pub const DONE: &str = "done";

/// Default event emitted with the rejection reason on failure.
pub const ERROR: &str = "error";

/// Default event emitted after `done`/`error`, on either outcome.
pub const SETTLED: &str = "settled";

// ============================================================================
// EventArg
// ============================================================================

/// Payload delivered to [`PromiEvent`] listeners.
#[derive(Debug, Clone)]
pub enum EventArg {
    /// No payload (`settled`, payload-less lifecycle events).
    None,
    /// JSON payload (`done`, intermediate relayer events).
    Json(Value),
    /// Rejection payload (`error`).
    Failure(Arc<Error>),
}

impl EventArg {
    /// Returns the JSON payload, if any.
    #[inline]
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the rejection payload, if any.
    #[inline]
    #[must_use]
    pub fn as_failure(&self) -> Option<&Error> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }
}

// ============================================================================
// Shared State
// ============================================================================

/// Settlement cell: pending wakers, or the final outcome.
enum Cell {
    Pending {
        wakers: FxHashMap<u64, Waker>,
        next_key: u64,
    },
    Settled(Result<Value>),
}

/// State shared by every wrapper chained from one origin.
struct Shared {
    emitter: EventEmitter<EventArg>,
    cell: Mutex<Cell>,
}

impl Shared {
    fn new() -> Self {
        Self {
            emitter: EventEmitter::new(),
            cell: Mutex::new(Cell::Pending {
                wakers: FxHashMap::default(),
                next_key: 0,
            }),
        }
    }
}

// ============================================================================
// Completer
// ============================================================================

/// Producer half of a [`PromiEvent`].
///
/// Cloneable; held by the dispatcher's pending set until a final response
/// arrives. Settlement is at-most-once: the second and any later
/// `resolve`/`reject` calls are silent no-ops.
#[derive(Clone)]
pub struct Completer {
    shared: Arc<Shared>,
}

impl Completer {
    /// Fulfills the operation with `value`.
    ///
    /// Emits `done` with the value, then `settled`, then wakes awaiting
    /// futures.
    pub fn resolve(&self, value: Value) {
        self.settle(Ok(value));
    }

    /// Rejects the operation with `error`.
    ///
    /// Emits `error` with the reason, then `settled`, then wakes awaiting
    /// futures.
    pub fn reject(&self, error: Error) {
        self.settle(Err(error));
    }

    /// Emits a named intermediate lifecycle event.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: impl AsRef<str>, data: Option<Value>) -> usize {
        let arg = data.map_or(EventArg::None, EventArg::Json);
        self.shared.emitter.emit(event, &arg)
    }

    /// Returns `true` once the operation has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(&*self.shared.cell.lock(), Cell::Settled(_))
    }

    fn settle(&self, result: Result<Value>) {
        let wakers = {
            let mut cell = self.shared.cell.lock();
            match &mut *cell {
                Cell::Settled(_) => {
                    trace!("ignoring settlement of an already-settled operation");
                    return;
                }
                Cell::Pending { wakers, .. } => {
                    let wakers: Vec<Waker> = wakers.drain().map(|(_, waker)| waker).collect();
                    *cell = Cell::Settled(result.clone());
                    wakers
                }
            }
        };

        // Default completion events fire before any awaiting future runs.
        match &result {
            Ok(value) => {
                self.shared.emitter.emit(DONE, &EventArg::Json(value.clone()));
            }
            Err(error) => {
                self.shared
                    .emitter
                    .emit(ERROR, &EventArg::Failure(Arc::new(error.clone())));
            }
        }
        self.shared.emitter.emit(SETTLED, &EventArg::None);

        for waker in wakers {
            waker.wake();
        }
    }
}

impl fmt::Debug for Completer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("settled", &self.is_settled())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SettleFuture
// ============================================================================

/// Future resolving when the shared cell settles.
///
/// Each instance registers its waker under its own key so that several
/// chained wrappers can await the same origin independently.
struct SettleFuture {
    shared: Arc<Shared>,
    key: Option<u64>,
}

impl Future for SettleFuture {
    type Output = Result<Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut cell = this.shared.cell.lock();
        match &mut *cell {
            Cell::Settled(result) => Poll::Ready(result.clone()),
            Cell::Pending { wakers, next_key } => {
                let key = *this.key.get_or_insert_with(|| {
                    let key = *next_key;
                    *next_key += 1;
                    key
                });
                wakers.insert(key, cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl Drop for SettleFuture {
    fn drop(&mut self) {
        if let Some(key) = self.key
            && let Cell::Pending { wakers, .. } = &mut *self.shared.cell.lock()
        {
            wakers.remove(&key);
        }
    }
}

// ============================================================================
// PromiEvent
// ============================================================================

/// An awaitable operation result that is also an event emitter.
///
/// Implements `Future<Output = Result<T>>`, and exposes the full
/// [`EventEmitter`] surface operating on one emitter instance shared by
/// every wrapper chained from the same origin.
pub struct PromiEvent<T> {
    shared: Arc<Shared>,
    future: BoxFuture<'static, Result<T>>,
}

impl<T> PromiEvent<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Creates a wrapper together with its producer half.
    ///
    /// Fulfillment deserializes the settled JSON value into `T`; a
    /// deserialization failure surfaces as a rejection.
    #[must_use]
    pub fn pending() -> (Self, Completer) {
        let shared = Arc::new(Shared::new());
        let completer = Completer {
            shared: Arc::clone(&shared),
        };
        let settle = SettleFuture {
            shared: Arc::clone(&shared),
            key: None,
        };
        let future = settle
            .map(|result| result.and_then(decode::<T>))
            .boxed();

        (Self { shared, future }, completer)
    }

    /// Creates a wrapper from an executor.
    ///
    /// The executor receives the [`Completer`] and may settle it
    /// immediately, or clone it out to settle later. An `Err` return is
    /// funneled into the wrapper's single rejection path, so no executor
    /// failure can escape as anything but a rejection.
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(&Completer) -> Result<()>,
    {
        let (event, completer) = Self::pending();
        if let Err(error) = executor(&completer) {
            completer.reject(error);
        }
        event
    }

    /// Creates an already-rejected wrapper.
    #[must_use]
    pub fn rejected(error: Error) -> Self {
        Self::new(move |_| Err(error))
    }
}

impl<T> PromiEvent<T>
where
    T: Send + 'static,
{
    /// Chains a transformation of the fulfilled value.
    ///
    /// Returns a new wrapper sharing this one's emitter: events emitted
    /// on the origin remain observable from the chained wrapper, and
    /// vice versa.
    pub fn map<U, F>(self, f: F) -> PromiEvent<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        PromiEvent {
            shared: Arc::clone(&self.shared),
            future: self.future.map(|result| result.map(f)).boxed(),
        }
    }

    /// Chains a rejection handler that may recover with a new value.
    pub fn or_else<F>(self, f: F) -> PromiEvent<T>
    where
        F: FnOnce(Error) -> Result<T> + Send + 'static,
    {
        PromiEvent {
            shared: Arc::clone(&self.shared),
            future: self.future.map(|result| result.or_else(f)).boxed(),
        }
    }

    /// Chains a side effect that runs on either outcome.
    pub fn finally<F>(self, f: F) -> PromiEvent<T>
    where
        F: FnOnce() + Send + 'static,
    {
        PromiEvent {
            shared: Arc::clone(&self.shared),
            future: self
                .future
                .map(|result| {
                    f();
                    result
                })
                .boxed(),
        }
    }
}

// ============================================================================
// PromiEvent - Emitter Surface
// ============================================================================

impl<T> PromiEvent<T> {
    /// Registers a listener for a named event.
    pub fn on(
        &self,
        event: impl AsRef<str>,
        listener: impl FnMut(&EventArg) + Send + 'static,
    ) -> ListenerHandle {
        self.shared.emitter.on(event, listener)
    }

    /// Registers a listener that auto-removes after its first invocation.
    pub fn once(
        &self,
        event: impl AsRef<str>,
        listener: impl FnMut(&EventArg) + Send + 'static,
    ) -> ListenerHandle {
        self.shared.emitter.once(event, listener)
    }

    /// Removes the listener identified by `handle`.
    pub fn off(&self, handle: &ListenerHandle) -> bool {
        self.shared.emitter.off(handle)
    }

    /// Removes all listeners for `event`, or every listener when `None`.
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        self.shared.emitter.remove_all_listeners(event);
    }

    /// Emits a named event to this wrapper's listeners.
    pub fn emit(&self, event: impl AsRef<str>, arg: &EventArg) -> usize {
        self.shared.emitter.emit(event, arg)
    }

    /// Returns the names of events that currently have listeners.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.shared.emitter.event_names()
    }

    /// Returns the number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: impl AsRef<str>) -> usize {
        self.shared.emitter.listener_count(event)
    }

    /// Returns `true` once the underlying operation has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(&*self.shared.cell.lock(), Cell::Settled(_))
    }
}

impl<T> Future for PromiEvent<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().future.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for PromiEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiEvent")
            .field("settled", &self.is_settled())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(Error::from)
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

    /// Records event names in arrival order.
    fn event_log<T>(
        event: &PromiEvent<T>,
        names: &[&str],
    ) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        for name in names {
            let name = (*name).to_string();
            let log = Arc::clone(&log);
            event.on(name.clone(), move |_| log.lock().push(name.clone()));
        }
        log
    }

    #[tokio::test]
    async fn test_resolve_emits_done_then_settled_then_value() {
        let (event, completer) = PromiEvent::<String>::pending();
        let log = event_log(&event, &[DONE, ERROR, SETTLED]);

        let payload = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&payload);
        event.on(DONE, move |arg| {
            *seen.lock() = arg.as_json().cloned();
        });

        completer.resolve(json!("token"));

        assert_eq!(*log.lock(), vec![DONE, SETTLED]);
        assert_eq!(*payload.lock(), Some(json!("token")));
        assert_eq!(event.await.expect("fulfilled"), "token");
    }

    #[tokio::test]
    async fn test_reject_emits_error_then_settled_then_fails() {
        let (event, completer) = PromiEvent::<String>::pending();
        let log = event_log(&event, &[DONE, ERROR, SETTLED]);

        completer.reject(Error::rpc(-32603, "boom", None));

        assert_eq!(*log.lock(), vec![ERROR, SETTLED]);
        let err = event.await.expect_err("rejected");
        assert_eq!(err.code(), Some(-32603));
    }

    #[tokio::test]
    async fn test_settlement_is_at_most_once() {
        let (event, completer) = PromiEvent::<i64>::pending();
        let settled = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&settled);
        event.on(SETTLED, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        completer.resolve(json!(1));
        completer.resolve(json!(2));
        completer.reject(Error::TransportClosed);

        assert_eq!(settled.load(Ordering::SeqCst), 1);
        assert_eq!(event.await.expect("first settlement wins"), 1);
    }

    #[tokio::test]
    async fn test_await_from_another_task() {
        let (event, completer) = PromiEvent::<u32>::pending();

        let waiter = tokio::spawn(event);
        tokio::task::yield_now().await;
        completer.resolve(json!(41));

        let value = waiter.await.expect("join").expect("fulfilled");
        assert_eq!(value, 41);
    }

    #[tokio::test]
    async fn test_executor_failure_is_funneled_into_rejection() {
        let event = PromiEvent::<String>::new(|_| Err(Error::transport("send failed")));

        assert!(event.is_settled());
        let err = event.await.expect_err("rejected");
        assert!(err.is_transport_error());
    }

    #[tokio::test]
    async fn test_executor_can_settle_later_via_cloned_completer() {
        let stashed: Arc<Mutex<Option<Completer>>> = Arc::new(Mutex::new(None));

        let stash = Arc::clone(&stashed);
        let event = PromiEvent::<bool>::new(move |completer| {
            *stash.lock() = Some(completer.clone());
            Ok(())
        });

        assert!(!event.is_settled());
        stashed.lock().as_ref().expect("stashed").resolve(json!(true));
        assert!(event.await.expect("fulfilled"));
    }

    #[tokio::test]
    async fn test_chained_wrapper_shares_origin_events() {
        let (event, completer) = PromiEvent::<String>::pending();
        let chained = event.map(|token| token.len());

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        chained.on("email-sent", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        completer.emit("email-sent", None);
        completer.resolve(json!("token"));

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(chained.await.expect("fulfilled"), 5);
    }

    #[tokio::test]
    async fn test_origin_observes_events_emitted_on_chained_wrapper() {
        let (event, completer) = PromiEvent::<Value>::pending();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        event.on("retry", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let chained = event.map(|value| value);
        chained.emit("retry", &EventArg::None);

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        completer.resolve(Value::Null);
        chained.await.expect("fulfilled");
    }

    #[tokio::test]
    async fn test_or_else_recovers_from_rejection() {
        let (event, completer) = PromiEvent::<String>::pending();
        let recovered = event.or_else(|_| Ok("fallback".to_string()));

        completer.reject(Error::rpc(-1, "denied", None));

        assert_eq!(recovered.await.expect("recovered"), "fallback");
    }

    #[tokio::test]
    async fn test_finally_runs_on_both_outcomes() {
        let runs = Arc::new(AtomicUsize::new(0));

        let (ok_event, ok_completer) = PromiEvent::<i64>::pending();
        let counter = Arc::clone(&runs);
        let ok_event = ok_event.finally(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        ok_completer.resolve(json!(1));
        ok_event.await.expect("fulfilled");

        let (err_event, err_completer) = PromiEvent::<i64>::pending();
        let counter = Arc::clone(&runs);
        let err_event = err_event.finally(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        err_completer.reject(Error::TransportClosed);
        err_event.await.expect_err("rejected");

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_await_after_settlement() {
        let (event, completer) = PromiEvent::<Option<String>>::pending();
        completer.resolve(Value::Null);

        // The cell retains the outcome for late consumers.
        assert_eq!(event.await.expect("fulfilled"), None);
    }

    #[tokio::test]
    async fn test_type_mismatch_surfaces_as_json_rejection() {
        let (event, completer) = PromiEvent::<u64>::pending();
        completer.resolve(json!("not a number"));

        let err = event.await.expect_err("decode fails");
        assert!(matches!(err, Error::Json { .. }));
    }

    #[tokio::test]
    async fn test_intermediate_event_payload_reaches_listener() {
        let (event, completer) = PromiEvent::<Value>::pending();

        let payload = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&payload);
        event.on("progress", move |arg| {
            *seen.lock() = arg.as_json().cloned();
        });

        completer.emit("progress", Some(json!({"step": 2})));

        assert_eq!(*payload.lock(), Some(json!({"step": 2})));
        completer.resolve(Value::Null);
        event.await.expect("fulfilled");
    }

    #[test]
    fn test_rejected_constructor() {
        let event = PromiEvent::<String>::rejected(Error::MissingApiKey);
        assert!(event.is_settled());
    }
}
