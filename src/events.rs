//! Typed event emitter with synchronous, ordered dispatch.
//!
//! [`EventEmitter`] maps string event names to listener lists. Listeners
//! are invoked synchronously, in registration order, each receiving a
//! reference to the payload type `A`.
//!
//! # Semantics
//!
//! - Emitting an event with no listeners is a no-op, not an error.
//! - A listener that panics unwinds into the caller of [`emit`] — panics
//!   are not swallowed. This is a documented behavior, not a bug.
//! - Dispatch iterates over a snapshot taken at emit time: listeners
//!   added or removed from inside a listener do not affect the current
//!   emission.
//!
//! # Example
//!
//! ```
//! use walletframe::events::EventEmitter;
//!
//! let emitter: EventEmitter<String> = EventEmitter::new();
//! let handle = emitter.on("greeting", |name| println!("hello, {name}"));
//!
//! emitter.emit("greeting", &"world".to_string());
//! emitter.off(&handle);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

// ============================================================================
// Types
// ============================================================================

/// Shared, lockable listener callback.
type Callback<A> = Arc<Mutex<dyn FnMut(&A) + Send>>;

/// One registered listener.
struct ListenerEntry<A> {
    id: u64,
    once: bool,
    callback: Callback<A>,
}

/// Handle returned by [`EventEmitter::on`] / [`EventEmitter::once`],
/// usable for removal via [`EventEmitter::off`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerHandle {
    event: String,
    id: u64,
}

impl ListenerHandle {
    /// Returns the event name this handle subscribes to.
    #[inline]
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }
}

// ============================================================================
// EventEmitter
// ============================================================================

/// A mapping from event names to listener lists, with synchronous,
/// ordered dispatch of a typed payload.
pub struct EventEmitter<A> {
    inner: Mutex<EmitterInner<A>>,
}

struct EmitterInner<A> {
    listeners: FxHashMap<String, Vec<ListenerEntry<A>>>,
    next_id: u64,
}

impl<A> EventEmitter<A> {
    /// Creates an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(EmitterInner {
                listeners: FxHashMap::default(),
                next_id: 0,
            }),
        }
    }

    /// Registers a listener for `event`.
    ///
    /// Listeners fire in registration order on every matching
    /// [`emit`](Self::emit) until removed.
    pub fn on(
        &self,
        event: impl AsRef<str>,
        listener: impl FnMut(&A) + Send + 'static,
    ) -> ListenerHandle {
        self.register(event.as_ref(), false, listener)
    }

    /// Registers a listener that auto-removes after its first invocation.
    pub fn once(
        &self,
        event: impl AsRef<str>,
        listener: impl FnMut(&A) + Send + 'static,
    ) -> ListenerHandle {
        self.register(event.as_ref(), true, listener)
    }

    /// Removes the listener identified by `handle`.
    ///
    /// Returns `true` if a listener was removed.
    pub fn off(&self, handle: &ListenerHandle) -> bool {
        let mut inner = self.inner.lock();
        let Some(entries) = inner.listeners.get_mut(&handle.event) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|entry| entry.id != handle.id);
        let removed = entries.len() < before;

        if entries.is_empty() {
            inner.listeners.remove(&handle.event);
        }
        removed
    }

    /// Removes all listeners for `event`, or every listener when `None`.
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        let mut inner = self.inner.lock();
        match event {
            Some(event) => {
                inner.listeners.remove(event);
            }
            None => inner.listeners.clear(),
        }
    }

    /// Invokes all listeners registered for `event`, synchronously and in
    /// registration order, passing `arg` to each.
    ///
    /// Returns the number of listeners invoked. `once` listeners are
    /// consumed before their callback runs, so a re-entrant emit cannot
    /// fire them twice.
    pub fn emit(&self, event: impl AsRef<str>, arg: &A) -> usize {
        let event = event.as_ref();
        let snapshot: Vec<Callback<A>> = {
            let mut inner = self.inner.lock();
            let Some(entries) = inner.listeners.get_mut(event) else {
                return 0;
            };

            let snapshot = entries
                .iter()
                .map(|entry| Arc::clone(&entry.callback))
                .collect();
            entries.retain(|entry| !entry.once);
            if entries.is_empty() {
                inner.listeners.remove(event);
            }
            snapshot
        };

        for callback in &snapshot {
            let mut listener = callback.lock();
            (&mut *listener)(arg);
        }
        snapshot.len()
    }

    /// Returns the names of events that currently have listeners.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.inner.lock().listeners.keys().cloned().collect()
    }

    /// Returns the number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: impl AsRef<str>) -> usize {
        self.inner
            .lock()
            .listeners
            .get(event.as_ref())
            .map_or(0, Vec::len)
    }

    fn register(
        &self,
        event: &str,
        once: bool,
        listener: impl FnMut(&A) + Send + 'static,
    ) -> ListenerHandle {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        inner
            .listeners
            .entry(event.to_string())
            .or_default()
            .push(ListenerEntry {
                id,
                once,
                callback: Arc::new(Mutex::new(listener)),
            });

        ListenerHandle {
            event: event.to_string(),
            id,
        }
    }
}

impl<A> Default for EventEmitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for EventEmitter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("EventEmitter")
            .field("events", &inner.listeners.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
