//! Wormhole - central coordination for queued message passing
//!
//! Ties the queue store to the signal transport: sends append then
//! broadcast, and both signal callbacks and new listener registrations
//! trigger a full drain of the identifier's queue.

use crate::core::sync::handle_mutex_poison;
use crate::core::validation::validate_identifier;
use crate::queue::api::QueueStore;
use crate::signal::api::{SignalCallback, SignalTransport};
use crate::storage::api::MessageStore;
use crate::wormhole::error::{WormholeError, WormholeResult};
use crate::wormhole::registry::{ListenerCallback, ListenerRegistry};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, TryLockError, Weak};

/// Queued, ordered message passing over a shared storage medium
///
/// A `Wormhole` is one process's endpoint. Processes sharing a storage
/// medium and a signal namespace exchange messages by identifier; every
/// message sent under an identifier reaches that identifier's listener
/// exactly once, in send order, whether or not the listener was
/// registered at send time.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use wormhole::signal::api::LocalSignalHub;
/// use wormhole::storage::api::MemoryStore;
/// use wormhole::wormhole::api::Wormhole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hub = LocalSignalHub::new();
/// let store = Arc::new(MemoryStore::new());
///
/// let wormhole = Wormhole::new(store, Box::new(hub.endpoint()));
///
/// // Messages queue up even before anyone listens...
/// wormhole.send("updates", b"first")?;
/// wormhole.send("updates", b"second")?;
///
/// // ...and are replayed, in order, the moment a listener registers.
/// wormhole.listen("updates", |messages| {
///     for payload in messages {
///         println!("got {} bytes", payload.len());
///     }
/// });
/// # Ok(())
/// # }
/// ```
///
/// # Thread safety
///
/// All listener state lives behind one internal mutex; signal callbacks
/// may arrive on arbitrary threads concurrently with application calls,
/// and listener callbacks run on whatever thread triggered the drain.
/// `send` and the queue accessors (`messages`, `next_message`,
/// `clear_messages`, `queued_count`) are safe to call from inside a
/// listener callback. Calling `listen`, `stop_listening` or
/// `is_listening` from inside a listener callback is not supported.
pub struct Wormhole {
    inner: Arc<WormholeInner>,
}

struct WormholeInner {
    queue: QueueStore,
    transport: Box<dyn SignalTransport>,

    /// The single mutual-exclusion domain for listener state. Drains
    /// and callback invocations happen while it is held, so a racing
    /// listener replacement delivers each batch to exactly the callback
    /// registered at the instant of invocation.
    registry: Mutex<ListenerRegistry>,

    /// Identifiers with a wakeup owed but not yet drained. A signal
    /// callback parks its identifier here; whichever thread holds (or
    /// next acquires) the registry lock flushes the set before letting
    /// go. This is what makes a signal arriving while the lock is held
    /// behave like a coalesced-but-not-lost wakeup rather than a
    /// deadlock, including the re-entrant case of a listener callback
    /// sending to an identifier its own process listens on.
    ///
    /// Leaf lock: never held while taking the registry lock or while
    /// running user code.
    pending: Mutex<HashSet<String>>,
}

impl WormholeInner {
    /// Record a wakeup for `identifier` and flush if nobody else is in
    /// the registry
    fn deliver(&self, identifier: &str) {
        self.pending.lock().unwrap().insert(identifier.to_string());
        self.try_flush();
    }

    /// Flush pending wakeups if the registry lock is free
    ///
    /// Returning on `WouldBlock` is safe: the current holder re-checks
    /// the pending set before releasing, and our identifier was parked
    /// before this attempt.
    fn try_flush(&self) {
        loop {
            {
                let mut registry = match self.registry.try_lock() {
                    Ok(registry) => registry,
                    Err(TryLockError::WouldBlock) => return,
                    Err(TryLockError::Poisoned(e)) => {
                        log::error!("Listener registry poisoned, wakeups dropped: {:?}", e);
                        return;
                    }
                };
                self.flush_locked(&mut registry);
            }

            // A wakeup parked between our last check and the unlock may
            // have seen the lock still held; pick it up ourselves.
            if self.pending.lock().unwrap().is_empty() {
                return;
            }
        }
    }

    /// Drain and deliver every pending identifier, repeating until no
    /// new wakeups were parked while we worked
    fn flush_locked(&self, registry: &mut ListenerRegistry) {
        loop {
            let identifiers: Vec<String> = {
                let mut pending = self.pending.lock().unwrap();
                pending.drain().collect()
            };
            if identifiers.is_empty() {
                return;
            }

            for identifier in identifiers {
                if !registry.is_listening(&identifier) {
                    // No listener: leave the queue untouched for a
                    // future registration to replay.
                    continue;
                }

                match self.queue.drain_all(&identifier) {
                    Ok(messages) if !messages.is_empty() => {
                        let payloads = messages.into_iter().map(|m| m.payload).collect();
                        registry.invoke(&identifier, payloads);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!(
                            "Drain failed for '{}', nothing delivered this round: {}",
                            identifier,
                            e
                        );
                    }
                }
            }
        }
    }

    /// Run `f` under the registry lock, then flush pending wakeups
    /// before (and after) releasing it
    fn with_registry<R>(&self, f: impl FnOnce(&mut ListenerRegistry) -> R) -> WormholeResult<R> {
        let result = {
            let mut registry = handle_mutex_poison(self.registry.lock(), |message| {
                WormholeError::OperationFailed { message }
            })?;
            let result = f(&mut registry);
            self.flush_locked(&mut registry);
            result
        };

        // A wakeup parked between the final flush check and the unlock
        // saw the lock held and backed off; pick it up ourselves.
        let has_pending = !self.pending.lock().unwrap().is_empty();
        if has_pending {
            self.try_flush();
        }
        Ok(result)
    }
}

impl Wormhole {
    /// Create a wormhole endpoint over a storage medium and a signal
    /// transport
    ///
    /// Endpoints that should reach each other must share the same
    /// medium (for example a [`FileStore`] root) and the same signal
    /// namespace.
    ///
    /// [`FileStore`]: crate::storage::api::FileStore
    pub fn new(store: Arc<dyn MessageStore>, transport: Box<dyn SignalTransport>) -> Self {
        Self {
            inner: Arc::new(WormholeInner {
                queue: QueueStore::new(store),
                transport,
                registry: Mutex::new(ListenerRegistry::new()),
                pending: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Send a message: append to the identifier's queue, then broadcast
    /// a wakeup signal
    ///
    /// Returns the sequence number the queue assigned. Fails only if
    /// the append could not be durably persisted; the caller may retry.
    /// A failed broadcast is logged and swallowed, because the queue
    /// remains the source of truth: the next signal or `listen` call
    /// for the identifier picks up everything still queued. No signal
    /// is broadcast for a message that did not append.
    pub fn send(&self, identifier: &str, payload: &[u8]) -> WormholeResult<u64> {
        validate_identifier(identifier)
            .map_err(|reason| WormholeError::InvalidIdentifier { reason })?;

        let sequence = self.inner.queue.append(identifier, payload)?;
        log::trace!("Sent message {} on '{}'", sequence, identifier);

        if let Err(e) = self.inner.transport.broadcast(identifier) {
            log::warn!("Signal broadcast for '{}' failed: {}", identifier, e);
        }

        Ok(sequence)
    }

    /// Register a listener for an identifier, replacing any previous one
    ///
    /// Anything already queued is drained and handed to the callback
    /// immediately, as a single ordered batch; afterwards the callback
    /// is invoked whenever a signal for the identifier arrives. Each
    /// invocation carries every message drained by that trigger, so a
    /// coalesced signal still delivers all of them.
    pub fn listen(&self, identifier: &str, callback: impl FnMut(Vec<Vec<u8>>) + Send + 'static) {
        if let Err(reason) = validate_identifier(identifier) {
            log::warn!("Ignoring listen for invalid identifier: {}", reason);
            return;
        }

        // Subscribe before registering: a signal firing in between sees
        // no listener and is dropped, which is safe because the replay
        // drain below picks up whatever that signal advertised.
        let signal_callback: SignalCallback = {
            let inner = Arc::downgrade(&self.inner);
            let identifier = identifier.to_string();
            Arc::new(move || {
                if let Some(inner) = Weak::upgrade(&inner) {
                    inner.deliver(&identifier);
                }
            })
        };
        self.inner.transport.subscribe(identifier, signal_callback);

        // Replay-on-registration rides the normal wakeup path. The
        // identifier is parked while the registry lock is held: parked
        // any earlier, a concurrent flush could pop it before this
        // listener exists and the backlog would wait for the next
        // trigger instead of replaying now.
        let inner = Arc::clone(&self.inner);
        let registered = self.inner.with_registry(move |registry| {
            registry.register(identifier, Box::new(callback) as ListenerCallback);
            inner.pending.lock().unwrap().insert(identifier.to_string());
        });
        if let Err(e) = registered {
            log::error!("Cannot register listener for '{}': {}", identifier, e);
        }
    }

    /// Stop listening for an identifier
    ///
    /// Queued-but-undelivered messages are untouched and will be
    /// replayed to the next listener. A no-op when not listening.
    pub fn stop_listening(&self, identifier: &str) {
        if let Err(e) = self.inner.with_registry(|registry| {
            registry.unregister(identifier);
        }) {
            log::error!("Cannot unregister listener for '{}': {}", identifier, e);
            return;
        }

        // Outside the registry lock: the transport takes its own lock
        // and may be mid-dispatch into a signal callback.
        self.inner.transport.unsubscribe(identifier);
    }

    /// Whether a listener is currently registered for the identifier
    pub fn is_listening(&self, identifier: &str) -> bool {
        self.inner
            .with_registry(|registry| registry.is_listening(identifier))
            .unwrap_or(false)
    }

    /// Pop and return the oldest queued message, `None` when empty
    ///
    /// Polling-style access for callers without a listener: repeated
    /// calls step through the queue in send order.
    pub fn next_message(&self, identifier: &str) -> Option<Vec<u8>> {
        match self.inner.queue.drain_one(identifier) {
            Ok(message) => message.map(|m| m.payload),
            Err(e) => {
                log::warn!("Poll failed for '{}': {}", identifier, e);
                None
            }
        }
    }

    /// Current queue contents for the identifier, oldest first, without
    /// consuming them
    pub fn messages(&self, identifier: &str) -> Vec<Vec<u8>> {
        match self.inner.queue.peek_all(identifier) {
            Ok(messages) => messages.into_iter().map(|m| m.payload).collect(),
            Err(e) => {
                log::warn!("Peek failed for '{}': {}", identifier, e);
                Vec::new()
            }
        }
    }

    /// Delete all queued messages for the identifier
    ///
    /// Does not affect listener registration; valid whether or not
    /// anyone is listening.
    pub fn clear_messages(&self, identifier: &str) {
        if let Err(e) = self.inner.queue.clear(identifier) {
            log::warn!("Clear failed for '{}': {}", identifier, e);
        }
    }

    /// Number of messages currently queued for the identifier
    pub fn queued_count(&self, identifier: &str) -> usize {
        match self.inner.queue.queued_count(identifier) {
            Ok(count) => count,
            Err(e) => {
                log::warn!("Count failed for '{}': {}", identifier, e);
                0
            }
        }
    }
}
