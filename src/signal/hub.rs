//! In-process signal hub
//!
//! Broadcast fabric connecting any number of [`SignalEndpoint`]s, each
//! standing in for one process's view of the notification namespace.
//! Two wormholes built over one `FileStore` root and two endpoints of
//! one hub behave, within a single test process, like two real processes
//! sharing a container directory and a notification center.
//!
//! Dispatch is synchronous on the broadcaster's thread and one-to-one
//! per broadcast. Consumers must not rely on that: the transport
//! contract explicitly allows coalescing and loss, and real transports
//! do both.

use crate::signal::error::SignalResult;
use crate::signal::traits::{SignalCallback, SignalTransport};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct HubState {
    /// name -> endpoint id -> callback
    subscriptions: HashMap<String, HashMap<u64, SignalCallback>>,
}

struct HubInner {
    next_endpoint_id: AtomicU64,
    state: Mutex<HubState>,
}

/// Shared broadcast fabric for [`SignalEndpoint`]s
///
/// Cloning is cheap and clones refer to the same fabric.
#[derive(Clone)]
pub struct LocalSignalHub {
    inner: Arc<HubInner>,
}

impl LocalSignalHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                next_endpoint_id: AtomicU64::new(0),
                state: Mutex::new(HubState::default()),
            }),
        }
    }

    /// Create a new endpoint on this hub
    ///
    /// Each endpoint holds its own subscriptions, the way each process
    /// holds its own observer registrations with a notification center.
    pub fn endpoint(&self) -> SignalEndpoint {
        SignalEndpoint {
            hub: Arc::clone(&self.inner),
            endpoint_id: self.inner.next_endpoint_id.fetch_add(1, Ordering::SeqCst),
        }
    }

    /// Number of endpoints currently subscribed to `name`
    pub fn subscriber_count(&self, name: &str) -> usize {
        let state = self.inner.state.lock().unwrap();
        state.subscriptions.get(name).map_or(0, |subs| subs.len())
    }
}

impl Default for LocalSignalHub {
    fn default() -> Self {
        Self::new()
    }
}

/// One process's handle onto a [`LocalSignalHub`]
pub struct SignalEndpoint {
    hub: Arc<HubInner>,
    endpoint_id: u64,
}

impl SignalTransport for SignalEndpoint {
    fn broadcast(&self, name: &str) -> SignalResult<()> {
        // Clone the callbacks out of the lock first: they take their own
        // locks when they run, and holding the hub lock across user code
        // invites deadlock.
        let callbacks: Vec<SignalCallback> = {
            let state = self.hub.state.lock().unwrap();
            state
                .subscriptions
                .get(name)
                .map(|subs| subs.values().cloned().collect())
                .unwrap_or_default()
        };

        log::trace!(
            "Broadcasting signal '{}' to {} subscriber(s)",
            name,
            callbacks.len()
        );

        for callback in callbacks {
            callback();
        }

        Ok(())
    }

    fn subscribe(&self, name: &str, callback: SignalCallback) {
        let mut state = self.hub.state.lock().unwrap();
        let subs = state.subscriptions.entry(name.to_string()).or_default();
        if subs.insert(self.endpoint_id, callback).is_some() {
            log::trace!(
                "Endpoint {} replaced its subscription for signal '{}'",
                self.endpoint_id,
                name
            );
        }
    }

    fn unsubscribe(&self, name: &str) {
        let mut state = self.hub.state.lock().unwrap();
        if let Some(subs) = state.subscriptions.get_mut(name) {
            subs.remove(&self.endpoint_id);
            if subs.is_empty() {
                state.subscriptions.remove(name);
            }
        }
    }
}

impl Drop for SignalEndpoint {
    fn drop(&mut self) {
        // A dropped endpoint must not keep callbacks alive in the hub.
        if let Ok(mut state) = self.hub.state.lock() {
            state
                .subscriptions
                .retain(|_, subs| {
                    subs.remove(&self.endpoint_id);
                    !subs.is_empty()
                });
        }
    }
}
