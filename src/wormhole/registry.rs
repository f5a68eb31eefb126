//! Listener registry
//!
//! Process-local mapping from identifier to at most one listener
//! callback. Replacement is silent by design: the one-listener-per-
//! identifier model means a new registration simply takes over the
//! channel. The registry is plain data; all locking is owned by the
//! wormhole manager so that registration, drains and invocations share
//! a single mutual-exclusion domain.

use std::collections::HashMap;

/// Callback handed the drained payloads for an identifier, in order
pub type ListenerCallback = Box<dyn FnMut(Vec<Vec<u8>>) + Send>;

#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<String, ListenerCallback>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a callback for the identifier, replacing any prior one
    pub fn register(&mut self, identifier: &str, callback: ListenerCallback) {
        if self
            .listeners
            .insert(identifier.to_string(), callback)
            .is_some()
        {
            log::trace!("Listener for '{}' replaced", identifier);
        }
    }

    /// Remove the callback if present; no-op when absent
    pub fn unregister(&mut self, identifier: &str) -> bool {
        self.listeners.remove(identifier).is_some()
    }

    pub fn is_listening(&self, identifier: &str) -> bool {
        self.listeners.contains_key(identifier)
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Invoke the registered callback with an ordered payload batch
    ///
    /// A silent no-op when no listener is registered: by the time a
    /// drained batch reaches an unregistered identifier the messages
    /// are already consumed, so they are discarded rather than requeued.
    pub fn invoke(&mut self, identifier: &str, payloads: Vec<Vec<u8>>) {
        match self.listeners.get_mut(identifier) {
            Some(callback) => callback(payloads),
            None => {
                log::debug!(
                    "Dropping {} drained message(s) for '{}': no listener registered",
                    payloads.len(),
                    identifier
                );
            }
        }
    }
}
