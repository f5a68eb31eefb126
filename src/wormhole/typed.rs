//! Typed message layer
//!
//! Serde-backed wrappers over the raw byte-payload surface, so callers
//! can exchange strongly-typed messages without hand-rolling the JSON
//! plumbing. Payloads that fail to decode are skipped with a warning
//! rather than failing the batch: the listener path is fail-soft, and a
//! foreign or corrupt payload must not block messages queued behind it.

use crate::wormhole::error::{WormholeError, WormholeResult};
use crate::wormhole::manager::Wormhole;
use serde::de::DeserializeOwned;
use serde::Serialize;

impl Wormhole {
    /// Send a typed message, JSON-encoded
    ///
    /// Returns the assigned sequence number. Fails with
    /// [`WormholeError::Encoding`] if the value does not serialize and
    /// sends nothing in that case.
    pub fn send_json<T: Serialize>(&self, identifier: &str, message: &T) -> WormholeResult<u64> {
        let payload = serde_json::to_vec(message).map_err(|e| WormholeError::Encoding {
            identifier: identifier.to_string(),
            message: e.to_string(),
        })?;
        self.send(identifier, &payload)
    }

    /// Register a typed listener for an identifier
    ///
    /// Exactly [`Wormhole::listen`], with each batch decoded before the
    /// callback runs. Undecodable payloads are dropped from the batch
    /// with a warning; the callback is not invoked for a batch that
    /// decodes to nothing.
    pub fn listen_json<T, F>(&self, identifier: &str, mut callback: F)
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>) + Send + 'static,
    {
        let identifier_owned = identifier.to_string();
        self.listen(identifier, move |payloads| {
            let decoded = decode_batch(&identifier_owned, payloads);
            if !decoded.is_empty() {
                callback(decoded);
            }
        });
    }

    /// Current queue contents decoded to `T`, oldest first, without
    /// consuming them
    pub fn messages_json<T: DeserializeOwned>(&self, identifier: &str) -> Vec<T> {
        decode_batch(identifier, self.messages(identifier))
    }

    /// Pop the oldest queued message and decode it
    ///
    /// `None` when the queue is empty or the popped payload does not
    /// decode (the payload is consumed either way, matching the raw
    /// [`Wormhole::next_message`] semantics).
    pub fn next_message_json<T: DeserializeOwned>(&self, identifier: &str) -> Option<T> {
        let payload = self.next_message(identifier)?;
        match serde_json::from_slice(&payload) {
            Ok(message) => Some(message),
            Err(e) => {
                log::warn!(
                    "Skipping undecodable {}-byte payload on '{}': {}",
                    payload.len(),
                    identifier,
                    e
                );
                None
            }
        }
    }
}

fn decode_batch<T: DeserializeOwned>(identifier: &str, payloads: Vec<Vec<u8>>) -> Vec<T> {
    payloads
        .into_iter()
        .filter_map(|payload| match serde_json::from_slice(&payload) {
            Ok(message) => Some(message),
            Err(e) => {
                log::warn!(
                    "Skipping undecodable {}-byte payload on '{}': {}",
                    payload.len(),
                    identifier,
                    e
                );
                None
            }
        })
        .collect()
}
