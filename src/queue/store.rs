//! QueueStore implementation over a message store
//!
//! See the module documentation for the key scheme and the concurrency
//! protocol. The store holds no per-identifier state of its own: every
//! operation goes back to the storage medium, which is what lets
//! several `QueueStore`s in several processes agree on one queue.

use crate::queue::error::QueueError;
use crate::queue::message::Message;
use crate::queue::QueueResult;
use crate::storage::api::StorageResult;
use crate::storage::error::StorageError;
use crate::storage::traits::MessageStore;
use std::sync::Arc;

/// Zero-padded width of the sequence component of a storage key
const SEQUENCE_WIDTH: usize = 10;

/// Contested sequence numbers an append will try before giving up
const MAX_APPEND_ATTEMPTS: usize = 32;

/// Key segment under which sequence claim markers live
///
/// Identifiers cannot contain `/`, so `id/seq/...` never collides with
/// another identifier's messages.
const MARKER_SEGMENT: &str = "seq";

/// Per-identifier ordered queues persisted in a [`MessageStore`]
#[derive(Clone)]
pub struct QueueStore {
    store: Arc<dyn MessageStore>,
}

impl QueueStore {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    fn prefix(identifier: &str) -> String {
        format!("{}/", identifier)
    }

    fn key(identifier: &str, sequence: u64) -> String {
        format!("{}/{:0width$}", identifier, sequence, width = SEQUENCE_WIDTH)
    }

    fn marker_prefix(identifier: &str) -> String {
        format!("{}/{}/", identifier, MARKER_SEGMENT)
    }

    fn marker_key(identifier: &str, sequence: u64) -> String {
        format!(
            "{}/{}/{:0width$}",
            identifier,
            MARKER_SEGMENT,
            sequence,
            width = SEQUENCE_WIDTH
        )
    }

    /// Parse the sequence component out of a message storage key
    ///
    /// Keys that do not follow the scheme, foreign files on the shared
    /// medium and claim markers alike, yield `None` and are ignored by
    /// every operation.
    fn parse_sequence(identifier: &str, key: &str) -> Option<u64> {
        let name = key.strip_prefix(identifier)?.strip_prefix('/')?;
        if name.contains('/') {
            return None;
        }
        name.parse().ok()
    }

    fn parse_marker(identifier: &str, key: &str) -> Option<u64> {
        key.strip_prefix(identifier)?
            .strip_prefix('/')?
            .strip_prefix(MARKER_SEGMENT)?
            .strip_prefix('/')?
            .parse()
            .ok()
    }

    /// Highest sequence number ever claimed for the identifier
    ///
    /// Markers outlive the messages they were claimed for, so this is
    /// the floor below which no sequence may ever be assigned again.
    fn highest_claimed(&self, identifier: &str) -> StorageResult<u64> {
        let keys = self.store.list_keys(&Self::marker_prefix(identifier))?;
        Ok(keys
            .iter()
            .rev()
            .find_map(|key| Self::parse_marker(identifier, key))
            .unwrap_or(0))
    }

    /// Discard claim markers below `sequence`, keeping the floor intact
    ///
    /// Best effort: a marker that fails to delete is retried by some
    /// later append's pruning pass.
    fn prune_markers(&self, identifier: &str, sequence: u64) {
        let Ok(keys) = self.store.list_keys(&Self::marker_prefix(identifier)) else {
            return;
        };
        for key in keys {
            if matches!(Self::parse_marker(identifier, &key), Some(value) if value < sequence) {
                let _ = self.store.delete(&key);
            }
        }
    }

    /// Append `payload` as the new tail of the identifier's queue
    ///
    /// Returns the assigned sequence number. A number is assigned by
    /// winning the create-new write of its claim marker; because the
    /// highest marker survives every drain and clear, numbers keep
    /// increasing for the lifetime of the medium and are never reused,
    /// even after the queue empties completely.
    pub fn append(&self, identifier: &str, payload: &[u8]) -> QueueResult<u64> {
        let append_failed = |source| QueueError::AppendFailed {
            identifier: identifier.to_string(),
            source,
        };

        let keys = self
            .store
            .list_keys(&Self::prefix(identifier))
            .map_err(append_failed)?;
        let persisted_high = keys
            .iter()
            .rev()
            .find_map(|key| Self::parse_sequence(identifier, key))
            .unwrap_or(0);
        let claimed_high = self.highest_claimed(identifier).map_err(append_failed)?;
        let mut sequence = persisted_high.max(claimed_high) + 1;

        for _ in 0..MAX_APPEND_ATTEMPTS {
            // Claim the number by creating its marker.
            match self.store.write(&Self::marker_key(identifier, sequence), &[]) {
                Ok(()) => {}
                Err(StorageError::KeyExists { .. }) => {
                    // Another appender claimed this number first.
                    sequence += 1;
                    continue;
                }
                Err(source) => return Err(append_failed(source)),
            }

            // A stale starting point can win a claim below numbers
            // already handed out elsewhere. Re-listing after the claim
            // catches that; the abandoned marker is pruned later.
            let current_high = self.highest_claimed(identifier).map_err(append_failed)?;
            if current_high > sequence {
                sequence = current_high + 1;
                continue;
            }

            match self.store.write(&Self::key(identifier, sequence), payload) {
                Ok(()) => {
                    self.prune_markers(identifier, sequence);
                    return Ok(sequence);
                }
                Err(StorageError::KeyExists { .. }) => {
                    sequence += 1;
                }
                Err(source) => return Err(append_failed(source)),
            }
        }

        Err(QueueError::AppendContention {
            identifier: identifier.to_string(),
            attempts: MAX_APPEND_ATTEMPTS,
        })
    }

    /// Remove and return every currently-queued message, oldest first
    ///
    /// A message is delivered only if this drain won its delete, which
    /// keeps consumption at-most-once when drains race. An unreadable
    /// entry ends the batch early so that, once it becomes readable
    /// again, it is still delivered before anything queued behind it.
    pub fn drain_all(&self, identifier: &str) -> QueueResult<Vec<Message>> {
        let keys = self.store.list_keys(&Self::prefix(identifier))?;

        let mut messages = Vec::new();
        for key in keys {
            let Some(sequence) = Self::parse_sequence(identifier, &key) else {
                continue;
            };

            let payload = match self.store.read(&key) {
                Ok(Some(bytes)) => bytes,
                // Already consumed by a racing drain.
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Unreadable queue entry '{}', ending drain early: {}", key, e);
                    break;
                }
            };

            match self.store.delete(&key) {
                Ok(true) => messages.push(Message { sequence, payload }),
                // A racing drain won this message.
                Ok(false) => {}
                Err(e) => {
                    log::warn!(
                        "Failed to remove queue entry '{}', leaving it for the next drain: {}",
                        key,
                        e
                    );
                    break;
                }
            }
        }

        Ok(messages)
    }

    /// Remove and return only the oldest queued message
    ///
    /// Used for single-message polling access without a listener.
    pub fn drain_one(&self, identifier: &str) -> QueueResult<Option<Message>> {
        let keys = self.store.list_keys(&Self::prefix(identifier))?;

        for key in keys {
            let Some(sequence) = Self::parse_sequence(identifier, &key) else {
                continue;
            };

            let payload = match self.store.read(&key) {
                Ok(Some(bytes)) => bytes,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Unreadable queue entry '{}', nothing polled: {}", key, e);
                    return Ok(None);
                }
            };

            match self.store.delete(&key) {
                Ok(true) => return Ok(Some(Message { sequence, payload })),
                Ok(false) => continue,
                Err(e) => {
                    log::warn!(
                        "Failed to remove queue entry '{}', leaving it for the next poll: {}",
                        key,
                        e
                    );
                    return Ok(None);
                }
            }
        }

        Ok(None)
    }

    /// Return current queue contents, oldest first, without consuming
    pub fn peek_all(&self, identifier: &str) -> QueueResult<Vec<Message>> {
        let keys = self.store.list_keys(&Self::prefix(identifier))?;

        let mut messages = Vec::new();
        for key in keys {
            let Some(sequence) = Self::parse_sequence(identifier, &key) else {
                continue;
            };

            match self.store.read(&key) {
                Ok(Some(payload)) => messages.push(Message { sequence, payload }),
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Unreadable queue entry '{}', ending peek early: {}", key, e);
                    break;
                }
            }
        }

        Ok(messages)
    }

    /// Delete all queued messages for the identifier
    ///
    /// Succeeds silently when the queue is already empty.
    pub fn clear(&self, identifier: &str) -> QueueResult<()> {
        let keys = self.store.list_keys(&Self::prefix(identifier))?;

        for key in keys {
            if Self::parse_sequence(identifier, &key).is_none() {
                continue;
            }
            self.store.delete(&key)?;
        }

        Ok(())
    }

    /// Number of messages currently queued for the identifier
    pub fn queued_count(&self, identifier: &str) -> QueueResult<usize> {
        let keys = self.store.list_keys(&Self::prefix(identifier))?;
        Ok(keys
            .iter()
            .filter(|key| Self::parse_sequence(identifier, key).is_some())
            .count())
    }

    /// Whether any message is currently queued for the identifier
    pub fn has_queued(&self, identifier: &str) -> QueueResult<bool> {
        Ok(self.queued_count(identifier)? > 0)
    }
}
