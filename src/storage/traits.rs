//! Traits for the storage layer
//!
//! The [`MessageStore`] trait is the seam between the queue layer and the
//! concrete shared-storage medium. Anything that can satisfy its four
//! operations can back a wormhole: a directory of files, a key-value
//! container, an in-memory map.

use crate::storage::error::StorageResult;

/// Keyed byte-blob storage shared between processes
///
/// Keys are `/`-separated strings; the queue layer stores a message for
/// identifier `id` with sequence `n` under `id/NNNNNNNNNN` so that
/// lexicographic key order equals sequence order.
///
/// Implementations must be safe to use from several threads of one
/// process and from several processes over the same medium at once; the
/// queue layer's correctness rests on the exact semantics of `write`
/// and `delete` documented below.
pub trait MessageStore: Send + Sync {
    /// Persist `bytes` under `key`, failing if the key already exists
    ///
    /// The create-new semantics are what let two concurrent appenders
    /// race for the same sequence number without one overwriting the
    /// other: the loser gets [`StorageError::KeyExists`] and retries
    /// with the next number.
    ///
    /// Publication must be atomic: a concurrent `read` or `list_keys`
    /// from any process sees either no key or the complete blob, never
    /// a partial write.
    ///
    /// [`StorageError::KeyExists`]: crate::storage::api::StorageError::KeyExists
    fn write(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Read the blob stored under `key`, `None` if absent
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Delete `key`, reporting whether it existed
    ///
    /// Idempotent: deleting an absent key is `Ok(false)`, not an error.
    /// Exactly one of any set of racing deletes for the same key
    /// observes `Ok(true)`; the queue layer delivers a drained message
    /// only from the caller that won the delete.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// List all keys starting with `prefix`, in lexicographic order
    ///
    /// An unknown prefix yields an empty list. The ordering must be
    /// stable across calls and across processes.
    fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>>;
}
