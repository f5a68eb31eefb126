//! Queue Store Component
//!
//! One ordered, durable queue per identifier, persisted through the
//! storage layer. This is where the delivery guarantees live: append
//! assigns monotonic sequence numbers derived from persisted state, and
//! drains remove and return messages oldest-first with at-most-once
//! consumption per message, even when another process is appending or
//! draining the same medium concurrently.
//!
//! # Key scheme
//!
//! A message for identifier `id` with sequence `n` is stored under the
//! key `id/NNNNNNNNNN` (zero-padded to 10 digits), so the storage
//! layer's lexicographic `list_keys` order is exactly sequence order.
//! Each assigned number also leaves an empty claim marker under
//! `id/seq/NNNNNNNNNN`. Markers are never consumed by drains; the
//! highest one is the persistent floor that keeps sequence numbers
//! increasing across process restarts and across the queue emptying
//! completely, so a number handed out once is never handed out again.
//!
//! # Concurrency
//!
//! Appends rely on the store's create-new write semantics: a sequence
//! number is assigned by winning the create-new write of its claim
//! marker, so two processes can never assign the same number, and the
//! loser just retries with the next one. Drains rely on the store's
//! existence-reporting delete: a message is delivered only by the
//! drain that won its delete, so racing drains split a queue but never
//! duplicate a message. An append racing a drain either lands in the
//! returned batch or is left for the next drain.

mod error;
mod message;
mod store;

pub use error::QueueError;
pub use message::Message;
pub use store::QueueStore;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

// Public API module - the only public interface for the queue layer
pub mod api;

#[cfg(test)]
mod tests;
