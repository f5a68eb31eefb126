//! Storage Collaborator
//!
//! Durable keyed byte-blob storage, enumerable by key prefix. The queue
//! layer builds its ordering and at-most-once guarantees on top of this
//! interface, so implementations only need three primitives beyond plain
//! reads: create-new writes (a write to an existing key fails), deletes
//! that report whether the key existed, and stable lexicographic
//! ordering from `list_keys`.
//!
//! Two implementations are provided: [`file::FileStore`] persists each
//! key as a file under a shared root directory (the cross-process
//! medium), and [`memory::MemoryStore`] keeps everything in a process-
//! local map for tests and single-process use.

pub(crate) mod error;
pub(crate) mod file;
pub(crate) mod memory;
pub(crate) mod traits;

// Public API module - the only public interface for the storage layer
pub mod api;

#[cfg(test)]
mod tests;
