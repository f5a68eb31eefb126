//! Public API for the storage layer
//!
//! This module provides the complete public API for the storage layer.
//! External modules should import from here rather than directly from
//! internal modules.

// Storage implementations
pub use crate::storage::file::FileStore;
pub use crate::storage::memory::MemoryStore;

// Error handling
pub use crate::storage::error::{StorageError, StorageResult};

// Traits
pub use crate::storage::traits::MessageStore;
