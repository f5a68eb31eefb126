//! Public API for the queue layer
//!
//! This module provides the complete public API for the queue layer.
//! External modules should import from here rather than directly from
//! internal modules.

// Core queue components
pub use crate::queue::message::Message;
pub use crate::queue::store::QueueStore;

// Error handling
pub use crate::queue::error::QueueError;
pub use crate::queue::QueueResult;
