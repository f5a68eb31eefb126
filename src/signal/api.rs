//! Public API for the signal layer
//!
//! This module provides the complete public API for the signal layer.
//! External modules should import from here rather than directly from
//! internal modules.

// In-process hub implementation
pub use crate::signal::hub::{LocalSignalHub, SignalEndpoint};

// Error handling
pub use crate::signal::error::{SignalError, SignalResult};

// Traits
pub use crate::signal::traits::{SignalCallback, SignalTransport};
