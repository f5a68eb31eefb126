//! Public API for the wormhole core
//!
//! This module provides the complete public API for the wormhole core.
//! External modules should import from here rather than directly from
//! internal modules.

// The wormhole endpoint (the typed layer is inherent methods on it)
pub use crate::wormhole::manager::Wormhole;

// Listener callback signature
pub use crate::wormhole::registry::ListenerCallback;

// Error handling
pub use crate::wormhole::error::{WormholeError, WormholeResult};
