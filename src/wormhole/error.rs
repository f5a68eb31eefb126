//! Wormhole Error Types

use crate::queue::QueueError;

#[derive(Debug, thiserror::Error)]
pub enum WormholeError {
    #[error("Invalid identifier: {reason}")]
    InvalidIdentifier { reason: String },

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Failed to encode message for identifier '{identifier}': {message}")]
    Encoding { identifier: String, message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },
}

/// Result type for wormhole operations
pub type WormholeResult<T> = Result<T, WormholeError>;
