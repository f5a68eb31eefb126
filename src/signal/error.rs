//! Signal Error Types

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Broadcast failed for signal '{name}': {message}")]
    BroadcastFailed { name: String, message: String },
}

/// Result type for signal operations
pub type SignalResult<T> = Result<T, SignalError>;
