//! Storage Error Types

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Key already exists: {key}")]
    KeyExists { key: String },

    #[error("Write failed for key '{key}': {message}")]
    WriteFailed { key: String, message: String },

    #[error("Read failed for key '{key}': {message}")]
    ReadFailed { key: String, message: String },

    #[error("Delete failed for key '{key}': {message}")]
    DeleteFailed { key: String, message: String },

    #[error("Listing failed for prefix '{prefix}': {message}")]
    ListFailed { prefix: String, message: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
