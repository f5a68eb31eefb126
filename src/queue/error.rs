//! Queue Error Types

use crate::storage::error::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Append failed for identifier '{identifier}': {source}")]
    AppendFailed {
        identifier: String,
        #[source]
        source: StorageError,
    },

    #[error("Append for identifier '{identifier}' gave up after {attempts} contested sequence numbers")]
    AppendContention { identifier: String, attempts: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
