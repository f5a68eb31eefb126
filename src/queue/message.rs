//! Message type for the queue layer

/// One queued message: an opaque payload plus the sequence number the
/// queue assigned at append time
///
/// Sequence numbers are monotonic per identifier and strictly increasing
/// among the messages currently queued; they need not be contiguous
/// after drains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sequence number within the identifier's queue
    pub sequence: u64,
    /// Opaque payload bytes; the queue never inspects them
    pub payload: Vec<u8>,
}
