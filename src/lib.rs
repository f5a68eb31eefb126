//! Queued, ordered message passing between otherwise-isolated processes.
//!
//! A `Wormhole` lets two processes that share a storage medium (for example
//! a host application and an extension sharing a container directory)
//! exchange identifier-keyed messages without a persistent connection.
//! Every message sent under an identifier is delivered to a listener
//! exactly once, in send order, even if the listener registered after the
//! messages were sent.
//!
//! The storage medium and the cross-process wakeup transport are seams:
//! see [`storage::api::MessageStore`] and [`signal::api::SignalTransport`].

pub mod core;
pub mod queue;
pub mod signal;
pub mod storage;
pub mod wormhole;
