//! Wormhole Core Component
//!
//! The public face of the crate: a [`manager::Wormhole`] ties one queue
//! store and one signal transport together into queued, ordered,
//! deliver-exactly-once-per-message channels named by identifier.
//!
//! # Delivery model
//!
//! ```text
//!  process A                    shared medium                 process B
//! ┌──────────┐  append   ┌────────────────────────┐  drain   ┌──────────┐
//! │  send()  ├──────────►│  QueueStore (storage)  │◄─────────┤ listener │
//! └────┬─────┘           └────────────────────────┘          └────▲─────┘
//!      │        broadcast ┌───────────────────────┐  callback     │
//!      └─────────────────►│    SignalTransport    ├───────────────┘
//!                         └───────────────────────┘
//! ```
//!
//! `send` appends to the queue and broadcasts a wakeup signal. A signal
//! callback, or a fresh `listen` registration, drains the whole queue
//! for that identifier and hands the batch to the registered listener in
//! order. Draining everything on any trigger is what makes coalesced or
//! lost signals harmless: the queue is the source of truth, the signal
//! is only a latency optimization over polling.
//!
//! # Listeners
//!
//! At most one listener per identifier per process; registering again
//! silently replaces the previous listener. Listener callbacks run under
//! the wormhole's internal lock and may call `send` re-entrantly, but
//! must not call `listen` or `stop_listening`.

pub(crate) mod error;
pub(crate) mod manager;
pub(crate) mod registry;
pub(crate) mod typed;

// Public API module - the only public interface for the wormhole core
pub mod api;

#[cfg(test)]
mod tests;
