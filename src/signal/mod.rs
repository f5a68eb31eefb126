//! Signal Collaborator
//!
//! Best-effort, payload-less cross-process wakeup signaling. A signal
//! carries nothing but its name: it only tells listening processes that
//! "something changed" for that name. Delivery may be lost when nobody
//! is observing and rapid-fire broadcasts may be coalesced into a single
//! callback, so consumers must treat a callback as "go look", never as
//! "one message arrived".
//!
//! The [`traits::SignalTransport`] trait is the seam for real transports
//! (Darwin notification centers, D-Bus, a session message channel).
//! [`hub::LocalSignalHub`] is the bundled implementation: an in-process
//! broadcast fabric whose endpoints model separate processes sharing a
//! notification namespace, used by tests and single-process setups.

pub(crate) mod error;
pub(crate) mod hub;
pub(crate) mod traits;

// Public API module - the only public interface for the signal layer
pub mod api;

#[cfg(test)]
mod tests;
