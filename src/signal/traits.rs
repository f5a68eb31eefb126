//! Traits for the signal layer

use crate::signal::error::SignalResult;
use std::sync::Arc;

/// Callback invoked when a signal for a subscribed name arrives
///
/// Carries no payload: the number of invocations is not reliably equal
/// to the number of broadcasts (coalescing), so the callback must go and
/// inspect whatever state the signal advertises rather than count.
pub type SignalCallback = Arc<dyn Fn() + Send + Sync>;

/// Fire-and-forget broadcast signaling between processes
///
/// Implementations may invoke callbacks on an arbitrary thread,
/// concurrently with application calls into whatever component
/// subscribed. Delivery is best-effort: broadcasts sent while no process
/// observes the name are lost, and several broadcasts of one name may
/// coalesce into a single callback invocation.
pub trait SignalTransport: Send + Sync {
    /// Broadcast a named signal to all processes observing `name`
    ///
    /// The broadcasting process's own subscription, if any, is signaled
    /// too.
    fn broadcast(&self, name: &str) -> SignalResult<()>;

    /// Register interest in `name`, replacing any previous callback
    /// this transport handle registered for it
    fn subscribe(&self, name: &str, callback: SignalCallback);

    /// Remove interest in `name`; no-op if not subscribed
    fn unsubscribe(&self, name: &str);
}
