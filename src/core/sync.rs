//! Synchronization utilities for robust mutex handling
//!
//! Converts lock poisoning into application-specific errors so that a
//! panic in one listener callback does not silently wedge every later
//! call that touches the same lock.

use std::sync::{LockResult, MutexGuard};

/// Handle poisoned mutex cases with consistent error handling
///
/// Converts a mutex poison error into an application error using the
/// provided constructor. A poisoned mutex means a panic occurred while
/// the lock was held.
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use wormhole::core::sync::handle_mutex_poison;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(mutex.lock(), |msg| msg).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<MutexGuard<'_, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<MutexGuard<'_, T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). A panic occurred while the lock was held. PoisonError: {:?}",
            poison_err
        ))
    })
}
