//! Synchronization helpers shared by the coordinator, bus, and references.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, recovering the guard if a previous holder panicked.
///
/// All shared tables in this crate are updated with short, self-contained
/// critical sections, so the data behind a poisoned lock is still consistent.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
