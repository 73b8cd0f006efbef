// CLASSIFICATION: COMMUNITY
// Filename: sync.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, recovering the guard if a core thread panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `f` with the lock held.
pub(crate) fn with_lock<T, R>(mutex: &Mutex<T>, f: impl FnOnce(&mut T) -> R) -> R {
    let mut guard = lock(mutex);
    f(&mut guard)
}
