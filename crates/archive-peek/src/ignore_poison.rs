//! Extension trait to ignore mutex poisoning.
//!
//! The mutexes in this crate guard plain counters, the listing cache, and poll state. A panic in a
//! backend thread leaves those values usable, so `.lock_ignore_poison()` recovers the guard
//! instead of cascading the panic into the poll loop.

use std::sync::{Mutex, MutexGuard};

pub trait IgnorePoison<T> {
    /// Locks the mutex, taking the inner guard if a previous holder panicked.
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnorePoison<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|e| e.into_inner())
    }
}
