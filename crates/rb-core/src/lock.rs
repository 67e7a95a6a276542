//! Named reentrant lock with a scoped guard.
//!
//! [`ReentrantLock`] serializes access to state the engine shares between a
//! producer (capture/ingest) and a consumer (conversion) context, such as the
//! pool of pending containers. The owning thread may lock it again while it
//! already holds it; each [`ScopedReentrantLock`] releases exactly one hold
//! when dropped, and other threads can acquire the lock only once every hold
//! has been released.
//!
//! There is no timeout and no try-acquire. Holding two different locks from
//! two threads in opposite orders deadlocks; callers keep a consistent lock
//! order.
//!
//! The guard hands out `&T`, so shared state that needs mutation lives in a
//! `Cell` or `RefCell`:
//!
//! ```
//! use std::cell::RefCell;
//! use rb_core::ReentrantLock;
//!
//! let pool = ReentrantLock::new("pool", RefCell::new(Vec::<u32>::new()));
//! let outer = pool.lock();
//! outer.borrow_mut().push(1);
//! {
//!     let inner = pool.lock();
//!     inner.borrow_mut().push(2);
//!     assert_eq!(pool.hold_count(), 2);
//! }
//! assert_eq!(outer.borrow().len(), 2);
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// A named reentrant mutex with an explicit hold count.
pub struct ReentrantLock<T> {
    name: &'static str,
    holds: AtomicUsize,
    inner: ReentrantMutex<T>,
}

impl<T> ReentrantLock<T> {
    /// Create a new unlocked lock guarding `value`.
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            holds: AtomicUsize::new(0),
            inner: ReentrantMutex::new(value),
        }
    }

    /// Name used in trace output.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Acquire the lock, blocking until it is available.
    ///
    /// Succeeds immediately when the current thread already holds it.
    pub fn lock(&self) -> ScopedReentrantLock<'_, T> {
        let guard = self.inner.lock();
        let depth = self.holds.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::trace!(lock = self.name, depth, "acquired");
        ScopedReentrantLock { lock: self, guard }
    }

    /// Number of outstanding holds.
    ///
    /// Only meaningful on the thread that currently owns the lock; any other
    /// thread may observe a value that is already stale.
    pub fn hold_count(&self) -> usize {
        self.holds.load(Ordering::Acquire)
    }

    /// Consume the lock and return the guarded value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T> fmt::Debug for ReentrantLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReentrantLock")
            .field("name", &self.name)
            .field("holds", &self.hold_count())
            .finish_non_exhaustive()
    }
}

/// RAII guard for one hold on a [`ReentrantLock`].
///
/// Dropping the guard releases exactly that hold, whether the scope ends
/// normally, returns early, propagates an error, or unwinds.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ScopedReentrantLock<'a, T> {
    lock: &'a ReentrantLock<T>,
    // Dropped after `Drop::drop` runs, so the count is decremented while the
    // mutex is still held.
    guard: ReentrantMutexGuard<'a, T>,
}

impl<T> ScopedReentrantLock<'_, T> {
    /// Name of the lock this guard holds.
    pub fn name(&self) -> &'static str {
        self.lock.name
    }
}

impl<T> Deref for ScopedReentrantLock<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> Drop for ScopedReentrantLock<'_, T> {
    fn drop(&mut self) {
        let depth = self.lock.holds.fetch_sub(1, Ordering::AcqRel) - 1;
        tracing::trace!(lock = self.lock.name, depth, "released");
    }
}
