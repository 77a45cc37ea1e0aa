//! Per-handle mutual exclusion for mutating operations.
//!
//! Backed by `tokio::sync::Mutex`, which queues waiters in FIFO order and
//! hands the lock straight to the next waiter on release. The guard is
//! RAII, so the lock is released on every exit path, errors and dropped
//! futures included.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
pub struct OperationLock {
    inner: Mutex<()>,
    waiting: AtomicUsize,
}

/// Held for the duration of one operation, all of its steps included.
#[derive(Debug)]
pub struct OperationGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// Decrements the waiter count even if the acquiring future is dropped.
struct Waiting<'a>(&'a AtomicUsize);

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl OperationLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the lock. Resolves immediately when it is free.
    pub async fn acquire(&self) -> OperationGuard<'_> {
        if let Ok(guard) = self.inner.try_lock() {
            return OperationGuard { _guard: guard };
        }

        self.waiting.fetch_add(1, Ordering::SeqCst);
        let _waiting = Waiting(&self.waiting);
        debug!(queued = self.queued(), "operation queued behind a running one");
        OperationGuard {
            _guard: self.inner.lock().await,
        }
    }

    /// Whether an operation currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    /// Operations waiting for the lock.
    pub fn queued(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}
