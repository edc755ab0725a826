// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! A per-context lock that admits one critical section at a time. Contenders
//! are queued and admitted in the order they first asked for the lock.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, MutexGuard};
use tracing::trace;

#[derive(Debug, Default)]
pub struct SerializationLock<T> {
    // tokio's mutex hands the lock to waiters strictly first-in-first-out
    inner: Mutex<T>,
    waiting: AtomicUsize,
}

impl<T> SerializationLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
            waiting: AtomicUsize::new(0),
        }
    }

    /// Number of critical sections currently queued behind the holder.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::Acquire)
    }

    /// Runs `section` with exclusive access to the guarded value once every
    /// earlier contender has finished.
    ///
    /// The section is synchronous, so the lock is never held across a
    /// suspension point. If `section` panics the lock is still released.
    pub async fn run<F, R>(&self, section: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.acquire().await;
        section(&mut *guard)
    }

    async fn acquire(&self) -> MutexGuard<'_, T> {
        if let Ok(guard) = self.inner.try_lock() {
            return guard;
        }

        let _waiter = WaiterCount::new(&self.waiting);
        trace!(waiting = self.waiting(), "Critical section queued");
        self.inner.lock().await
    }
}

/// Keeps `SerializationLock::waiting` accurate even if a queued future is
/// dropped before it is admitted.
struct WaiterCount<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> WaiterCount<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self { counter }
    }
}

impl Drop for WaiterCount<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{future::join_all, poll};
    use std::{pin::pin, sync::Arc, time::Duration};
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_admission_is_fifo() {
        let lock = SerializationLock::new(Vec::new());
        let holder = lock.inner.lock().await;

        let mut sections: Vec<_> = (0..5)
            .map(|i| Box::pin(lock.run(move |order: &mut Vec<usize>| order.push(i))))
            .collect();
        // Queue the sections in order while the lock is held
        for section in sections.iter_mut() {
            assert!(poll!(section.as_mut()).is_pending());
        }
        assert_eq!(lock.waiting(), 5);

        drop(holder);
        // Drive them in reverse; admission order must not change
        sections.reverse();
        join_all(sections).await;

        assert_eq!(lock.waiting(), 0);
        assert_eq!(*lock.inner.lock().await, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_dropped_waiter_does_not_block_queue() {
        let lock = SerializationLock::new(0u32);
        let holder = lock.inner.lock().await;

        {
            let mut abandoned = pin!(lock.run(|value| *value += 100));
            assert!(poll!(abandoned.as_mut()).is_pending());
            assert_eq!(lock.waiting(), 1);
        }
        assert_eq!(lock.waiting(), 0);

        drop(holder);
        lock.run(|value| *value += 1).await;
        assert_eq!(lock.run(|value| *value).await, 1);
    }

    #[tokio::test]
    async fn test_panicking_section_releases_lock() {
        let lock = Arc::new(SerializationLock::new(0u32));
        let failed = tokio::spawn({
            let lock = lock.clone();
            async move {
                lock.run(|_: &mut u32| -> u32 { panic!("section failed") })
                    .await
            }
        })
        .await;
        assert!(failed.unwrap_err().is_panic());

        lock.run(|value| *value += 1).await;
        assert_eq!(lock.run(|value| *value).await, 1);
        assert_eq!(lock.waiting(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_lost_updates_across_threads() {
        const NUM_TASKS: u64 = 500;
        let lock = Arc::new(SerializationLock::new(0u64));

        let handles: Vec<_> = (0..NUM_TASKS)
            .map(|_| {
                let lock = lock.clone();
                tokio::spawn(async move {
                    sleep(Duration::from_millis(1)).await;
                    lock.run(|value| {
                        let current = *value;
                        *value = current + 1;
                    })
                    .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(lock.run(|value| *value).await, NUM_TASKS);
    }
}
