//! Bounded worker pool for fan-out/fan-in evaluation.
//!
//! A fixed number of scoped threads pull task indices from a shared atomic
//! counter until the queue is drained. Results are reassembled in task order,
//! so the output does not depend on scheduling.

use std::{
    num::NonZeroUsize,
    panic,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

/// Runs indexed tasks on a fixed number of worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    workers: NonZeroUsize,
}

impl Default for WorkerPool {
    /// Uses one worker per available CPU.
    fn default() -> Self {
        let workers = thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        Self { workers }
    }
}

impl WorkerPool {
    #[must_use]
    pub const fn new(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    #[must_use]
    pub const fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Calls `task(i)` for every `i` in `0..len` and returns the results in index order.
    ///
    /// Blocks until every task is done. A panic in a task is propagated to the caller.
    pub fn map<T, F>(&self, len: usize, task: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        let next = &AtomicUsize::new(0);
        let task = &task;
        let workers = self.workers.get().min(len);
        let mut results = thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(move || {
                        let mut done = vec![];
                        loop {
                            let i = next.fetch_add(1, Ordering::Relaxed);
                            if i >= len {
                                break done;
                            }
                            done.push((i, task(i)));
                        }
                    })
                })
                .collect();
            let mut results = Vec::with_capacity(len);
            for handle in handles {
                match handle.join() {
                    Ok(done) => results.extend(done),
                    Err(payload) => panic::resume_unwind(payload),
                }
            }
            results
        });
        results.sort_unstable_by_key(|(i, _)| *i);
        debug_assert!(results.iter().enumerate().all(|(n, (i, _))| n == *i));
        results.into_iter().map(|(_, value)| value).collect()
    }
}
