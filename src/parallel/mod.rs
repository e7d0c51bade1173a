//! Parallel execution engine shared by all pipeline stages.
//!
//! A stage is expressed as a function over a contiguous index range. The
//! [`ParallelExecutionContext`] cuts `[0, item_count)` into at most one range
//! per worker, queues one task per range on its persistent [`ThreadPool`],
//! and lets the orchestrator block on a [`CompletionBarrier`] until all of
//! them have finished.
//!
//! ```text
//!   orchestrator        worker 0        worker 1        worker 2
//!   dispatch ──────────► [0, 3)  ──────► [3, 6)  ──────► [6, 10)
//!   barrier ┐               │               │               │
//!           │ ◄─────────── done ◄────────── done ◄────────── done
//!           └─► next stage
//! ```

mod barrier;
mod pool;

pub use barrier::CompletionBarrier;
pub use pool::ThreadPool;

use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use log::trace;

use crate::error::RenderError;

/// Splits `[0, item_count)` into `min(workers, item_count)` contiguous ranges.
///
/// Every range has `item_count / chunks` items except the last one, which
/// absorbs the remainder. Returns an empty list when there is nothing to do.
pub fn partition(item_count: usize, workers: usize) -> Vec<Range<usize>> {
    let chunks = workers.max(1).min(item_count);
    if chunks == 0 {
        return Vec::new();
    }

    let base = item_count / chunks;
    (0..chunks)
        .map(|i| {
            let start = i * base;
            let end = if i + 1 == chunks { item_count } else { start + base };
            start..end
        })
        .collect()
}

/// Worker pool plus the barrier that coordinates it.
///
/// Owned by the renderer; independent renderers never share coordination
/// state. Dropping the context waits for in-flight tasks and then joins the
/// workers.
pub struct ParallelExecutionContext {
    pool: ThreadPool,
    barrier: Arc<CompletionBarrier>,
}

impl ParallelExecutionContext {
    /// Starts `workers` threads (at least one).
    pub fn new(workers: usize) -> Result<Self, RenderError> {
        Ok(Self {
            pool: ThreadPool::new(workers.max(1))?,
            barrier: Arc::new(CompletionBarrier::new()),
        })
    }

    /// Starts one worker per available hardware thread.
    pub fn with_available_parallelism() -> Result<Self, RenderError> {
        Self::new(available_workers())
    }

    pub fn worker_count(&self) -> usize {
        self.pool.size()
    }

    /// Fans `stage` out over `[0, item_count)` and returns without waiting.
    ///
    /// Returns the number of tasks submitted; zero items submit nothing.
    pub fn dispatch<F>(&self, item_count: usize, stage: F) -> usize
    where
        F: Fn(Range<usize>) + Send + Sync + 'static,
    {
        let ranges = partition(item_count, self.worker_count());
        if ranges.is_empty() {
            return 0;
        }

        let tasks = ranges.len();
        trace!("dispatching {item_count} items as {tasks} tasks");
        self.barrier.register(tasks);

        let stage = Arc::new(stage);
        for (slot, range) in ranges.into_iter().enumerate() {
            let stage = Arc::clone(&stage);
            let barrier = Arc::clone(&self.barrier);
            self.pool.execute(
                slot,
                Box::new(move || {
                    stage(range);
                    // Release captured frame data before the orchestrator wakes.
                    drop(stage);
                    barrier.complete_one();
                }),
            );
        }
        tasks
    }

    /// Blocks until every task dispatched since the previous barrier is done.
    pub fn barrier(&self) {
        self.barrier.wait();
    }

    /// Parallel map: evaluates `f` for every index, waits, and returns the
    /// results in index order.
    pub fn map_ranges<T, F>(&self, item_count: usize, f: F) -> Vec<T>
    where
        T: Send + 'static,
        F: Fn(usize) -> T + Send + Sync + 'static,
    {
        let chunks: Arc<Mutex<Vec<(usize, Vec<T>)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&chunks);

        self.dispatch(item_count, move |range| {
            let start = range.start;
            let out: Vec<T> = range.map(&f).collect();
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((start, out));
        });
        self.barrier();

        let mut chunks = std::mem::take(&mut *chunks.lock().unwrap_or_else(PoisonError::into_inner));
        chunks.sort_unstable_by_key(|(start, _)| *start);

        let mut result = Vec::with_capacity(item_count);
        for (_, chunk) in chunks {
            result.extend(chunk);
        }
        result
    }
}

impl Drop for ParallelExecutionContext {
    fn drop(&mut self) {
        self.barrier.wait();
    }
}

/// Hardware concurrency, falling back to a single worker.
pub fn available_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_covers_every_index_once() {
        for items in 0..40 {
            for workers in 1..9 {
                let ranges = partition(items, workers);
                let covered: Vec<usize> = ranges.iter().cloned().flatten().collect();
                assert_eq!(covered, (0..items).collect::<Vec<_>>());
                assert_eq!(ranges.len(), workers.min(items));
            }
        }
    }

    #[test]
    fn last_range_absorbs_remainder() {
        let ranges = partition(10, 3);
        assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn zero_items_is_a_no_op() {
        let context = ParallelExecutionContext::new(4).unwrap();
        assert_eq!(context.dispatch(0, |_| panic!("must not run")), 0);
        context.barrier();
    }

    #[test]
    fn map_ranges_preserves_index_order() {
        let context = ParallelExecutionContext::new(3).unwrap();
        let squares = context.map_ranges(17, |i| i * i);
        assert_eq!(squares, (0..17).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn worker_count_is_at_least_one() {
        let context = ParallelExecutionContext::new(0).unwrap();
        assert_eq!(context.worker_count(), 1);
    }
}
