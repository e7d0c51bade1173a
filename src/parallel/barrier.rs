//! Counting completion barrier.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Blocks the orchestrator until every registered task has checked in.
///
/// Unlike [`std::sync::Barrier`] the participants are not symmetric: the
/// orchestrator registers `n` tasks up front, each task calls
/// [`complete_one`](Self::complete_one) exactly once, and only the
/// orchestrator waits. The last task to bring the count to zero wakes it.
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    pending: Mutex<usize>,
    all_done: Condvar,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Announces `tasks` more tasks that must complete before [`wait`](Self::wait)
    /// returns.
    pub fn register(&self, tasks: usize) {
        *self.lock() += tasks;
    }

    /// Signals that one registered task has finished.
    pub fn complete_one(&self) {
        let mut pending = self.lock();
        debug_assert!(*pending > 0, "more completions than registered tasks");
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.all_done.notify_all();
        }
    }

    /// Blocks until no registered task is outstanding. Returns immediately if
    /// nothing was registered.
    pub fn wait(&self) {
        let mut pending = self.lock();
        while *pending > 0 {
            pending = self
                .all_done
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Number of tasks that have not signaled completion yet.
    pub fn pending(&self) -> usize {
        *self.lock()
    }
}
