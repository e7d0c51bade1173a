//! Fixed-size pool of persistent worker threads.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::error::RenderError;

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

struct Worker {
    sender: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

/// A fixed-size thread pool.
///
/// Every worker owns its own job queue, so a job sent to worker `i` always
/// runs on that thread. Workers live until the pool is dropped.
///
/// A job that panics takes the whole process down: the frame that was being
/// built can never complete, and the orchestrator would otherwise wait on
/// its barrier forever.
pub struct ThreadPool {
    workers: Vec<Worker>,
}

impl ThreadPool {
    /// Create a new thread pool with the specified number of threads.
    pub fn new(size: usize) -> Result<Self, RenderError> {
        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            let (tx, rx) = channel::<Job>();
            let handle = thread::Builder::new()
                .name(format!("raster-worker-{index}"))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            error!("render worker {index} panicked, aborting");
                            std::process::abort();
                        }
                    }
                })
                .map_err(|source| RenderError::WorkerSpawn { index, source })?;
            workers.push(Worker {
                sender: Some(tx),
                handle: Some(handle),
            });
        }
        debug!("thread pool started with {size} workers");
        Ok(Self { workers })
    }

    /// Queue `job` on worker `slot % size`.
    pub(crate) fn execute(&self, slot: usize, job: Job) {
        let worker = &self.workers[slot % self.workers.len()];
        let delivered = worker
            .sender
            .as_ref()
            .map(|sender| sender.send(job).is_ok())
            .unwrap_or(false);
        if !delivered {
            error!("render worker {} is gone, aborting", slot % self.workers.len());
            std::process::abort();
        }
    }

    /// Get the number of threads in the pool.
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Closing every queue first lets all workers wind down in parallel.
        for worker in &mut self.workers {
            worker.sender.take();
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
    }
}
