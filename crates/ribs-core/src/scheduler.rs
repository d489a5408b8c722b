//! Callback-style operation scheduling.
//!
//! For callers that are not async themselves: [`Scheduler::schedule`] runs
//! prepare immediately and reports validation errors synchronously, then
//! finishes the operation on its own runtime and hands the outcome to a
//! callback.

use std::future::Future;

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::config::{ConfigError, SchedulerConfig};
use crate::matrix::Image;
use crate::operation::{Operation, OperationError};
use crate::task::Task;

/// Owns the runtime operations are processed on.
///
/// Dropping a scheduler from inside an async context panics, as for any
/// tokio runtime.
pub struct Scheduler {
    runtime: Runtime,
}

impl Scheduler {
    pub fn new(config: &SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .max_blocking_threads(config.max_blocking_threads)
            .thread_name(config.thread_name.clone())
            .build()?;

        debug!(
            worker_threads = config.worker_threads,
            max_blocking_threads = config.max_blocking_threads,
            "scheduler started"
        );
        Ok(Self { runtime })
    }

    /// Prepare an operation and run the rest of it in the background.
    ///
    /// Prepare errors are returned directly and `callback` is never called.
    /// Otherwise `callback` is called exactly once, from a runtime thread,
    /// with the value or the process error.
    pub fn schedule<O, F>(&self, image: &Image, args: O::Args, callback: F) -> Result<(), OperationError>
    where
        O: Operation,
        F: FnOnce(Result<O::Value, OperationError>) + Send + 'static,
    {
        let task = Task::<O>::prepare(image, args)?;
        self.runtime.spawn(async move {
            callback(task.run().await);
        });
        Ok(())
    }

    /// Drive a future to completion on this scheduler's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
