//! Runs an [`Operation`] through its phases.
//!
//! A [`Task`] is created by running prepare on the caller's side. Driving it
//! runs process, then value, and cleanup always runs last, whichever way the
//! task exits (including a panic escaping process).

use tracing::{debug, trace};

use crate::matrix::Image;
use crate::operation::{Operation, OperationError};

/// Calls [`Operation::cleanup`] when dropped.
struct CleanupGuard<O: Operation>(O);

impl<O: Operation> Drop for CleanupGuard<O> {
    fn drop(&mut self) {
        trace!(operation = O::NAME, "cleanup");
        self.0.cleanup();
    }
}

/// A prepared operation waiting to be processed.
pub struct Task<O: Operation> {
    guard: CleanupGuard<O>,
}

impl<O: Operation> Task<O> {
    /// Run the prepare phase.
    ///
    /// Validation errors are returned here, before any processing is
    /// scheduled.
    pub fn prepare(image: &Image, args: O::Args) -> Result<Self, OperationError> {
        let op = O::prepare(image, args).inspect_err(|e| {
            debug!(operation = O::NAME, error = %e, "prepare failed");
        })?;
        Ok(Self {
            guard: CleanupGuard(op),
        })
    }

    /// Run process and value on the current thread.
    ///
    /// For hosts without a worker pool. On targets built with `panic = "abort"`
    /// (wasm32-unknown-unknown) a codec panic cannot be contained and aborts
    /// the module, so inputs must be rejected before they reach the codec.
    pub fn run_inline(self) -> Result<O::Value, OperationError> {
        let mut guard = self.guard;
        guard.0.process()?;
        Ok(guard.0.value())
    }

    /// Run process on the blocking thread pool, then value on the awaiting
    /// task.
    ///
    /// Must be awaited inside a tokio runtime. Process cannot be cancelled
    /// once started: dropping the future lets it run to completion in the
    /// background.
    #[cfg(feature = "runtime")]
    pub async fn run(self) -> Result<O::Value, OperationError> {
        let mut guard = self.guard;
        let (mut guard, processed) = tokio::task::spawn_blocking(move || {
            let processed = guard.0.process();
            (guard, processed)
        })
        .await
        .map_err(|e| {
            tracing::error!(operation = O::NAME, error = %e, "process task failed");
            OperationError::process(O::NAME)
        })?;

        processed?;
        Ok(guard.0.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// What the recording operation does in process.
    #[derive(Clone, Copy)]
    enum Outcome {
        Succeed,
        Fail,
        Panic,
    }

    /// Records the order in which phases run.
    struct Recorder {
        outcome: Outcome,
        log: Arc<Mutex<Vec<&'static str>>>,
        cleanups: Arc<AtomicUsize>,
    }

    impl Operation for Recorder {
        const NAME: &'static str = "recorder";

        type Args = (Outcome, Arc<Mutex<Vec<&'static str>>>, Arc<AtomicUsize>);
        type Value = &'static str;

        fn prepare(image: &Image, (outcome, log, cleanups): Self::Args) -> Result<Self, OperationError> {
            log.lock().unwrap().push("prepare");
            if image.is_empty() {
                return Err(OperationError::EmptyImage);
            }
            Ok(Self {
                outcome,
                log,
                cleanups,
            })
        }

        fn process(&mut self) -> Result<(), OperationError> {
            self.log.lock().unwrap().push("process");
            match self.outcome {
                Outcome::Succeed => Ok(()),
                Outcome::Fail => Err(OperationError::process(Self::NAME)),
                Outcome::Panic => panic!("recorder panicked in process"),
            }
        }

        fn value(&mut self) -> &'static str {
            self.log.lock().unwrap().push("value");
            "done"
        }

        fn cleanup(&mut self) {
            self.log.lock().unwrap().push("cleanup");
            self.cleanups.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        log: Arc<Mutex<Vec<&'static str>>>,
        cleanups: Arc<AtomicUsize>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                log: Arc::new(Mutex::new(Vec::new())),
                cleanups: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn prepare(&self, image: &Image, outcome: Outcome) -> Result<Task<Recorder>, OperationError> {
            Task::prepare(image, (outcome, self.log.clone(), self.cleanups.clone()))
        }

        fn phases(&self) -> Vec<&'static str> {
            self.log.lock().unwrap().clone()
        }

        fn cleanups(&self) -> usize {
            self.cleanups.load(Ordering::SeqCst)
        }
    }

    fn image() -> Image {
        Image::new(Matrix::filled(1, 1, [0, 0, 0]).unwrap())
    }

    #[test]
    fn test_inline_success_runs_phases_in_order() {
        let h = Harness::new();
        let result = h.prepare(&image(), Outcome::Succeed).unwrap().run_inline();

        assert_eq!(result, Ok("done"));
        assert_eq!(h.phases(), vec!["prepare", "process", "value", "cleanup"]);
        assert_eq!(h.cleanups(), 1);
    }

    #[test]
    fn test_inline_failure_skips_value() {
        let h = Harness::new();
        let result = h.prepare(&image(), Outcome::Fail).unwrap().run_inline();

        assert_eq!(result, Err(OperationError::process("recorder")));
        assert_eq!(h.phases(), vec!["prepare", "process", "cleanup"]);
        assert_eq!(h.cleanups(), 1);
    }

    #[test]
    fn test_prepare_failure_runs_nothing_else() {
        let h = Harness::new();
        let result = h.prepare(&Image::empty(), Outcome::Succeed);

        assert!(matches!(result, Err(OperationError::EmptyImage)));
        assert_eq!(h.phases(), vec!["prepare"]);
        assert_eq!(h.cleanups(), 0);
    }

    #[test]
    fn test_inline_panic_still_cleans_up() {
        let h = Harness::new();
        let task = h.prepare(&image(), Outcome::Panic).unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| task.run_inline()));

        assert!(result.is_err());
        assert_eq!(h.cleanups(), 1);
    }

    #[test]
    fn test_dropped_task_cleans_up() {
        let h = Harness::new();
        drop(h.prepare(&image(), Outcome::Succeed).unwrap());

        assert_eq!(h.phases(), vec!["prepare", "cleanup"]);
    }

    #[cfg(feature = "runtime")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_run_success() {
        let h = Harness::new();
        let result = h.prepare(&image(), Outcome::Succeed).unwrap().run().await;

        assert_eq!(result, Ok("done"));
        assert_eq!(h.phases(), vec!["prepare", "process", "value", "cleanup"]);
    }

    #[cfg(feature = "runtime")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_run_failure() {
        let h = Harness::new();
        let result = h.prepare(&image(), Outcome::Fail).unwrap().run().await;

        assert_eq!(result, Err(OperationError::process("recorder")));
        assert_eq!(h.phases(), vec!["prepare", "process", "cleanup"]);
    }

    #[cfg(feature = "runtime")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_run_uncontained_panic_becomes_process_error() {
        let h = Harness::new();
        let result = h.prepare(&image(), Outcome::Panic).unwrap().run().await;

        assert_eq!(result, Err(OperationError::process("recorder")));
        assert_eq!(h.cleanups(), 1);
        assert!(!h.phases().contains(&"value"));
    }

    #[cfg(feature = "runtime")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_encodes_share_image() {
        let image = Image::new(Matrix::filled(8, 8, [10, 20, 30]).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| tokio::spawn(image.encode("png", 0).unwrap().run()))
            .collect();

        for handle in handles {
            let bytes = handle.await.unwrap().unwrap();
            let decoded = ::image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (8, 8));
        }
    }
}
