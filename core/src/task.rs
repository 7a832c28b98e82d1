//! Handle to one in-flight request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use uuid::Uuid;

/// Flags shared between a `TaskHandle` and the worker running the request.
#[derive(Debug, Default)]
pub(crate) struct TaskState {
    cancelled: AtomicBool,
    finished: AtomicBool,
}

impl TaskState {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Marks the task finished when dropped, whether the worker returns or unwinds.
    pub(crate) fn finish_on_drop(&self) -> FinishGuard<'_> {
        FinishGuard(self)
    }
}

pub(crate) struct FinishGuard<'a>(&'a TaskState);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.0.finished.store(true, Ordering::Release);
    }
}

/// Returned by `dispatch`. Dropping it does not cancel the request.
#[derive(Debug)]
pub struct TaskHandle {
    id: Uuid,
    state: Arc<TaskState>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TaskHandle {
    pub(crate) fn new(id: Uuid, state: Arc<TaskState>, worker: JoinHandle<()>) -> Self {
        Self {
            id,
            state,
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Ask the request to stop.
    ///
    /// If the engine has not produced a result yet, the callback receives
    /// `TransportError::Cancelled`. An engine call already in progress runs
    /// to completion but its result is discarded. No effect once finished.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// True once the callback has returned.
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::Acquire)
    }

    /// Block until the callback has run. Later calls return immediately.
    pub fn wait(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            // A panicking callback has already been reported by the panic hook.
            let _ = worker.join();
        }
    }
}
