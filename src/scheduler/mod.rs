//! Deferred execution of flushes.
//!
//! A flush must run after the mutation that requested it has returned, never
//! inline. Two schedulers are provided:
//!
//! - [`TokioScheduler`] spawns the flush on a tokio runtime
//! - [`MicrotaskQueue`] holds flushes in a FIFO drained at an explicit poll
//!   point, for hosts without a runtime and for deterministic tests

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::error::StateError;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks at some point after the current call stack unwinds.
pub trait Scheduler: Send + Sync {
    /// Queue `task`. Must not run it before returning.
    fn schedule(&self, task: Task);
}

/// Schedules tasks onto a tokio runtime.
#[derive(Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is currently running on.
    ///
    /// # Errors
    /// Returns [`StateError::NoRuntime`] outside a tokio runtime.
    pub fn from_current() -> Result<Self, StateError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| StateError::NoRuntime)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, task: Task) {
        self.handle.spawn(async move { task() });
    }
}

/// FIFO of pending tasks drained by [`MicrotaskQueue::run_until_idle`].
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct MicrotaskQueue {
    tasks: Arc<Mutex<VecDeque<Task>>>,
}

impl MicrotaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run queued tasks until the queue is empty, including tasks queued by
    /// the tasks being run. Returns how many ran.
    ///
    /// The queue lock is released while each task runs.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.tasks.lock().pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl Scheduler for MicrotaskQueue {
    fn schedule(&self, task: Task) {
        self.tasks.lock().push_back(task);
    }
}
