//! Observable state container.
//!
//! Wraps a [`Record`] so that writes and deletions are compared against the
//! live value and, when they change something, produce one batched
//! notification per synchronous burst of changes.
//!
//! # Batching
//!
//! ```text
//!   Idle ──first change──→ Batching ──flush──→ Delivering ──done──→ Idle
//!                            │   ↑                     │
//!                            └───┘ further changes     └─change──→ Batching
//! ```
//!
//! The first change of a batch copies the record as the stale baseline and
//! schedules a flush. The flush copies the live record as `fresh`, hands
//! `(fresh, stale)` to every subscriber registered at that moment and
//! returns the container to idle. A change made by a subscriber during
//! delivery opens a new batch whose flush is scheduled once the current
//! delivery has finished, so notifications never overlap.
//!
//! # Locking
//!
//! The state lock is released before any subscriber runs and before any
//! task is handed to the scheduler.

mod batch;
mod builder;
mod view;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::FaultPolicy;
use crate::error::StateError;
use crate::record::{Key, Record, RecordLock, Snapshot, Value};
use crate::scheduler::Scheduler;
use crate::subscriber::{Subscriber, SubscriberSet};

use batch::{BatchState, FlushRequest};

pub use builder::StateBuilder;
pub use view::LiveView;

/// Batching phase of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No flush pending.
    Idle,
    /// At least one change committed and a flush pending.
    Batching,
    /// A flush is notifying subscribers and no new batch is open yet.
    Delivering,
}

/// Reactive wrapper around a [`Record`].
///
/// Cloning is cheap; clones share the same record, subscribers and batch.
#[derive(Clone)]
pub struct ObservableState {
    shared: Arc<Shared>,
}

struct Shared {
    id: Uuid,
    name: Option<String>,
    fault_policy: FaultPolicy,
    state: Mutex<BatchState>,
    subscribers: SubscriberSet,
    scheduler: Arc<dyn Scheduler>,
}

impl ObservableState {
    /// Create a container that delivers notifications on the current tokio
    /// runtime.
    ///
    /// # Errors
    /// Returns [`StateError::NoRuntime`] when called outside a runtime.
    pub fn new(initial: Record) -> Result<Self, StateError> {
        Self::builder().initial(initial).build()
    }

    /// Create a container that hands its flushes to `scheduler`.
    pub fn with_scheduler(initial: Record, scheduler: impl Scheduler + 'static) -> Self {
        Self::from_parts(initial, None, FaultPolicy::default(), Arc::new(scheduler))
    }

    pub fn builder() -> StateBuilder {
        StateBuilder::new()
    }

    fn from_parts(
        initial: Record,
        name: Option<String>,
        fault_policy: FaultPolicy,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let shared = Shared {
            id: Uuid::new_v4(),
            name,
            fault_policy,
            state: Mutex::new(BatchState::new(initial)),
            subscribers: SubscriberSet::new(),
            scheduler,
        };
        tracing::debug!(
            container = %shared.id,
            name = shared.name.as_deref().unwrap_or("-"),
            fault_policy = ?shared.fault_policy,
            "Container created"
        );
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Unique id of this container, used as the `container` field in logs.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn name(&self) -> Option<&str> {
        self.shared.name.as_deref()
    }

    /// A handle whose reads pass through and whose writes are tracked.
    pub fn live_view(&self) -> LiveView {
        LiveView::new(Arc::clone(&self.shared))
    }

    /// Register `subscriber`. Registering the same subscriber again is a
    /// no-op.
    pub fn subscribe(&self, subscriber: &Subscriber) {
        if self.shared.subscribers.insert(subscriber) {
            tracing::trace!(container = %self.shared.id, "Subscriber added");
        }
    }

    /// Remove `subscriber`. Takes effect for every flush that has not
    /// started yet. Unknown subscribers are ignored.
    pub fn unsubscribe(&self, subscriber: &Subscriber) {
        if self.shared.subscribers.remove(subscriber) {
            tracing::trace!(container = %self.shared.id, "Subscriber removed");
        }
    }

    pub fn unsubscribe_all(&self) {
        self.shared.subscribers.clear();
        tracing::trace!(container = %self.shared.id, "All subscribers removed");
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }

    /// Write `value` under `key`. Returns `false` only if the record
    /// rejected the write.
    pub fn try_assign(&self, key: impl Into<Key>, value: impl Into<Value>) -> bool {
        self.assign(key, value).is_ok()
    }

    /// Delete `key`. Returns `false` only if the record rejected the delete.
    pub fn try_remove(&self, key: impl Into<Key>) -> bool {
        self.remove(key).is_ok()
    }

    /// Write `value` under `key`.
    ///
    /// A write of a value that is the same as the live one does nothing.
    ///
    /// # Errors
    /// Returns [`StateError::Rejected`] if the record is sealed and `key` is
    /// new, or if it is frozen. No notification is scheduled in that case.
    pub fn assign(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<(), StateError> {
        self.shared.assign(key.into(), value.into())
    }

    /// Delete `key`. Deleting an absent key does nothing.
    ///
    /// # Errors
    /// Returns [`StateError::Rejected`] if the key exists and the record is
    /// sealed or frozen.
    pub fn remove(&self, key: impl Into<Key>) -> Result<(), StateError> {
        self.shared.remove(key.into())
    }

    /// Forbid adding and removing keys from now on.
    pub fn seal(&self) {
        self.shared.restrict(RecordLock::Sealed);
    }

    /// Forbid all writes from now on.
    pub fn freeze(&self) {
        self.shared.restrict(RecordLock::Frozen);
    }

    pub fn lock(&self) -> RecordLock {
        self.shared.state.lock().record.lock()
    }

    /// Current batching phase. `Idle` means every flush requested so far
    /// has finished delivering.
    pub fn phase(&self) -> Phase {
        let state = self.shared.state.lock();
        if state.is_pending() {
            Phase::Batching
        } else if state.is_delivering() {
            Phase::Delivering
        } else {
            Phase::Idle
        }
    }

    /// Number of flushes that have started delivering.
    pub fn flush_count(&self) -> u64 {
        self.shared.state.lock().flushes()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.snapshot()
    }
}

impl std::fmt::Debug for ObservableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableState")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .field("phase", &self.phase())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Shared {
    fn get(&self, key: &Key) -> Option<Value> {
        self.state.lock().record.get(key).cloned()
    }

    fn contains_key(&self, key: &Key) -> bool {
        self.state.lock().record.contains_key(key)
    }

    fn keys(&self) -> Vec<Key> {
        self.state.lock().record.iter().map(|(k, _)| k.clone()).collect()
    }

    fn len(&self) -> usize {
        self.state.lock().record.len()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state.lock().record)
    }

    fn assign(self: &Arc<Self>, key: Key, value: Value) -> Result<(), StateError> {
        let request = {
            let mut state = self.state.lock();
            if state.record.get(&key).is_some_and(|current| *current == value) {
                tracing::trace!(container = %self.id, key = %key, "Write is not a change");
                return Ok(());
            }
            tracing::trace!(container = %self.id, key = %key, "Assigning");
            state
                .commit(|record| record.assign(key, value))
                .inspect_err(|e| self.log_rejected(e))?
        };
        self.after_commit(request);
        Ok(())
    }

    fn remove(self: &Arc<Self>, key: Key) -> Result<(), StateError> {
        let request = {
            let mut state = self.state.lock();
            if !state.record.contains_key(&key) {
                tracing::trace!(container = %self.id, key = %key, "Delete of absent key");
                return Ok(());
            }
            tracing::trace!(container = %self.id, key = %key, "Removing");
            state
                .commit(|record| record.remove(&key).map(|_| ()))
                .inspect_err(|e| self.log_rejected(e))?
        };
        self.after_commit(request);
        Ok(())
    }

    fn restrict(&self, lock: RecordLock) {
        let mut state = self.state.lock();
        state.record.restrict(lock);
        tracing::debug!(container = %self.id, lock = %state.record.lock(), "Record locked");
    }

    fn log_rejected(&self, error: &StateError) {
        tracing::warn!(container = %self.id, error = %error, "Commit rejected");
    }

    fn after_commit(self: &Arc<Self>, request: FlushRequest) {
        match request {
            FlushRequest::Joined => {}
            FlushRequest::Schedule => {
                tracing::debug!(container = %self.id, "Batch opened");
                self.schedule_flush();
            }
            FlushRequest::Deferred => {
                tracing::debug!(container = %self.id, "Batch opened during delivery");
            }
        }
    }

    fn schedule_flush(self: &Arc<Self>) {
        let shared = Arc::clone(self);
        self.scheduler.schedule(Box::new(move || shared.flush()));
    }

    fn flush(self: &Arc<Self>) {
        let (fresh, stale, flush) = {
            let mut state = self.state.lock();
            let (fresh, stale) = state.begin_delivery();
            (fresh, stale, state.flushes())
        };
        let _finish = scopeguard::guard(Arc::clone(self), |shared| shared.finish_delivery());

        let subscribers = self.subscribers.snapshot();
        for subscriber in &subscribers {
            match self.fault_policy {
                FaultPolicy::Isolate => {
                    let result = catch_unwind(AssertUnwindSafe(|| subscriber.call(&fresh, &stale)));
                    if let Err(payload) = result {
                        tracing::error!(
                            container = %self.id,
                            flush,
                            panic = panic_message(payload.as_ref()),
                            "Subscriber panicked during delivery"
                        );
                    }
                }
                FaultPolicy::Propagate => subscriber.call(&fresh, &stale),
            }
        }

        tracing::debug!(
            container = %self.id,
            flush,
            subscribers = subscribers.len(),
            keys = fresh.len(),
            "Change notification delivered"
        );
    }

    fn finish_delivery(self: &Arc<Self>) {
        let rearm = self.state.lock().finish_delivery();
        if rearm {
            tracing::debug!(container = %self.id, "Scheduling batch opened during delivery");
            self.schedule_flush();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
