//! Subscriber registry.
//!
//! Callbacks are held as `Arc<dyn Fn>`; a [`Subscriber`] and its clones
//! share one identity, which is what the registry deduplicates on. The
//! registry lock is never held while a callback runs, so callbacks may
//! subscribe or unsubscribe freely during delivery.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::record::Snapshot;

/// Closure type for subscriber callbacks: `(fresh, stale)`.
pub type SubscriberFn = dyn Fn(&Snapshot, &Snapshot) + Send + Sync;

/// Handle to a subscriber callback.
///
/// Clones compare equal; two handles built from separate `new` calls never
/// do, even when wrapping the same function.
#[derive(Clone)]
pub struct Subscriber {
    callback: Arc<SubscriberFn>,
}

impl Subscriber {
    pub fn new(callback: impl Fn(&Snapshot, &Snapshot) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub(crate) fn call(&self, fresh: &Snapshot, stale: &Snapshot) {
        (self.callback)(fresh, stale)
    }

    fn same_as(&self, other: &Subscriber) -> bool {
        // Data pointers only; vtable addresses may differ for one closure.
        std::ptr::eq(
            Arc::as_ptr(&self.callback) as *const (),
            Arc::as_ptr(&other.callback) as *const (),
        )
    }
}

impl PartialEq for Subscriber {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for Subscriber {}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Subscriber")
            .field(&(Arc::as_ptr(&self.callback) as *const ()))
            .finish()
    }
}

/// Insertion-ordered set of subscribers.
#[derive(Default)]
pub struct SubscriberSet {
    entries: Mutex<Vec<Subscriber>>,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `subscriber`. Returns `false` if it was already registered.
    pub fn insert(&self, subscriber: &Subscriber) -> bool {
        let mut entries = self.entries.lock();
        if entries.iter().any(|s| s == subscriber) {
            return false;
        }
        entries.push(subscriber.clone());
        true
    }

    /// Remove `subscriber`. Returns `false` if it was not registered.
    pub fn remove(&self, subscriber: &Subscriber) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|s| s != subscriber);
        entries.len() != before
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn contains(&self, subscriber: &Subscriber) -> bool {
        self.entries.lock().iter().any(|s| s == subscriber)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of the current registrations, taken under the lock.
    pub fn snapshot(&self) -> Vec<Subscriber> {
        self.entries.lock().clone()
    }
}
