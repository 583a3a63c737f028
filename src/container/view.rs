use std::sync::Arc;

use crate::error::StateError;
use crate::record::{Key, Snapshot, Value};

use super::Shared;

/// Tracked view over a container's record.
///
/// Reads see the live state. `set` and `delete` go through the same change
/// detection and batching as [`ObservableState::assign`] and
/// [`ObservableState::remove`]; the record itself is never reachable, so
/// there is no way to mutate it without being observed.
///
/// [`ObservableState::assign`]: super::ObservableState::assign
/// [`ObservableState::remove`]: super::ObservableState::remove
#[derive(Clone)]
pub struct LiveView {
    shared: Arc<Shared>,
}

impl LiveView {
    pub(super) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn get(&self, key: impl Into<Key>) -> Option<Value> {
        self.shared.get(&key.into())
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.shared.contains_key(&key.into())
    }

    pub fn keys(&self) -> Vec<Key> {
        self.shared.keys()
    }

    pub fn len(&self) -> usize {
        self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.snapshot()
    }

    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<(), StateError> {
        self.shared.assign(key.into(), value.into())
    }

    pub fn delete(&self, key: impl Into<Key>) -> Result<(), StateError> {
        self.shared.remove(key.into())
    }
}

impl std::fmt::Debug for LiveView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveView")
            .field("container", &self.shared.id)
            .finish()
    }
}
