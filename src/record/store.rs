use std::collections::BTreeMap;

use crate::error::{MutationOp, StateError};

use super::key::Key;
use super::value::Value;

/// Structural lock on a record. Locks only ever tighten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecordLock {
    /// Keys may be added, overwritten and removed.
    #[default]
    Open,
    /// Existing keys may be overwritten; nothing may be added or removed.
    Sealed,
    /// No writes of any kind.
    Frozen,
}

impl std::fmt::Display for RecordLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordLock::Open => write!(f, "open"),
            RecordLock::Sealed => write!(f, "sealed"),
            RecordLock::Frozen => write!(f, "frozen"),
        }
    }
}

/// Backing store of a container: an open-ended key/value mapping.
#[derive(Debug, Clone, Default)]
pub struct Record {
    entries: BTreeMap<Key, Value>,
    lock: RecordLock,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object.
    ///
    /// # Errors
    /// Returns [`StateError::NotAnObject`] for any other JSON value.
    pub fn from_json(json: serde_json::Value) -> Result<Self, StateError> {
        match json {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (Key::from(k), Value::from(v)))
                .collect()),
            _ => Err(StateError::NotAnObject),
        }
    }

    /// Builder-style insert, for constructing initial state.
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    pub fn lock(&self) -> RecordLock {
        self.lock
    }

    /// Tighten the lock. Requests to loosen it are ignored.
    pub fn restrict(&mut self, lock: RecordLock) {
        self.lock = self.lock.max(lock);
    }

    /// Whether writing `key` would be accepted.
    pub fn admits_assign(&self, key: &Key) -> bool {
        match self.lock {
            RecordLock::Open => true,
            RecordLock::Sealed => self.entries.contains_key(key),
            RecordLock::Frozen => false,
        }
    }

    /// Whether removing an existing key would be accepted.
    pub fn admits_remove(&self) -> bool {
        self.lock == RecordLock::Open
    }

    /// Write `value` under `key`.
    ///
    /// # Errors
    /// Returns [`StateError::Rejected`] if the lock forbids the write.
    pub fn assign(&mut self, key: Key, value: Value) -> Result<(), StateError> {
        if !self.admits_assign(&key) {
            return Err(StateError::Rejected {
                op: MutationOp::Assign,
                key,
                lock: self.lock,
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Remove `key`, returning its previous value. Absent keys are not an
    /// error.
    ///
    /// # Errors
    /// Returns [`StateError::Rejected`] if the key exists and the lock
    /// forbids removal.
    pub fn remove(&mut self, key: &Key) -> Result<Option<Value>, StateError> {
        if !self.entries.contains_key(key) {
            return Ok(None);
        }
        if !self.admits_remove() {
            return Err(StateError::Rejected {
                op: MutationOp::Remove,
                key: key.clone(),
                lock: self.lock,
            });
        }
        Ok(self.entries.remove(key))
    }

    /// Shallow copy of the entries, without the lock.
    pub(crate) fn entries(&self) -> BTreeMap<Key, Value> {
        self.entries.clone()
    }
}

impl FromIterator<(Key, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            lock: RecordLock::Open,
        }
    }
}
