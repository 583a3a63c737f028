use std::collections::BTreeMap;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::key::Key;
use super::store::Record;
use super::value::Value;

/// Read-only copy of a record taken at one instant.
///
/// There is no mutating API: a snapshot handed to a subscriber can never
/// write back into the container it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Arc<BTreeMap<Key, Value>>,
}

/// Top-level difference for one key between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added { key: Key, value: Value },
    Removed { key: Key, previous: Value },
    Updated { key: Key, previous: Value, value: Value },
}

impl Change {
    pub fn key(&self) -> &Key {
        match self {
            Change::Added { key, .. } | Change::Removed { key, .. } | Change::Updated { key, .. } => {
                key
            }
        }
    }
}

impl Snapshot {
    pub(crate) fn capture(record: &Record) -> Self {
        Self {
            entries: Arc::new(record.entries()),
        }
    }

    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        self.entries.get(&key.into())
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.entries.contains_key(&key.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    /// Per-key changes that turn `stale` into `self`, in key order.
    ///
    /// Keys written and then reverted inside one batch do not appear here,
    /// even though the batch still produced a notification.
    pub fn changes_since(&self, stale: &Snapshot) -> Vec<Change> {
        let mut changes = Vec::new();
        for (key, previous) in stale.entries.iter() {
            match self.entries.get(key) {
                None => changes.push(Change::Removed {
                    key: key.clone(),
                    previous: previous.clone(),
                }),
                Some(value) if value != previous => changes.push(Change::Updated {
                    key: key.clone(),
                    previous: previous.clone(),
                    value: value.clone(),
                }),
                Some(_) => {}
            }
        }
        for (key, value) in self.entries.iter() {
            if !stale.entries.contains_key(key) {
                changes.push(Change::Added {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }
        changes.sort_by(|a, b| a.key().cmp(b.key()));
        changes
    }

    /// JSON rendering: symbol keys, undefined values and symbol values are
    /// skipped.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.entries.iter() {
            if let (Some(name), false) = (key.as_name(), value.is_skipped_in_json()) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}
