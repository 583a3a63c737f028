use std::cmp::Ordering as CmpOrdering;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A unique, non-string key.
///
/// Every call to [`Symbol::new`] or [`Symbol::anonymous`] yields a symbol
/// distinct from all others, even when the descriptions match. Clones share the identity.
#[derive(Debug, Clone)]
pub struct Symbol {
    id: u64,
    description: Option<Arc<str>>,
}

impl Symbol {
    pub fn new(description: &str) -> Self {
        Self::with_description(Some(Arc::from(description)))
    }

    /// Create a symbol without a description.
    pub fn anonymous() -> Self {
        Self::with_description(None)
    }

    fn with_description(description: Option<Arc<str>>) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            description,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "Symbol({})", desc),
            None => write!(f, "Symbol()"),
        }
    }
}

/// Key of a tracked record: a string name or a [`Symbol`].
///
/// Names sort before symbols; names compare lexicographically and symbols
/// by creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Name(Arc<str>),
    Symbol(Symbol),
}

impl Key {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            Key::Symbol(_) => None,
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Name(name) => write!(f, "{}", name),
            Key::Symbol(sym) => write!(f, "{}", sym),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(Arc::from(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(Arc::from(name))
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl From<Symbol> for Key {
    fn from(sym: Symbol) -> Self {
        Key::Symbol(sym)
    }
}

impl From<&Symbol> for Key {
    fn from(sym: &Symbol) -> Self {
        Key::Symbol(sym.clone())
    }
}
