//! Tracked record primitives.
//!
//! - [`Key`] / [`Symbol`]: string or unique symbolic keys
//! - [`Value`]: stored values with same-value equality
//! - [`Record`]: the mutable backing store, optionally sealed or frozen
//! - [`Snapshot`]: immutable copies handed to subscribers

mod key;
mod snapshot;
mod store;
mod value;

pub use key::{Key, Symbol};
pub use snapshot::{Change, Snapshot};
pub use store::{Record, RecordLock};
pub use value::Value;
