use thiserror::Error;

use crate::record::{Key, RecordLock};

/// Kind of mutation a container was asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Assign,
    Remove,
}

impl std::fmt::Display for MutationOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationOp::Assign => write!(f, "assign"),
            MutationOp::Remove => write!(f, "remove"),
        }
    }
}

/// Errors raised by the state container.
#[derive(Debug, Error)]
pub enum StateError {
    /// The backing record refused the commit. Nothing changed and no
    /// notification was scheduled.
    #[error("Cannot {op} key '{key}': record is {lock}")]
    Rejected {
        op: MutationOp,
        key: Key,
        lock: RecordLock,
    },

    #[error("Initial state must be a JSON object")]
    NotAnObject,

    #[error("No tokio runtime is available to schedule notifications")]
    NoRuntime,
}
