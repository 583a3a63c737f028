//! Observable key/value state with batched change notification.
//!
//! An [`ObservableState`] owns a [`Record`]. Writes and deletions go through
//! the container (directly or via a [`LiveView`]); each one is compared with
//! the live value and ignored if nothing changes. All real changes made in
//! one synchronous burst are coalesced into a single deferred notification
//! that hands every [`Subscriber`] a `(fresh, stale)` pair of immutable
//! [`Snapshot`]s.
//!
//! ```ignore
//! use observable_state::{MicrotaskQueue, ObservableState, Record, Subscriber};
//!
//! let queue = MicrotaskQueue::new();
//! let state = ObservableState::with_scheduler(Record::new().with("a", 1), queue.clone());
//! state.subscribe(&Subscriber::new(|fresh, stale| {
//!     println!("{} -> {}", stale.to_json(), fresh.to_json());
//! }));
//!
//! state.assign("a", 3).unwrap();
//! state.assign("b", 4).unwrap();
//! queue.run_until_idle(); // one notification
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod logging;
pub mod record;
pub mod scheduler;
pub mod subscriber;

pub use config::{ConfigError, ContainerConfig, FaultPolicy, LoggingConfig, StateConfig};
pub use container::{LiveView, ObservableState, Phase, StateBuilder};
pub use error::{MutationOp, StateError};
pub use record::{Change, Key, Record, RecordLock, Snapshot, Symbol, Value};
pub use scheduler::{MicrotaskQueue, Scheduler, Task, TokioScheduler};
pub use subscriber::{Subscriber, SubscriberSet};
