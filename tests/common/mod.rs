//! Shared test utilities.

#![allow(dead_code)]

use std::sync::Arc;

use observable_state::logging::init_tracing;
use observable_state::{
    LoggingConfig, MicrotaskQueue, ObservableState, Record, Snapshot, Subscriber,
};
use parking_lot::Mutex;

/// Deliveries seen by a [`recorder`], as `(fresh, stale)` pairs.
pub type Deliveries = Arc<Mutex<Vec<(Snapshot, Snapshot)>>>;

/// Install tracing once for the test binary; honours `RUST_LOG`.
pub fn init_test_tracing() {
    init_tracing(&LoggingConfig {
        filter: "observable_state=debug".to_string(),
        with_target: true,
    });
}

/// Container driven by a manual queue, so tests decide when a tick happens.
pub fn manual_container(initial: Record) -> (ObservableState, MicrotaskQueue) {
    init_test_tracing();
    let queue = MicrotaskQueue::new();
    let state = ObservableState::with_scheduler(initial, queue.clone());
    (state, queue)
}

/// Subscriber that records every delivery it receives.
pub fn recorder() -> (Subscriber, Deliveries) {
    let log: Deliveries = Arc::new(Mutex::new(Vec::new()));
    let sub = {
        let log = Arc::clone(&log);
        Subscriber::new(move |fresh, stale| {
            log.lock().push((fresh.clone(), stale.clone()));
        })
    };
    (sub, log)
}

/// Record built from a JSON object literal.
pub fn record(json: serde_json::Value) -> Record {
    Record::from_json(json).expect("test record must be a JSON object")
}
