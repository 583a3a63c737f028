mod common;

use common::{manual_container, record, recorder};
use observable_state::{Key, MutationOp, Phase, RecordLock, StateError, Value};
use serde_json::json;

#[test]
fn test_reads_pass_through_to_live_state() {
    let (state, _queue) = manual_container(record(json!({ "a": 1, "b": "x" })));
    let view = state.live_view();

    assert_eq!(view.get("a"), Some(Value::from(1)));
    assert_eq!(view.get("missing"), None);
    assert!(view.contains_key("b"));
    assert_eq!(view.keys(), vec![Key::from("a"), Key::from("b")]);
    assert_eq!(view.len(), 2);

    state.assign("a", 5).unwrap();
    assert_eq!(view.get("a"), Some(Value::from(5)));
}

#[test]
fn test_writes_through_view_are_batched_with_direct_writes() {
    let (state, queue) = manual_container(record(json!({ "a": 1, "b": 2 })));
    let view = state.live_view();
    let (sub, log) = recorder();
    state.subscribe(&sub);

    view.set("a", 10).unwrap();
    state.assign("c", 3).unwrap();
    view.delete("b").unwrap();
    assert_eq!(state.phase(), Phase::Batching);
    assert_eq!(queue.run_until_idle(), 1);

    let log = log.lock();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].0.to_json(), json!({ "a": 10.0, "c": 3.0 }));
    assert_eq!(log[0].1.to_json(), json!({ "a": 1.0, "b": 2.0 }));
}

#[test]
fn test_sealed_record_allows_overwrite_only() {
    let (state, queue) = manual_container(record(json!({ "a": 1 })));
    let view = state.live_view();
    state.seal();
    assert_eq!(state.lock(), RecordLock::Sealed);

    view.set("a", 2).unwrap();
    let added = view.set("b", 1).unwrap_err();
    assert!(matches!(
        added,
        StateError::Rejected { op: MutationOp::Assign, lock: RecordLock::Sealed, .. }
    ));
    let removed = view.delete("a").unwrap_err();
    assert!(matches!(
        removed,
        StateError::Rejected { op: MutationOp::Remove, lock: RecordLock::Sealed, .. }
    ));

    assert_eq!(queue.run_until_idle(), 1);
    assert_eq!(view.get("a"), Some(Value::from(2)));
    assert!(!view.contains_key("b"));
}

#[test]
fn test_frozen_record_rejects_every_change() {
    let (state, queue) = manual_container(record(json!({ "a": 1 })));
    let view = state.live_view();
    state.freeze();
    // Lock only tightens
    state.seal();
    assert_eq!(state.lock(), RecordLock::Frozen);

    let err = view.set("a", 2).unwrap_err();
    assert_eq!(err.to_string(), "Cannot assign key 'a': record is frozen");
    // Same-value writes never reach the record
    assert!(view.set("a", 1).is_ok());
    // Neither do deletes of absent keys
    assert!(view.delete("nope").is_ok());

    assert_eq!(queue.pending(), 0);
    assert_eq!(state.phase(), Phase::Idle);
}

#[test]
fn test_view_outlives_other_handles() {
    let (state, queue) = manual_container(record(json!({ "a": 1 })));
    let view = state.live_view();
    let (sub, log) = recorder();
    state.subscribe(&sub);
    drop(state);

    view.set("a", 2).unwrap();
    queue.run_until_idle();
    assert_eq!(log.lock().len(), 1);
    assert_eq!(view.snapshot().get("a"), Some(&Value::from(2)));
}
