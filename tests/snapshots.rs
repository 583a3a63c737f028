mod common;

use common::{manual_container, record, recorder};
use observable_state::{Change, Key, Symbol, Value};
use serde_json::json;

#[test]
fn test_delivered_snapshots_are_detached_from_live_state() {
    let (state, queue) = manual_container(record(json!({ "a": 1 })));
    let (sub, log) = recorder();
    state.subscribe(&sub);

    state.assign("a", 2).unwrap();
    queue.run_until_idle();
    state.assign("a", 99).unwrap();
    state.remove("a").unwrap();

    let log = log.lock();
    assert_eq!(log[0].0.get("a"), Some(&Value::from(2)));
    assert_eq!(log[0].1.get("a"), Some(&Value::from(1)));
}

#[test]
fn test_copies_made_by_a_subscriber_do_not_leak_back() {
    let (state, queue) = manual_container(record(json!({ "a": 1 })));
    let (sub, log) = recorder();
    state.subscribe(&sub);

    state.assign("a", 2).unwrap();
    queue.run_until_idle();

    // A subscriber can only build its own record from a snapshot
    let (fresh, _) = log.lock()[0].clone();
    let mut rebuilt: observable_state::Record =
        fresh.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    rebuilt.assign(Key::from("a"), Value::from(500)).unwrap();

    assert_eq!(fresh.get("a"), Some(&Value::from(2)));
    assert_eq!(state.snapshot().get("a"), Some(&Value::from(2)));
}

#[test]
fn test_each_flush_gets_new_snapshots() {
    let (state, queue) = manual_container(record(json!({ "a": 1 })));
    let (sub, log) = recorder();
    state.subscribe(&sub);

    state.assign("a", 2).unwrap();
    queue.run_until_idle();
    state.assign("a", 3).unwrap();
    queue.run_until_idle();

    let log = log.lock();
    assert_eq!(log[0].0.get("a"), Some(&Value::from(2)));
    assert_eq!(log[1].1.get("a"), Some(&Value::from(2)));
    assert_eq!(log[1].0.get("a"), Some(&Value::from(3)));
}

#[test]
fn test_changes_since_reports_batch_difference() {
    let (state, queue) = manual_container(record(json!({ "a": 1, "b": 2 })));
    let (sub, log) = recorder();
    state.subscribe(&sub);

    state.assign("a", 10).unwrap();
    state.remove("b").unwrap();
    state.assign("c", true).unwrap();
    queue.run_until_idle();

    let log = log.lock();
    let (fresh, stale) = &log[0];
    let changes = fresh.changes_since(stale);
    assert_eq!(
        changes,
        vec![
            Change::Updated {
                key: Key::from("a"),
                previous: Value::from(1),
                value: Value::from(10),
            },
            Change::Removed {
                key: Key::from("b"),
                previous: Value::from(2),
            },
            Change::Added {
                key: Key::from("c"),
                value: Value::from(true),
            },
        ]
    );
}

#[test]
fn test_symbols_are_tracked_but_not_serialised() {
    let tag = Symbol::new("tag");
    let (state, queue) = manual_container(record(json!({ "a": 1 })));
    let (sub, log) = recorder();
    state.subscribe(&sub);

    state.assign(&tag, "hidden").unwrap();
    state.assign("tagged", tag.clone()).unwrap();
    queue.run_until_idle();

    let log = log.lock();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].0.get(&tag), Some(&Value::from("hidden")));
    assert_eq!(log[0].0.get("tagged"), Some(&Value::from(tag.clone())));
    assert!(!log[0].1.contains_key(&tag));
    assert_eq!(log[0].0.to_json(), json!({ "a": 1.0 }));
}

#[test]
fn test_nested_values_change_only_by_replacement() {
    let (state, queue) = manual_container(record(json!({ "list": [1, 2] })));
    let (sub, log) = recorder();
    state.subscribe(&sub);

    let same = state.snapshot().get("list").cloned().unwrap();
    state.assign("list", same).unwrap();
    queue.run_until_idle();
    assert!(log.lock().is_empty());

    // Equal contents, new allocation: a change
    state
        .assign("list", Value::from(vec![Value::from(1), Value::from(2)]))
        .unwrap();
    queue.run_until_idle();
    assert_eq!(log.lock().len(), 1);
}
