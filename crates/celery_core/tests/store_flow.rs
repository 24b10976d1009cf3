use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use celery_core::events::EVENT_STORE_RESTORED;
use celery_core::storage::{JsonStateRepository, StorageService, CURRENT_SCHEMA_VERSION};
use celery_core::{Action, Clock, Runtime};
use serde_json::Value;

/// Deterministic stand-in for the wall clock; each session gets its own
/// starting point so "later" is under test control.
struct TestClock(AtomicI64);

impl TestClock {
    fn starting_at(start: i64) -> Self {
        Self(AtomicI64::new(start))
    }
}

impl Clock for TestClock {
    fn now_millis(&self) -> i64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

fn session(dir: &Path, clock_start: i64) -> Runtime {
    let repository = JsonStateRepository::new(dir).expect("repository opens");
    Runtime::with_storage(
        StorageService::new(Arc::new(repository)),
        Arc::new(TestClock::starting_at(clock_start)),
    )
}

fn dispatch(runtime: &Runtime, action_json: &str) -> Value {
    let envelope: Value =
        serde_json::from_str(&runtime.dispatch_json(action_json)).expect("envelope is JSON");
    assert_eq!(envelope["ok"], true, "dispatch failed: {envelope}");
    envelope["data"].clone()
}

#[test]
fn two_sessions_converge_through_the_persisted_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");

    // first session starts from nothing and builds up an entry
    let first = session(dir.path(), 1_000);
    assert!(first.bootstrap().first_run);

    let state = dispatch(&first, r#"{"type":"addCelery"}"#);
    let id = state["celeries"]
        .as_object()
        .expect("celeries is a map")
        .keys()
        .next()
        .expect("one entry")
        .clone();

    dispatch(
        &first,
        &format!(r#"{{"type":"setName","payload":{{"id":"{id}","data":"Initech"}}}}"#),
    );
    dispatch(
        &first,
        &format!(r#"{{"type":"setInputValue","payload":{{"id":"{id}","data":"50"}}}}"#),
    );
    dispatch(
        &first,
        &format!(r#"{{"type":"setInputMeasurement","payload":{{"id":"{id}","data":"/hour"}}}}"#),
    );
    dispatch(
        &first,
        &format!(
            r#"{{"type":"setCommitmentValue","payload":{{"id":"{id}","subID":"vacationDays","data":10}}}}"#
        ),
    );
    dispatch(
        &first,
        &format!(
            r#"{{"type":"setCommitmentValue","payload":{{"id":"{id}","subID":"holidayDays","data":5}}}}"#
        ),
    );

    // 50/hour over a (52*5 - 15)-day year of 8-hour days
    let summary = first.summary();
    assert_eq!(summary.salaries, vec![98_000.0]);
    assert_eq!(summary.ceiling, 98_000.0);

    // a second session over the same directory resumes that state
    let second = session(dir.path(), 2_000);
    assert!(!second.bootstrap().first_run);
    assert_eq!(second.state().celeries[&id].name, "Initech");

    // it raises the desired threshold, which lands in the snapshot
    dispatch(&second, r#"{"type":"setDesired","payload":{"data":120000}}"#);

    // the first session picks the newer snapshot up on focus
    let seen: Arc<Mutex<Vec<(String, Value)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    first.set_event_callback(Arc::new(move |event, payload| {
        sink.lock().expect("lock").push((event.to_string(), payload.clone()));
    }));
    assert!(first.refresh_from_storage().expect("refresh"));
    assert_eq!(first.state().desired, 120_000.0);
    assert_eq!(first.state().timestamp, 2_000);
    assert_eq!(first.summary().ceiling, 120_000.0);
    {
        let events = seen.lock().expect("lock");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, EVENT_STORE_RESTORED);
        assert_eq!(events[0].1["timestamp"], 2_000);
    }

    // refreshing again with nothing newer is quiet
    assert!(!first.refresh_from_storage().expect("refresh"));

    // resetting wipes the snapshot and returns to the wizard
    first.dispatch(&Action::ResetStore);
    assert!(first.bootstrap().first_run);
    assert!(!dir.path().join("persistedStore.json").exists());

    // the other session keeps its in-memory state until its next write
    assert!(!second.refresh_from_storage().expect("refresh"));
    assert_eq!(second.state().desired, 120_000.0);
}

#[test]
fn ratings_and_rating_types_survive_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let runtime = session(dir.path(), 1_000);
        let state = dispatch(&runtime, r#"{"type":"addCelery"}"#);
        let id = state["celeries"]
            .as_object()
            .expect("celeries is a map")
            .keys()
            .next()
            .expect("one entry")
            .clone();

        dispatch(
            &runtime,
            r#"{"type":"addRatingType","payload":{"id":"rt-snacks","data":"Snacks"}}"#,
        );
        dispatch(
            &runtime,
            &format!(
                r#"{{"type":"setRating","payload":{{"id":"{id}","subID":"rt-snacks","data":4.5}}}}"#
            ),
        );
        dispatch(
            &runtime,
            r#"{"type":"setRatingTypeName","payload":{"id":"rt-snacks","data":"Free Snacks"}}"#,
        );
    }

    let resumed = session(dir.path(), 9_000);
    let state = resumed.state();
    assert_eq!(state.rating_types["rt-snacks"], "Free Snacks");
    let celery = state.celeries.values().next().expect("entry survived");
    assert_eq!(celery.ratings["rt-snacks"], 4.5);

    // the resumed session's reads go over the same wire shape
    let encoded: Value = serde_json::from_str(&resumed.state_json()).expect("state is JSON");
    assert_eq!(encoded["ratingTypes"]["rt-snacks"], "Free Snacks");
}

#[test]
fn legacy_browser_snapshots_boot_and_get_upgraded_on_the_next_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot_path = dir.path().join("persistedStore.json");

    // shape the old web build left in local storage: unversioned, with a
    // cleared value and no defaults block
    std::fs::write(
        &snapshot_path,
        r#"{
            "timestamp": 1580515200000,
            "min": 20000,
            "desired": 60000,
            "celeries": {
                "abc": {
                    "name": "Initech",
                    "input": { "value": null, "type": "/year", "currency": "EUR" },
                    "commitment": { "fullTime": true },
                    "ratings": {}
                }
            },
            "currencies": { "base": "USD", "rates": { "EUR": 0.9, "USD": 1.0 } },
            "ratingTypes": { "rt-1": "Culture" }
        }"#,
    )
    .expect("seed snapshot");

    let runtime = session(dir.path(), 2_000_000_000_000);
    assert!(!runtime.bootstrap().first_run);
    let state = runtime.state();
    assert_eq!(state.min, 20_000.0);
    assert_eq!(state.celeries["abc"].input.value, 0.0);
    assert_eq!(state.defaults.full_time.hours_in_day, 8.0);

    dispatch(&runtime, r#"{"type":"setMin","payload":{"data":25000}}"#);
    let raw = std::fs::read_to_string(&snapshot_path).expect("snapshot readable");
    let written: Value = serde_json::from_str(&raw).expect("snapshot is JSON");
    assert_eq!(written["schemaVersion"], CURRENT_SCHEMA_VERSION);
    assert_eq!(written["min"], 25_000.0);
    assert_eq!(written["celeries"]["abc"]["input"]["currency"], "EUR");
}
