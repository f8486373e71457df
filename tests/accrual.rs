// tests/accrual.rs
use idle_accrual::store::{MemoryStore, Store};
use idle_accrual::systems::accrual::{AccrualEngine, AccrualState, STORE_KEY};
use idle_accrual::systems::stage_table::{StageBand, StageTable};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn single_band() -> StageTable {
    StageTable::new(0.5, vec![StageBand::new(1, 10, 1.6)]).unwrap()
}

#[test]
fn three_events_compound_the_per_event_value() {
    let mut e = AccrualEngine::open(MemoryStore::new(), Some(single_band()));
    let awarded: Vec<f64> = (0..3).map(|_| e.grant_event()).collect();

    assert!(
        close(awarded[0], 0.5) && close(awarded[1], 0.8) && close(awarded[2], 1.28),
        "{awarded:?}"
    );
    let s = e.snapshot();
    assert_eq!(s.balance, 2.58);
    assert_eq!(s.break_count, 3);
    assert_eq!(s.current_stage, 4);
    assert!(close(s.current_per_break_value, 2.048));
    assert_eq!(s.active_multiplier, 1.6);
}

#[test]
fn first_event_pays_the_base_value() {
    let mut e = AccrualEngine::open(MemoryStore::new(), None);
    assert_eq!(e.snapshot().current_per_break_value, 0.5);
    assert_eq!(e.grant_event(), 0.5);
}

#[test]
fn balance_is_monotonic_and_stage_stays_in_range() {
    let bands = vec![StageBand::new(1, 5, 1.2), StageBand::new(6, 20, 1.01)];
    let table = StageTable::with_max_stage(0.5, bands, 20).unwrap();
    let mut e = AccrualEngine::open(MemoryStore::new(), Some(table));
    let mut prev = e.snapshot();
    for _ in 0..200 {
        e.grant_event();
        let s = e.snapshot();
        assert!(s.balance >= prev.balance);
        assert_eq!(s.break_count, prev.break_count + 1);
        assert!((1..=20).contains(&s.current_stage));
        prev = s;
    }
    assert_eq!(prev.current_stage, 20);
}

#[test]
fn balance_is_rounded_to_six_decimals() {
    let table = StageTable::new(0.1234567891, vec![StageBand::new(1, 10, 1.0)]).unwrap();
    let mut e = AccrualEngine::open(MemoryStore::new(), Some(table));
    e.grant_event();
    assert_eq!(e.snapshot().balance, 0.123457);
}

#[test]
fn state_survives_reopen() {
    let mut e = AccrualEngine::open(MemoryStore::new(), Some(single_band()));
    e.grant_event();
    e.grant_event();
    let before = e.snapshot();

    let reopened = AccrualEngine::open(e.store().clone(), Some(single_band()));
    assert_eq!(reopened.snapshot(), before);
}

#[test]
fn first_open_saves_defaults() {
    let e = AccrualEngine::open(MemoryStore::new(), None);
    let raw = e.store().get(STORE_KEY).expect("defaults saved");
    let v: serde_json::Value = serde_json::from_str(raw).unwrap();
    assert_eq!(v["breakCount"], 0);
    assert_eq!(v["currentStage"], 1);
    assert_eq!(v["currentPerBreakValue"], 0.5);
    assert_eq!(v["balance"], 0.0);
}

#[test]
fn stored_stage_is_recomputed_from_break_count() {
    let mut store = MemoryStore::new();
    store.insert(
        STORE_KEY,
        r#"{"breakCount":4,"currentStage":999,"currentPerBreakValue":3.2768,"balance":5.0}"#,
    );
    let e = AccrualEngine::open(store, Some(single_band()));
    assert_eq!(e.snapshot().current_stage, 5);
}

#[test]
fn missing_per_event_value_falls_back_to_base() {
    let mut store = MemoryStore::new();
    store.insert(STORE_KEY, r#"{"breakCount":2,"balance":1.3}"#);
    let e = AccrualEngine::open(store, None);
    let s = e.snapshot();
    assert_eq!(s.current_per_break_value, 0.5);
    assert_eq!(s.balance, 1.3);
    assert_eq!(s.current_stage, 3);
}

#[test]
fn corrupt_or_unreadable_store_starts_from_defaults() {
    let mut store = MemoryStore::new();
    store.insert(STORE_KEY, "{not json");
    let e = AccrualEngine::open(store, None);
    assert_eq!(*e.state(), AccrualState::fresh(e.table()));

    let mut store = MemoryStore::new();
    store.fail_reads = true;
    let e = AccrualEngine::open(store, None);
    assert_eq!(e.snapshot().break_count, 0);
}

#[test]
fn failed_writes_keep_in_memory_state() {
    let mut store = MemoryStore::new();
    store.fail_writes = true;
    let mut e = AccrualEngine::open(store, None);
    assert_eq!(e.grant_event(), 0.5);
    assert_eq!(e.snapshot().break_count, 1);
    assert!(e.save().is_err());
    assert!(e.store().get(STORE_KEY).is_none());
}

#[test]
fn set_config_rejects_invalid_tables_and_keeps_the_old_one() {
    let mut e = AccrualEngine::open(MemoryStore::new(), Some(single_band()));
    assert!(!e.set_config(r#"{"v1":0.5,"blocks":[]}"#));
    assert!(!e.set_config(r#"{"blocks":[{"start":1,"end":3,"r":2.0}]}"#));
    assert!(!e.set_config("garbage"));
    assert_eq!(*e.table(), single_band());

    assert!(e.set_config(r#"{"v1":1.0,"blocks":[{"start":1,"end":3,"r":2.0}]}"#));
    assert_eq!(e.snapshot().active_multiplier, 2.0);
    // The pending per-event value is not rewritten by a table swap.
    assert_eq!(e.grant_event(), 0.5);
}

#[test]
fn initialize_can_swap_the_table_and_reload() {
    let mut e = AccrualEngine::open(MemoryStore::new(), None);
    e.grant_event();
    let snap = e.initialize(Some(single_band()));
    assert_eq!(snap.break_count, 1);
    assert_eq!(snap.active_multiplier, 1.6);
}

#[test]
fn set_config_with_a_lower_max_stage_reclamps_the_stage() {
    let mut e = AccrualEngine::open(MemoryStore::new(), None);
    for _ in 0..50 {
        e.grant_event();
    }
    assert_eq!(e.snapshot().current_stage, 51);

    assert!(e.set_config(r#"{"v1":0.5,"blocks":[{"start":1,"end":10,"r":1.6}],"maxStage":10}"#));
    let snap = e.snapshot();
    assert_eq!(snap.break_count, 50);
    assert_eq!(snap.current_stage, 10);
    assert_eq!(e.state().current_stage, 10);
    assert_eq!(snap.active_multiplier, 1.6);

    let saved: AccrualState = serde_json::from_str(&e.store().get(STORE_KEY).unwrap()).unwrap();
    assert_eq!(saved.current_stage, 10);
}

#[test]
fn initialize_with_a_lower_max_stage_reclamps_the_stage() {
    let mut e = AccrualEngine::open(MemoryStore::new(), None);
    for _ in 0..30 {
        e.grant_event();
    }
    let small = StageTable::with_max_stage(0.5, vec![StageBand::new(1, 5, 1.3)], 5).unwrap();
    let snap = e.initialize(Some(small));
    assert_eq!(snap.break_count, 30);
    assert_eq!(snap.current_stage, 5);
    assert_eq!(e.state().current_stage, 5);

    // Widening again lets the stage follow break_count back up.
    e.set_table(StageTable::default());
    assert_eq!(e.snapshot().current_stage, 31);
    assert!(e.snapshot().current_stage <= e.table().max_stage());
}

#[test]
fn reset_is_idempotent() {
    let mut e = AccrualEngine::open(MemoryStore::new(), Some(single_band()));
    for _ in 0..5 {
        e.grant_event();
    }
    let a = e.reset();
    let b = e.reset();
    assert_eq!(a, b);
    assert_eq!(a.break_count, 0);
    assert_eq!(a.current_stage, 1);
    assert_eq!(a.current_per_break_value, 0.5);
    assert_eq!(a.balance, 0.0);
    assert_eq!(e.snapshot(), a);

    let stored = e.store().load(STORE_KEY).unwrap().unwrap();
    assert!(stored.contains("\"breakCount\":0"));
}

#[test]
fn snapshot_serializes_with_wire_names() {
    let e = AccrualEngine::open(MemoryStore::new(), None);
    let v = serde_json::to_value(e.snapshot()).unwrap();
    for k in ["breakCount", "currentStage", "currentPerBreakValue", "balance", "activeMultiplier"] {
        assert!(v.get(k).is_some(), "missing {k}");
    }
}
