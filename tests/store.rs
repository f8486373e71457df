// tests/store.rs
use serde::{Deserialize, Serialize};

use idle_accrual::error::StoreError;
use idle_accrual::store::{FileStore, MemoryStore, Store, load_json, save_json};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Rec {
    gold: f64,
    lanes: Vec<u32>,
}

#[test]
fn memory_store_round_trips_records() {
    let mut s = MemoryStore::new();
    assert!(load_json::<Rec>(&s, "k").unwrap().is_none());
    let rec = Rec { gold: 12.5, lanes: vec![1, 2] };
    save_json(&mut s, "k", &rec).unwrap();
    assert_eq!(load_json::<Rec>(&s, "k").unwrap(), Some(rec));
    s.remove("k").unwrap();
    assert!(s.load("k").unwrap().is_none());
}

#[test]
fn malformed_json_is_reported_as_corrupt() {
    let mut s = MemoryStore::new();
    s.insert("k", "{\"gold\":");
    match load_json::<Rec>(&s, "k") {
        Err(StoreError::Corrupt { key, .. }) => assert_eq!(key, "k"),
        other => panic!("expected Corrupt, got {other:?}"),
    }
}

#[test]
fn injected_failures_surface_as_unavailable() {
    let mut s = MemoryStore::new();
    s.fail_writes = true;
    assert!(matches!(s.save("k", "1"), Err(StoreError::Unavailable(_))));
    s.fail_writes = false;
    s.save("k", "1").unwrap();
    s.fail_reads = true;
    assert!(matches!(s.load("k"), Err(StoreError::Unavailable(_))));
}

#[test]
fn file_store_persists_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = FileStore::open(dir.path().join("saves")).unwrap();
    assert!(a.load("MLEO_ENGINE_V1").unwrap().is_none());
    a.save("MLEO_ENGINE_V1", "{\"breakCount\":3}").unwrap();

    let b = FileStore::open(dir.path().join("saves")).unwrap();
    assert_eq!(b.load("MLEO_ENGINE_V1").unwrap().as_deref(), Some("{\"breakCount\":3}"));
    assert!(dir.path().join("saves").join("MLEO_ENGINE_V1.json").exists());

    a.remove("MLEO_ENGINE_V1").unwrap();
    a.remove("MLEO_ENGINE_V1").unwrap();
    assert!(b.load("MLEO_ENGINE_V1").unwrap().is_none());
}

#[test]
fn file_store_flattens_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = FileStore::open(dir.path()).unwrap();
    s.save("../escape/key", "1").unwrap();
    assert!(dir.path().join("___escape_key.json").exists());
    assert_eq!(s.load("../escape/key").unwrap().as_deref(), Some("1"));
}

#[test]
fn boxed_stores_are_stores() {
    let mut s: Box<dyn Store> = Box::new(MemoryStore::new());
    save_json(&mut s, "k", &7u32).unwrap();
    assert_eq!(load_json::<u32>(&s, "k").unwrap(), Some(7));
}
