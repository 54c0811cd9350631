//! Persistence: commits survive a reopen, corrupt snapshots are handled
//! according to the configured policy, and saves replace the file whole.

use crate::test_utils::*;
use snapdb::{CorruptionPolicy, Database, Element, Error, LoadStatus, Primitive};
use std::fs;
use tempfile::TempDir;

/// Write every kind of value → commit → reopen → read everything back
#[test]
fn test_round_trip_all_kinds() {
    let (dir, mut db) = fresh();

    db.put("name", "flora").unwrap();
    db.put("visits", 12).unwrap();
    db.put("ratio", 0.25).unwrap();
    db.put("enabled", false).unwrap();
    db.create_list("mixed", [Primitive::from("a"), Primitive::from(1i64), Primitive::from(true)])
        .unwrap();
    db.create_object(
        "me",
        Profile {
            name: "Sam".into(),
            age: 33,
            tags: vec!["admin".into()],
        },
    )
    .unwrap();
    db.commit_sync().unwrap();
    drop(db);

    let db = reopen(&dir);
    assert_eq!(db.load_report().status, LoadStatus::Loaded);
    assert_eq!(db.load_report().records, 2);
    assert_eq!(db.load_report().primitives, 4);

    assert_eq!(db.get("name"), Some(&Primitive::from("flora")));
    assert_eq!(db.get("visits"), Some(&Primitive::Integer(12)));
    assert_eq!(db.get("ratio"), Some(&Primitive::Float(0.25)));
    assert_eq!(db.get("enabled"), Some(&Primitive::Bool(false)));
    assert_eq!(
        db.get_list("mixed").unwrap().unwrap(),
        &[Primitive::from("a"), Primitive::Integer(1), Primitive::Bool(true)]
    );
    let profile = db.get_object::<Profile>("me").unwrap().unwrap();
    assert_eq!(profile.name, "Sam");
    assert_eq!(profile.age, 33);
    assert_eq!(profile.tags, vec!["admin".to_string()]);
}

/// Lists of documents, alone or mixed with primitives, survive a reopen
#[test]
fn test_document_lists_round_trip() {
    let (dir, mut db) = fresh();
    let sam = Profile {
        name: "Sam".into(),
        age: 33,
        tags: vec!["ops".into()],
    };
    db.create_list("people", [sam.clone(), Profile::default()]).unwrap();
    db.create_list("mixed", [Element::from(7), Element::from(Counter { hits: 2 })])
        .unwrap();
    db.commit_sync().unwrap();
    drop(db);

    let db = reopen(&dir);
    let people = db.get_list("people").unwrap().unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[0].downcast_ref::<Profile>().unwrap(), Some(&sam));
    assert_eq!(people[0], Element::from(sam));

    let mixed = db.get_list("mixed").unwrap().unwrap();
    assert_eq!(mixed[0], Primitive::Integer(7));
    assert_eq!(
        mixed[1].downcast_ref::<Counter>().unwrap(),
        Some(&Counter { hits: 2 })
    );
    assert_eq!(mixed[1].downcast_ref::<Profile>().unwrap(), None);
}

/// Iteration order of records survives a reopen
#[test]
fn test_record_order_survives_reopen() {
    let (dir, mut db) = fresh();
    db.create_list("b", [1i64]).unwrap();
    db.create_object("a", Counter::default()).unwrap();
    db.create_list("c", [2i64]).unwrap();
    // Replacing moves the key to the end
    db.create_list("b", [3i64]).unwrap();
    db.commit_sync().unwrap();
    drop(db);

    let db = reopen(&dir);
    let keys: Vec<&str> = db.query().keys().collect();
    assert_eq!(keys, vec!["a", "c", "b"]);
}

/// Two commits of the same contents produce identical files
#[test]
fn test_commit_is_idempotent() {
    let (_dir, mut db) = fresh();
    db.put("k", "v").unwrap();
    db.create_object("p", Profile::default()).unwrap();
    db.create_list("l", ["x", "y"]).unwrap();

    db.commit_sync().unwrap();
    let first = fs::read(db.snapshot_path()).unwrap();
    db.commit_sync().unwrap();
    let second = fs::read(db.snapshot_path()).unwrap();

    assert_eq!(first, second);
}

/// Reopen without touching documents → commit → bytes unchanged
#[test]
fn test_untouched_documents_are_rewritten_verbatim() {
    let (dir, mut db) = fresh();
    db.create_object("p", Profile::default()).unwrap();
    db.commit_sync().unwrap();
    let before = fs::read(db.snapshot_path()).unwrap();
    drop(db);

    let db = reopen(&dir);
    db.commit_sync().unwrap();
    let after = fs::read(db.snapshot_path()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_first_open_creates_snapshot() {
    let (dir, db) = fresh();
    assert_eq!(db.load_report().status, LoadStatus::Created);
    assert!(dir.path().join("Sync.db").exists());
    assert!(db.is_empty());
}

#[test]
fn test_empty_file_loads_as_empty_store() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Sync.db"), b"").unwrap();

    let db = reopen(&dir);
    assert_eq!(db.load_report().status, LoadStatus::Empty);
    assert!(db.is_empty());
}

/// Corrupt snapshot + reset policy → empty store, reported, writable
#[test]
fn test_corrupt_snapshot_is_reset() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Sync.db"), b"this is not a snapshot").unwrap();

    let mut db = reopen(&dir);
    assert!(db.load_report().is_recovered());
    assert!(db.load_report().corruption().is_some());
    assert!(db.is_empty());

    db.put("fresh", 1).unwrap();
    db.commit_sync().unwrap();
    drop(db);

    let db = reopen(&dir);
    assert_eq!(db.load_report().status, LoadStatus::Loaded);
    assert_eq!(db.get("fresh"), Some(&Primitive::Integer(1)));
}

/// Corrupt snapshot + abort policy → open fails, file left alone
#[test]
fn test_corrupt_snapshot_aborts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Sync.db");
    fs::write(&path, b"garbage").unwrap();

    let config = test_config().with_corruption_policy(CorruptionPolicy::Abort);
    let err = Database::open_with_config(dir.path(), config).unwrap_err();
    assert!(matches!(err, Error::LoadCorruption { .. }));
    assert_eq!(fs::read(&path).unwrap(), b"garbage");
}

/// A config file in the directory is picked up by `open`
#[test]
fn test_open_reads_config_file() {
    let dir = TempDir::new().unwrap();
    test_config()
        .with_snapshot_file("custom.snap")
        .save(dir.path())
        .unwrap();

    let mut db = Database::open(dir.path()).unwrap();
    assert_eq!(db.config().snapshot_file, "custom.snap");
    db.put("k", 1).unwrap();
    db.commit_sync().unwrap();

    assert!(dir.path().join("custom.snap").exists());
    assert!(!dir.path().join("Sync.db").exists());
}

#[test]
fn test_no_temp_file_left_behind() {
    let (dir, mut db) = fresh();
    db.put("k", 1).unwrap();
    db.commit_sync().unwrap();
    assert!(!dir.path().join("Sync.db.tmp").exists());
}

/// Two databases on different directories do not share state
#[test]
fn test_independent_sessions() {
    let (dir_a, mut a) = fresh();
    let (dir_b, mut b) = fresh();

    a.put("who", "a").unwrap();
    b.put("who", "b").unwrap();
    a.commit_sync().unwrap();
    b.commit_sync().unwrap();
    drop(a);
    drop(b);

    assert_eq!(reopen(&dir_a).get("who"), Some(&Primitive::from("a")));
    assert_eq!(reopen(&dir_b).get("who"), Some(&Primitive::from("b")));
}
