//! Queries over a session holding lists, documents, and primitives

use crate::test_utils::*;
use snapdb::{Database, Document, Element, Primitive};
use tempfile::TempDir;

fn populated() -> (TempDir, Database) {
    let (dir, mut db) = fresh();
    db.put("not-a-record", "ignored by queries").unwrap();
    db.create_list("colors", ["red", "green"]).unwrap();
    db.create_object(
        "alice",
        Profile {
            name: "Alice".into(),
            age: 31,
            tags: vec!["admin".into()],
        },
    )
    .unwrap();
    db.create_list("numbers", [1i64, 2, 3]).unwrap();
    db.create_object("hits", Counter { hits: 9 }).unwrap();
    db.create_object(
        "bob",
        Profile {
            name: "Bob".into(),
            age: 17,
            tags: vec![],
        },
    )
    .unwrap();
    db.create_list("warm", ["red"]).unwrap();
    (dir, db)
}

#[test]
fn test_all_lists() {
    let (_dir, db) = populated();
    let lists: Vec<&[Element]> = db.query().all_lists().collect();
    assert_eq!(lists.len(), 3);
    assert_eq!(lists[1], &[Primitive::Integer(1), Primitive::Integer(2), Primitive::Integer(3)]);
}

#[test]
fn test_all_documents_spans_types() {
    let (_dir, db) = populated();
    let tags: Vec<&str> = db.query().all_documents().map(|cell| cell.type_tag()).collect();
    assert_eq!(
        tags,
        vec![Profile::type_tag(), Counter::type_tag(), Profile::type_tag()]
    );
}

#[test]
fn test_lists_containing() {
    let (_dir, db) = populated();
    assert_eq!(db.query().lists_containing("red").count(), 2);
    assert_eq!(db.query().lists_containing(2i64).count(), 1);
    // Integer and float are different values
    assert_eq!(db.query().lists_containing(2.0).count(), 0);
}

#[test]
fn test_lists_containing_documents() {
    let (_dir, mut db) = populated();
    let alice = db.get_object::<Profile>("alice").unwrap().unwrap().clone();
    db.create_list("team", [alice.clone(), Profile::default()]).unwrap();
    db.create_list("mixed", [Element::from("lead"), Element::from(alice.clone())])
        .unwrap();

    assert_eq!(db.query().lists_containing(alice).count(), 2);
    assert_eq!(db.query().lists_containing(Profile::default()).count(), 1);
    assert_eq!(db.query().lists_containing(Counter { hits: 9 }).count(), 0);
}

/// Floats match by bit pattern, so NaN finds NaN
#[test]
fn test_lists_containing_nan() {
    let (_dir, mut db) = fresh();
    db.create_list("readings", [1.5, f64::NAN]).unwrap();

    assert_eq!(db.query().lists_containing(f64::NAN).count(), 1);
    assert_eq!(db.query().lists_containing(1.5).count(), 1);
}

#[test]
fn test_documents_matching() {
    let (_dir, db) = populated();
    let adults: Vec<&str> = db
        .query()
        .documents_matching::<Profile, _>(|p| p.age >= 18)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(adults, vec!["Alice"]);

    assert_eq!(db.query().documents_of::<Profile>().count(), 2);
    assert_eq!(db.query().documents_of::<Counter>().count(), 1);
}

/// Documents loaded from disk are matched once decoded
#[test]
fn test_queries_after_reopen() {
    let (dir, db) = populated();
    db.commit_sync().unwrap();
    drop(db);

    let db = reopen(&dir);
    let names: Vec<&str> = db
        .query()
        .documents_of::<Profile>()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
    assert_eq!(db.query().len(), 6);
}

#[test]
fn test_queries_are_repeatable() {
    let (_dir, db) = populated();
    let first: Vec<&str> = db.query().keys().collect();
    let second: Vec<&str> = db.query().keys().collect();
    assert_eq!(first, second);
    assert!(!first.contains(&"not-a-record"));
}

#[test]
fn test_empty_database_queries() {
    let (_dir, db) = fresh();
    assert!(db.query().is_empty());
    assert_eq!(db.query().all_lists().count(), 0);
    assert_eq!(db.query().documents_of::<Profile>().count(), 0);
}
