//! Value classification and kind checks at the API boundary

use crate::test_utils::*;
use serde_json::json;
use snapdb::{Error, Primitive};

#[test]
fn test_non_primitive_values_rejected() {
    let (_dir, mut db) = fresh();
    for value in [json!([1, 2]), json!({"a": 1})] {
        let err = db.put("k", value).unwrap_err();
        assert!(matches!(err, Error::InvalidValueType { .. }));
    }
    assert!(db.get("k").is_none());
}

#[test]
fn test_json_scalars_accepted() {
    let (_dir, mut db) = fresh();
    db.put("s", json!("text")).unwrap();
    db.put("i", json!(7)).unwrap();
    db.put("f", json!(1.5)).unwrap();
    db.put("b", json!(true)).unwrap();

    assert_eq!(db.get("s"), Some(&Primitive::from("text")));
    assert_eq!(db.get("i"), Some(&Primitive::Integer(7)));
    assert_eq!(db.get("f"), Some(&Primitive::Float(1.5)));
    assert_eq!(db.get("b"), Some(&Primitive::Bool(true)));
}

/// Null and None both mean "remove"
#[test]
fn test_absence_removes_primitive() {
    let (dir, mut db) = fresh();
    db.put("a", 1).unwrap();
    db.put("b", 2).unwrap();
    db.commit_sync().unwrap();

    db.put("a", json!(null)).unwrap();
    db.put("b", None::<i64>).unwrap();
    db.put("never-set", None::<&str>).unwrap();
    db.commit_sync().unwrap();
    drop(db);

    let db = reopen(&dir);
    assert!(db.get("a").is_none());
    assert!(db.get("b").is_none());
}

#[test]
fn test_u64_out_of_range() {
    let (_dir, mut db) = fresh();
    assert!(matches!(
        db.put("big", u64::MAX),
        Err(Error::InvalidValueType { .. })
    ));
    db.put("small", 5u64).unwrap();
    assert_eq!(db.get("small"), Some(&Primitive::Integer(5)));
}

#[test]
fn test_kind_mismatches() {
    let (_dir, mut db) = fresh();
    db.create_object("doc", Profile::default()).unwrap();
    db.create_list("list", ["x"]).unwrap();

    match db.get_list("doc").unwrap_err() {
        Error::TypeMismatch { key, expected, .. } => {
            assert_eq!(key, "doc");
            assert_eq!(expected, "list");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(matches!(
        db.get_object::<Profile>("list"),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        db.get_object::<Counter>("doc"),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        db.update_object("list", |_: &mut Profile| {}),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_update_missing_key() {
    let (_dir, mut db) = fresh();
    assert!(matches!(
        db.update_list("nope", |_| {}),
        Err(Error::NoSuchKey { .. })
    ));
    assert!(matches!(
        db.update_object("nope", |_: &mut Counter| {}),
        Err(Error::NoSuchKey { .. })
    ));
}

/// Primitives and records live in separate namespaces
#[test]
fn test_primitive_and_record_namespaces() {
    let (_dir, mut db) = fresh();
    db.put("shared", 1).unwrap();
    db.create_list("shared", ["x"]).unwrap();

    assert_eq!(db.get("shared"), Some(&Primitive::Integer(1)));
    assert_eq!(db.get_list("shared").unwrap().unwrap().len(), 1);

    assert!(db.delete("shared"));
    assert_eq!(db.get("shared"), Some(&Primitive::Integer(1)));
}

/// "primitives" is an ordinary record key
#[test]
fn test_primitives_is_a_normal_key() {
    let (dir, mut db) = fresh();
    db.put("p", "v").unwrap();
    db.create_list("primitives", ["not special"]).unwrap();
    db.commit_sync().unwrap();
    drop(db);

    let db = reopen(&dir);
    assert_eq!(db.get("p"), Some(&Primitive::from("v")));
    assert_eq!(
        db.get_list("primitives").unwrap().unwrap(),
        &[Primitive::from("not special")]
    );
}

#[test]
fn test_empty_key_rejected() {
    let (_dir, mut db) = fresh();
    assert!(matches!(db.put("", 1), Err(Error::InvalidKey { .. })));
    assert!(matches!(
        db.create_object("", Counter::default()),
        Err(Error::InvalidKey { .. })
    ));
}
