use pointstore_core::{
    Condition, DocumentStore, FindOptions, JsonMap, Selector, SortField, StoreError,
};
use serde_json::json;

fn body(value: serde_json::Value) -> JsonMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object body, got {other}"),
    }
}

#[test]
fn create_assigns_an_id_and_roundtrips() {
    let store = DocumentStore::open_in_memory().unwrap();

    let (id, revision) = store.create(&body(json!({"kind": "probe"}))).unwrap();
    assert!(!id.is_empty());

    let doc = store.get(&id).unwrap();
    assert_eq!(doc.id, id);
    assert_eq!(doc.revision, revision);
    assert_eq!(doc.body.get("kind"), Some(&json!("probe")));
}

#[test]
fn get_missing_document_is_not_found() {
    let store = DocumentStore::open_in_memory().unwrap();
    let err = store.get("nope").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "nope"));
}

#[test]
fn put_without_revision_creates_under_the_caller_id() {
    let store = DocumentStore::open_in_memory().unwrap();

    store.put("mine", None, &body(json!({"n": 1}))).unwrap();
    let doc = store.get("mine").unwrap();
    assert_eq!(doc.body.get("n"), Some(&json!(1)));

    // The id is now occupied; inserting again must conflict.
    let err = store.put("mine", None, &body(json!({"n": 2}))).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(id) if id == "mine"));
}

#[test]
fn put_with_current_revision_updates_and_bumps_the_token() {
    let store = DocumentStore::open_in_memory().unwrap();

    let first = store.put("doc", None, &body(json!({"n": 1}))).unwrap();
    let second = store
        .put("doc", Some(&first), &body(json!({"n": 2})))
        .unwrap();
    assert_ne!(first, second);

    let doc = store.get("doc").unwrap();
    assert_eq!(doc.revision, second);
    assert_eq!(doc.body.get("n"), Some(&json!(2)));
}

#[test]
fn put_with_stale_revision_conflicts() {
    let store = DocumentStore::open_in_memory().unwrap();

    let stale = store.put("doc", None, &body(json!({"n": 1}))).unwrap();
    store.put("doc", Some(&stale), &body(json!({"n": 2}))).unwrap();

    let err = store
        .put("doc", Some(&stale), &body(json!({"n": 3})))
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(id) if id == "doc"));
}

#[test]
fn put_with_revision_on_missing_document_is_not_found() {
    let store = DocumentStore::open_in_memory().unwrap();
    let err = store
        .put("ghost", Some("1"), &body(json!({})))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "ghost"));
}

#[test]
fn find_filters_by_equality_and_range() {
    let store = DocumentStore::open_in_memory().unwrap();
    store
        .put("a", None, &body(json!({"kind": "x", "n": 10})))
        .unwrap();
    store
        .put("b", None, &body(json!({"kind": "x", "n": 2000})))
        .unwrap();
    store
        .put("c", None, &body(json!({"kind": "y", "n": 3000})))
        .unwrap();

    let selector = Selector::new()
        .field("kind", Condition::eq("x"))
        .field("n", Condition::gt(100));
    let docs = store.find(&selector, &FindOptions::default()).unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "b");
}

#[test]
fn find_exists_guard_skips_documents_without_the_field() {
    let store = DocumentStore::open_in_memory().unwrap();
    store.put("with", None, &body(json!({"n": 1}))).unwrap();
    store.put("without", None, &body(json!({"m": 1}))).unwrap();

    let selector = Selector::new().field("n", Condition::Exists);
    let docs = store.find(&selector, &FindOptions::default()).unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "with");
}

#[test]
fn find_contains_all_requires_every_value() {
    let store = DocumentStore::open_in_memory().unwrap();
    store
        .put("both", None, &body(json!({"tags": ["red", "blue"]})))
        .unwrap();
    store
        .put("one", None, &body(json!({"tags": ["red"]})))
        .unwrap();
    store.put("none", None, &body(json!({}))).unwrap();

    let selector = Selector::new().field(
        "tags",
        Condition::ContainsAll(vec!["red".to_string(), "blue".to_string()]),
    );
    let docs = store.find(&selector, &FindOptions::default()).unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "both");
}

#[test]
fn find_contains_any_matches_intersections_only() {
    let store = DocumentStore::open_in_memory().unwrap();
    store
        .put("hit", None, &body(json!({"tags": ["red", "blue"]})))
        .unwrap();
    store
        .put("miss", None, &body(json!({"tags": ["green"]})))
        .unwrap();

    let selector = Selector::new().field(
        "tags",
        Condition::ContainsAny(vec!["blue".to_string(), "yellow".to_string()]),
    );
    let docs = store.find(&selector, &FindOptions::default()).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "hit");

    let empty = Selector::new().field("tags", Condition::ContainsAny(Vec::new()));
    assert!(store.find(&empty, &FindOptions::default()).unwrap().is_empty());
}

#[test]
fn find_applies_sort_limit_and_skip() {
    let store = DocumentStore::open_in_memory().unwrap();
    store.put("a", None, &body(json!({"n": 1}))).unwrap();
    store.put("b", None, &body(json!({"n": 2}))).unwrap();
    store.put("c", None, &body(json!({"n": 3}))).unwrap();

    let options = FindOptions {
        sort: vec![SortField::desc("n")],
        limit: Some(2),
        skip: Some(1),
    };
    let docs = store.find(&Selector::new(), &options).unwrap();

    let ids: Vec<&str> = docs.iter().map(|doc| doc.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn define_index_is_idempotent_and_does_not_change_results() {
    let store = DocumentStore::open_in_memory().unwrap();
    store.put("a", None, &body(json!({"kind": "x"}))).unwrap();

    store.define_index(&["kind"]).unwrap();
    store.define_index(&["kind"]).unwrap();

    let selector = Selector::new().field("kind", Condition::eq("x"));
    let docs = store.find(&selector, &FindOptions::default()).unwrap();
    assert_eq!(docs.len(), 1);
}

#[test]
fn define_index_accepts_composite_field_lists() {
    let store = DocumentStore::open_in_memory().unwrap();

    store.define_index(&["type"]).unwrap();
    store.define_index(&["type", "createdAt"]).unwrap();
    store
        .define_index(&["type", "createdAt", "searchTokens"])
        .unwrap();

    store
        .put("m", None, &body(json!({"type": "message", "createdAt": 5})))
        .unwrap();
    let selector = Selector::new()
        .field("type", Condition::eq("message"))
        .field("createdAt", Condition::Exists);
    let docs = store.find(&selector, &FindOptions::default()).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "m");
}

#[test]
fn hostile_field_names_are_rejected() {
    let store = DocumentStore::open_in_memory().unwrap();

    let selector = Selector::new().field("n; DROP TABLE documents", Condition::Exists);
    let err = store.find(&selector, &FindOptions::default()).unwrap_err();
    assert!(matches!(err, StoreError::InvalidField(_)));

    let err = store.define_index(&["kind", "bad name"]).unwrap_err();
    assert!(matches!(err, StoreError::InvalidField(name) if name == "bad name"));
}
