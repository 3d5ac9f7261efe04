//! Integration tests for NodeStore and the identity index.

use edugraph_core::{NodeFields, NodeKey, NodeKind};
use edugraph_graph::store::{GraphError, IdGenerator, NodeStore};
use edugraph_storage::backends::RedbEngine;
use edugraph_storage::{StorageEngine, Transaction};

fn create_test_engine() -> RedbEngine {
    RedbEngine::in_memory().expect("Failed to create in-memory engine")
}

fn course(title: Option<&str>) -> NodeFields {
    NodeFields::Course { title: title.map(str::to_owned) }
}

#[test]
fn create_and_lookup_by_identity() {
    let engine = create_test_engine();
    let id_gen = IdGenerator::new();

    let mut tx = engine.begin_write().unwrap();
    let node = NodeStore::create(&mut tx, &id_gen, "c1", course(Some("Rust 101"))).unwrap();
    tx.commit().unwrap();

    let tx = engine.begin_read().unwrap();
    assert_eq!(NodeStore::lookup_identity(&tx, NodeKind::Course, "c1").unwrap(), Some(node.id));
    let found = NodeStore::get_by_key(&tx, &NodeKey::new(NodeKind::Course, "c1")).unwrap().unwrap();
    assert_eq!(found, node);
    assert_eq!(found.title(), Some("Rust 101"));
}

#[test]
fn identity_is_scoped_by_kind() {
    let engine = create_test_engine();
    let id_gen = IdGenerator::new();

    let mut tx = engine.begin_write().unwrap();
    let student = NodeStore::create(&mut tx, &id_gen, "x", NodeFields::Student).unwrap();
    let user = NodeStore::create(&mut tx, &id_gen, "x", NodeFields::User).unwrap();
    tx.commit().unwrap();

    assert_ne!(student.id, user.id);
    let tx = engine.begin_read().unwrap();
    assert_eq!(NodeStore::lookup_identity(&tx, NodeKind::Student, "x").unwrap(), Some(student.id));
    assert_eq!(NodeStore::lookup_identity(&tx, NodeKind::User, "x").unwrap(), Some(user.id));
    assert_eq!(NodeStore::lookup_identity(&tx, NodeKind::Instructor, "x").unwrap(), None);
}

#[test]
fn duplicate_identity_is_rejected() {
    let engine = create_test_engine();
    let id_gen = IdGenerator::new();

    let mut tx = engine.begin_write().unwrap();
    let first = NodeStore::create(&mut tx, &id_gen, "s1", NodeFields::Student).unwrap();
    let err = NodeStore::create(&mut tx, &id_gen, "s1", NodeFields::Student).unwrap_err();
    match err {
        GraphError::IdentityConflict { key, existing } => {
            assert_eq!(key, NodeKey::new(NodeKind::Student, "s1"));
            assert_eq!(existing, first.id);
        }
        other => panic!("unexpected error: {other}"),
    }
    tx.commit().unwrap();

    let tx = engine.begin_read().unwrap();
    assert_eq!(NodeStore::count_by_kind(&tx, NodeKind::Student).unwrap(), 1);
}

#[test]
fn empty_domain_id_is_rejected() {
    let engine = create_test_engine();
    let id_gen = IdGenerator::new();

    let mut tx = engine.begin_write().unwrap();
    let err = NodeStore::create(&mut tx, &id_gen, "", NodeFields::Student).unwrap_err();
    assert!(matches!(err, GraphError::Validation(_)));
}

#[test]
fn merge_fields_overwrites_but_never_clears() {
    let engine = create_test_engine();
    let id_gen = IdGenerator::new();

    let mut tx = engine.begin_write().unwrap();
    let node = NodeStore::create(&mut tx, &id_gen, "c1", course(Some("Old"))).unwrap();
    NodeStore::merge_fields(&mut tx, node.id, course(None)).unwrap();
    tx.commit().unwrap();

    let tx = engine.begin_read().unwrap();
    assert_eq!(NodeStore::get(&tx, node.id).unwrap().unwrap().title(), Some("Old"));
    drop(tx);

    let mut tx = engine.begin_write().unwrap();
    NodeStore::merge_fields(&mut tx, node.id, course(Some("New"))).unwrap();
    tx.commit().unwrap();

    let tx = engine.begin_read().unwrap();
    assert_eq!(NodeStore::get(&tx, node.id).unwrap().unwrap().title(), Some("New"));
}

#[test]
fn merge_fields_rejects_other_kind() {
    let engine = create_test_engine();
    let id_gen = IdGenerator::new();

    let mut tx = engine.begin_write().unwrap();
    let node = NodeStore::create(&mut tx, &id_gen, "c1", course(None)).unwrap();
    let err = NodeStore::merge_fields(&mut tx, node.id, NodeFields::Student).unwrap_err();
    assert!(matches!(err, GraphError::Validation(_)));
}

#[test]
fn ids_by_kind_and_max_id() {
    let engine = create_test_engine();
    let id_gen = IdGenerator::new();

    let mut tx = engine.begin_write().unwrap();
    let a = NodeStore::create(&mut tx, &id_gen, "s1", NodeFields::Student).unwrap();
    let _c = NodeStore::create(&mut tx, &id_gen, "c1", course(None)).unwrap();
    let b = NodeStore::create(&mut tx, &id_gen, "s2", NodeFields::Student).unwrap();
    tx.commit().unwrap();

    let tx = engine.begin_read().unwrap();
    assert_eq!(NodeStore::ids_by_kind(&tx, NodeKind::Student).unwrap(), vec![a.id, b.id]);
    assert_eq!(NodeStore::count_by_kind(&tx, NodeKind::Post).unwrap(), 0);
    assert_eq!(NodeStore::max_id(&tx).unwrap(), Some(b.id));
}

#[test]
fn id_generator_resumes_after_stored_ids() {
    let engine = create_test_engine();
    let id_gen = IdGenerator::new();

    let mut tx = engine.begin_write().unwrap();
    let last = NodeStore::create(&mut tx, &id_gen, "s1", NodeFields::Student).unwrap();
    tx.commit().unwrap();

    let tx = engine.begin_read().unwrap();
    let resumed = IdGenerator::after(NodeStore::max_id(&tx).unwrap(), None);
    drop(tx);

    let mut tx = engine.begin_write().unwrap();
    let next = NodeStore::create(&mut tx, &resumed, "s2", NodeFields::Student).unwrap();
    assert!(next.id > last.id);
}

#[test]
fn uncommitted_creation_is_invisible() {
    let engine = create_test_engine();
    let id_gen = IdGenerator::new();

    {
        let mut tx = engine.begin_write().unwrap();
        NodeStore::create(&mut tx, &id_gen, "s1", NodeFields::Student).unwrap();
        tx.rollback().unwrap();
    }

    let tx = engine.begin_read().unwrap();
    assert_eq!(NodeStore::lookup_identity(&tx, NodeKind::Student, "s1").unwrap(), None);
}
