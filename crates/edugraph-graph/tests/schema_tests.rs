//! Integration tests for schema catalog persistence.

use edugraph_graph::schema::{PredicateDef, SchemaDefinition, SchemaStore, TypeDef, ValueType};
use edugraph_graph::store::{clear_tables, GRAPH_TABLES};
use edugraph_storage::backends::RedbEngine;
use edugraph_storage::{StorageEngine, Transaction};

fn create_test_engine() -> RedbEngine {
    RedbEngine::in_memory().expect("Failed to create in-memory engine")
}

#[test]
fn load_without_catalog_is_empty() {
    let engine = create_test_engine();
    let tx = engine.begin_read().unwrap();
    let catalog = SchemaStore::load(&tx).unwrap();
    assert!(catalog.is_empty());
    assert_eq!(catalog.version(), 0);
}

#[test]
fn catalog_survives_commit() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().unwrap();
    let mut catalog = SchemaStore::load(&tx).unwrap();
    catalog
        .merge(
            &SchemaDefinition::new()
                .predicate(PredicateDef::new("student_id", ValueType::String).exact())
                .predicate(PredicateDef::new("enrolled", ValueType::Uid).list().reverse())
                .type_def(TypeDef::new("Student", ["student_id", "enrolled"])),
        )
        .unwrap();
    SchemaStore::save(&mut tx, &catalog).unwrap();
    tx.commit().unwrap();

    let tx = engine.begin_read().unwrap();
    let loaded = SchemaStore::load(&tx).unwrap();
    assert_eq!(loaded, catalog);
    assert!(loaded.is_exact_indexed("student_id"));
    assert!(loaded.has_reverse("enrolled"));
}

#[test]
fn clearing_graph_tables_keeps_catalog() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().unwrap();
    let mut catalog = SchemaStore::load(&tx).unwrap();
    catalog
        .merge(&SchemaDefinition::new().predicate(PredicateDef::new("title", ValueType::String)))
        .unwrap();
    SchemaStore::save(&mut tx, &catalog).unwrap();
    tx.commit().unwrap();

    let mut tx = engine.begin_write().unwrap();
    clear_tables(&mut tx, &GRAPH_TABLES).unwrap();
    tx.commit().unwrap();

    let tx = engine.begin_read().unwrap();
    assert!(SchemaStore::load(&tx).unwrap().predicate("title").is_some());
    drop(tx);

    let mut tx = engine.begin_write().unwrap();
    assert!(SchemaStore::clear(&mut tx).unwrap());
    tx.commit().unwrap();

    let tx = engine.begin_read().unwrap();
    assert!(SchemaStore::load(&tx).unwrap().is_empty());
}
