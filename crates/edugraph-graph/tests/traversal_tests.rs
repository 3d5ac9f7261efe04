//! Integration tests for neighbor expansion and hop queries.

use edugraph_core::{EdgeKind, NodeFields, NodeId, Relationship};
use edugraph_graph::store::{EdgeStore, IdGenerator, NodeStore};
use edugraph_graph::traversal::{Direction, Expand, HopQuery};
use edugraph_storage::backends::RedbEngine;
use edugraph_storage::{StorageEngine, Transaction};

fn create_test_engine() -> RedbEngine {
    RedbEngine::in_memory().expect("Failed to create in-memory engine")
}

struct Campus {
    s1: NodeId,
    s2: NodeId,
    c1: NodeId,
    c2: NodeId,
    i1: NodeId,
}

/// s1 and s2 take c1, i1 teaches c1 and c2, s2 also takes c2.
fn campus(engine: &RedbEngine) -> Campus {
    let id_gen = IdGenerator::new();
    let mut tx = engine.begin_write().unwrap();

    let mut node = |id: &str, fields: NodeFields| NodeStore::create(&mut tx, &id_gen, id, fields).unwrap().id;
    let s1 = node("s1", NodeFields::Student);
    let s2 = node("s2", NodeFields::Student);
    let c1 = node("c1", NodeFields::Course { title: None });
    let c2 = node("c2", NodeFields::Course { title: None });
    let i1 = node("i1", NodeFields::Instructor);

    for (from, to, rel) in [
        (s1, c1, Relationship::Enrolled),
        (s2, c1, Relationship::Enrolled),
        (i1, c1, Relationship::Teaches),
        (i1, c2, Relationship::Teaches),
        (s2, c2, Relationship::Enrolled),
    ] {
        EdgeStore::create(&mut tx, &id_gen, from, to, rel).unwrap();
    }
    tx.commit().unwrap();

    Campus { s1, s2, c1, c2, i1 }
}

#[test]
fn expand_in_both_directions() {
    let engine = create_test_engine();
    let campus = campus(&engine);
    let tx = engine.begin_read().unwrap();

    let students = Expand::neighbor_ids(&tx, campus.c1, EdgeKind::Enrolled, Direction::Incoming).unwrap();
    assert_eq!(students, vec![campus.s1, campus.s2]);

    let courses = Expand::neighbor_ids(&tx, campus.i1, EdgeKind::Teaches, Direction::Outgoing).unwrap();
    assert_eq!(courses, vec![campus.c1, campus.c2]);

    let both = Expand::neighbors(&tx, campus.c2, EdgeKind::Enrolled, Direction::Both).unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].node, campus.s2);
    assert_eq!(both[0].direction, Direction::Incoming);
}

#[test]
fn recommendation_shaped_query() {
    let engine = create_test_engine();
    let campus = campus(&engine);
    let tx = engine.begin_read().unwrap();

    let result = HopQuery::from_nodes([campus.s1])
        .hop(EdgeKind::Enrolled, Direction::Outgoing)
        .hop(EdgeKind::Teaches, Direction::Incoming)
        .hop(EdgeKind::Teaches, Direction::Outgoing)
        .hop_excluding(EdgeKind::Enrolled, Direction::Incoming, [campus.s1])
        .hop(EdgeKind::Enrolled, Direction::Outgoing)
        .execute(&tx)
        .unwrap();

    assert!(!result.is_empty());
    assert_eq!(result.depth(), 5);
    assert_eq!(result.layer(3).unwrap().iter().copied().collect::<Vec<_>>(), vec![campus.c1, campus.c2]);
    assert_eq!(result.layer(4).unwrap().iter().copied().collect::<Vec<_>>(), vec![campus.s2]);

    let support = result.last_predecessors();
    assert_eq!(support.len(), 2);
    assert!(support[&campus.c2].contains(&campus.s2));
}

#[test]
fn empty_hop_prunes_everything() {
    let engine = create_test_engine();
    let campus = campus(&engine);
    let tx = engine.begin_read().unwrap();

    // nobody completed anything
    let result = HopQuery::from_nodes([campus.s1, campus.s2])
        .hop(EdgeKind::Enrolled, Direction::Outgoing)
        .hop(EdgeKind::Completed, Direction::Incoming)
        .execute(&tx)
        .unwrap();

    assert!(result.is_empty());
    assert!(result.last().is_empty());
    assert!(result.layer(0).unwrap().is_empty());
    assert!(result.last_predecessors().is_empty());
}

#[test]
fn dead_branches_are_dropped() {
    let engine = create_test_engine();
    let campus = campus(&engine);
    let tx = engine.begin_read().unwrap();

    // every peer is excluded, so the second hop matches nothing
    let result = HopQuery::from_nodes([campus.s1, campus.s2])
        .hop(EdgeKind::Enrolled, Direction::Outgoing)
        .hop_excluding(EdgeKind::Enrolled, Direction::Incoming, [campus.s1, campus.s2])
        .execute(&tx)
        .unwrap();
    assert!(result.is_empty());

    // s1 only reaches c1, so it is pruned from the start layer
    let result = HopQuery::from_nodes([campus.s1, campus.s2])
        .hop_excluding(EdgeKind::Enrolled, Direction::Outgoing, [campus.c1])
        .execute(&tx)
        .unwrap();
    assert_eq!(result.layer(0).unwrap().iter().copied().collect::<Vec<_>>(), vec![campus.s2]);
    assert_eq!(result.last().iter().copied().collect::<Vec<_>>(), vec![campus.c2]);
}

#[test]
fn empty_start_set_is_empty_result() {
    let engine = create_test_engine();
    let _ = campus(&engine);
    let tx = engine.begin_read().unwrap();

    let result = HopQuery::from_nodes(Vec::<NodeId>::new())
        .hop(EdgeKind::Enrolled, Direction::Outgoing)
        .execute(&tx)
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.depth(), 1);
}
