//! Domain events, identity resolution and read helpers.

use edugraph::{
    Direction, EdgeKind, EduGraph, Error, NodeFields, NodeKey, NodeKind, Relationship,
};

fn create_graph() -> EduGraph {
    let graph = EduGraph::in_memory().expect("Failed to create in-memory graph");
    graph.schema().define_schema().expect("Failed to define schema");
    graph
}

#[test]
fn first_reference_creates_later_ones_reuse() {
    let graph = create_graph();

    let first = graph.enroll_student("s1", "c1").unwrap();
    assert_eq!(first.created.len(), 2);
    let s1 = first.created[&NodeKey::new(NodeKind::Student, "s1")];
    let c1 = first.created[&NodeKey::new(NodeKind::Course, "c1")];
    assert_eq!(first.edge.source, s1);
    assert_eq!(first.edge.target, c1);

    let second = graph.mark_course_completed("s1", "c1").unwrap();
    assert!(second.created.is_empty());
    assert_eq!((second.edge.source, second.edge.target), (s1, c1));

    let resolved = graph.resolver().resolve(NodeKind::Student, "s1").unwrap();
    assert_eq!(resolved.id(), Some(s1));
    assert!(graph.resolver().resolve(NodeKind::Student, "s9").unwrap().is_pending());
}

#[test]
fn resolution_does_not_depend_on_the_cache() {
    let graph = EduGraph::builder().resolver_cache(false).open().unwrap();
    graph.schema().define_schema().unwrap();

    let created = graph.enroll_student("s1", "c1").unwrap();
    assert_eq!(graph.resolver().cached_len().unwrap(), 0);

    let again = graph.enroll_student("s1", "c1").unwrap();
    assert!(again.created.is_empty());
    assert_eq!(again.edge.source, created.edge.source);
}

#[test]
fn repeated_events_add_edges_not_nodes() {
    let graph = create_graph();
    graph.enroll_student("s1", "c1").unwrap();
    graph.enroll_student("s1", "c1").unwrap();

    let stats = graph.stats().unwrap();
    assert_eq!(stats.nodes_of(NodeKind::Student), 1);
    assert_eq!(stats.nodes_of(NodeKind::Course), 1);
    assert_eq!(stats.edges_of(EdgeKind::Enrolled), 2);
}

#[test]
fn submission_records_score_on_edge_and_assignment() {
    let graph = create_graph();

    let outcome = graph.submit_assignment("s1", "a1", 72.0).unwrap();
    assert_eq!(outcome.edge.relationship, Relationship::Submitted { score: 72.0 });
    graph.submit_assignment("s2", "a1", 88.5).unwrap();

    let assignment = graph.node(NodeKind::Assignment, "a1").unwrap().unwrap();
    assert_eq!(assignment.fields, NodeFields::Assignment { score: Some(88.5) });

    let err = graph.submit_assignment("s1", "a1", f64::NAN).unwrap_err();
    assert!(matches!(err, Error::MalformedQuery(_)));
}

#[test]
fn course_title_is_merged() {
    let graph = create_graph();

    let created = graph.set_course_title("c1", "Draft").unwrap();
    assert_eq!(created.title(), Some("Draft"));

    graph.enroll_student("s1", "c1").unwrap();
    let updated = graph.set_course_title("c1", "Graph Theory").unwrap();
    assert_eq!(updated.id, created.id);

    // enrolling again carries no title and must not clear it
    graph.enroll_student("s2", "c1").unwrap();
    let course = graph.node(NodeKind::Course, "c1").unwrap().unwrap();
    assert_eq!(course.title(), Some("Graph Theory"));
}

#[test]
fn messages_carry_content_and_may_target_self() {
    let graph = create_graph();

    let outcome = graph.message_user("u1", "u2", "see you in class").unwrap();
    match &outcome.edge.relationship {
        Relationship::Messaged { content, .. } => assert_eq!(content, "see you in class"),
        other => panic!("unexpected relationship {other:?}"),
    }

    let note = graph.message_user("u1", "u1", "reminder").unwrap();
    assert_eq!(note.edge.source, note.edge.target);
    assert_eq!(graph.stats().unwrap().nodes_of(NodeKind::User), 2);
}

#[test]
fn invalid_payloads_are_malformed() {
    let graph = create_graph();

    assert!(matches!(graph.enroll_student("", "c1"), Err(Error::MalformedQuery(_))));
    assert!(matches!(graph.add_prerequisite("c1", "c1"), Err(Error::MalformedQuery(_))));

    // nothing was created by the rejected prerequisite
    assert!(graph.node(NodeKind::Course, "c1").unwrap().is_none());
}

#[test]
fn prerequisites_and_completion_are_independent() {
    let graph = create_graph();
    graph.add_prerequisite("c2", "c1").unwrap();
    graph.mark_course_completed("s1", "c1").unwrap();

    let prereqs = graph.neighbors(NodeKind::Course, "c2", EdgeKind::Prerequisite, Direction::Outgoing).unwrap();
    assert_eq!(prereqs.len(), 1);
    assert_eq!(prereqs[0].node.domain_id, "c1");

    let enrolled = graph.neighbors(NodeKind::Student, "s1", EdgeKind::Enrolled, Direction::Outgoing).unwrap();
    assert!(enrolled.is_empty());
}

#[test]
fn neighbors_follow_edges_backward() {
    let graph = create_graph();
    graph.follow_instructor("s1", "i1").unwrap();
    graph.follow_instructor("s2", "i1").unwrap();
    graph.instructor_teaches("i1", "c1").unwrap();

    let followers = graph.neighbors(NodeKind::Instructor, "i1", EdgeKind::Follows, Direction::Incoming).unwrap();
    let ids: Vec<_> = followers.iter().map(|n| n.node.domain_id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
    assert!(followers.iter().all(|n| n.incoming));

    let teaching = graph.neighbors(NodeKind::Instructor, "i1", EdgeKind::Teaches, Direction::Both).unwrap();
    assert_eq!(teaching.len(), 1);
    assert!(!teaching[0].incoming);

    assert!(graph.neighbors(NodeKind::Instructor, "nobody", EdgeKind::Follows, Direction::Incoming).unwrap().is_empty());
}

#[test]
fn upsert_rejects_post_without_content() {
    let graph = create_graph();
    let post = graph.resolver().resolve(NodeKind::Post, "p1").unwrap();
    let err = graph.mutator().upsert_node(&post).unwrap_err();
    assert!(matches!(err, Error::MalformedQuery(_)));

    let course = graph.resolver().resolve(NodeKind::Course, "c1").unwrap();
    let err = graph.mutator().upsert_node(&course.with_fields(NodeFields::Student)).unwrap_err();
    assert!(matches!(err, Error::MalformedQuery(_)));
}
