//! Course recommendations.

use edugraph::{EduGraph, Error};

fn create_graph() -> EduGraph {
    let graph = EduGraph::in_memory().expect("Failed to create in-memory graph");
    graph.schema().define_schema().expect("Failed to define schema");
    graph
}

fn course_ids(graph: &EduGraph, student: &str, limit: usize) -> Vec<String> {
    graph.recommend(student, limit).unwrap().into_iter().map(|c| c.course_id).collect()
}

/// s1 and s2 take c1, i1 teaches c1 and c2, s2 also takes c2.
fn small_campus() -> EduGraph {
    let graph = create_graph();
    graph.enroll_student("s1", "c1").unwrap();
    graph.enroll_student("s2", "c1").unwrap();
    graph.instructor_teaches("i1", "c1").unwrap();
    graph.instructor_teaches("i1", "c2").unwrap();
    graph.enroll_student("s2", "c2").unwrap();
    graph
}

#[test]
fn peers_course_is_suggested_and_own_course_is_not() {
    let graph = small_campus();
    graph.set_course_title("c2", "Algorithms").unwrap();

    let suggestions = graph.recommend("s1", 5).unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].course_id, "c2");
    assert_eq!(suggestions[0].title.as_deref(), Some("Algorithms"));
    assert_eq!(suggestions[0].support, 1);
}

#[test]
fn student_enrolled_everywhere_gets_nothing() {
    let graph = small_campus();
    assert!(course_ids(&graph, "s2", 5).is_empty());
}

#[test]
fn unknown_student_and_zero_limit_are_empty() {
    let graph = small_campus();
    assert!(graph.recommend("ghost", 5).unwrap().is_empty());
    assert!(graph.recommend("s1", 0).unwrap().is_empty());
}

#[test]
fn courses_without_instructor_prune_everything() {
    let graph = create_graph();
    graph.enroll_student("s1", "c1").unwrap();
    graph.enroll_student("s2", "c1").unwrap();
    graph.enroll_student("s2", "c2").unwrap();

    assert!(course_ids(&graph, "s1", 5).is_empty());
}

#[test]
fn student_without_peers_gets_nothing() {
    let graph = create_graph();
    graph.enroll_student("s1", "c1").unwrap();
    graph.instructor_teaches("i1", "c1").unwrap();
    graph.instructor_teaches("i1", "c2").unwrap();

    assert!(course_ids(&graph, "s1", 5).is_empty());
}

#[test]
fn ranked_by_support_then_course_id() {
    let graph = create_graph();
    graph.enroll_student("s1", "c1").unwrap();
    for course in ["c1", "c2", "c3", "c4"] {
        graph.instructor_teaches("i1", course).unwrap();
    }
    // c3 has two peers, c2 and c4 one each
    graph.enroll_student("s2", "c2").unwrap();
    graph.enroll_student("s2", "c3").unwrap();
    graph.enroll_student("s3", "c3").unwrap();
    graph.enroll_student("s4", "c4").unwrap();
    graph.enroll_student("s4", "c1").unwrap();

    assert_eq!(course_ids(&graph, "s1", 10), vec!["c3", "c2", "c4"]);
    assert_eq!(course_ids(&graph, "s1", 2), vec!["c3", "c2"]);

    let top = graph.recommend("s1", 1).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].support, 2);
}

#[test]
fn repeated_edges_do_not_inflate_support() {
    let graph = small_campus();
    graph.enroll_student("s2", "c2").unwrap();
    graph.instructor_teaches("i1", "c2").unwrap();

    let suggestions = graph.recommend("s1", 5).unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].support, 1);
}

#[test]
fn completion_does_not_count_as_enrollment() {
    let graph = small_campus();
    graph.mark_course_completed("s1", "c2").unwrap();
    assert_eq!(course_ids(&graph, "s1", 5), vec!["c2"]);
}

#[test]
fn recommendation_requires_schema() {
    let graph = EduGraph::in_memory().unwrap();
    assert!(matches!(graph.recommend("s1", 5), Err(Error::MalformedQuery(_))));
}
