//! Course recommendations.
//!
//! Starting from a student, the traversal walks
//!
//! ```text
//! student -enrolled-> course <-teaches- instructor -teaches-> course
//!         <-enrolled- peer -enrolled-> candidate
//! ```
//!
//! and suggests the candidates the student is not enrolled in. A hop that
//! finds nothing prunes its branch, so a student without enrollments, or
//! whose courses have no instructor, gets no suggestions.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use edugraph_core::{EdgeKind, NodeId, NodeKind};
use edugraph_graph::schema::SchemaCatalog;
use edugraph_graph::store::NodeStore;
use edugraph_graph::traversal::{Direction, Expand, HopQuery};
use edugraph_storage::{StorageEngine, Transaction};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::resolver::EntityResolver;
use crate::schema::SchemaManager;

/// A suggested course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    /// The course node.
    pub node_id: NodeId,
    /// The course's domain identifier.
    pub course_id: String,
    /// The course title, if one was set.
    pub title: Option<String>,
    /// Number of distinct peers enrolled in the course.
    pub support: usize,
}

/// Read-only course recommendation query.
pub struct RecommendationTraversal<E: StorageEngine> {
    engine: Arc<E>,
    catalog: Arc<RwLock<SchemaCatalog>>,
    resolver: EntityResolver<E>,
}

impl<E: StorageEngine> RecommendationTraversal<E> {
    pub(crate) fn new(
        engine: Arc<E>,
        catalog: Arc<RwLock<SchemaCatalog>>,
        resolver: EntityResolver<E>,
    ) -> Self {
        Self { engine, catalog, resolver }
    }

    /// Suggest at most `limit` courses for a student.
    ///
    /// Courses are ranked by how many peers take them, then by course ID.
    /// Courses the student is enrolled in are never suggested. An unknown
    /// student gets an empty list.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedQuery`] if `student_id` is empty or the schema was
    ///   never defined
    /// - [`Error::IntegrityAnomaly`] if an index refers to missing data
    pub fn recommend(&self, student_id: &str, limit: usize) -> Result<Vec<CourseSummary>> {
        SchemaManager::<E>::require_reverse(&self.catalog, EdgeKind::Teaches)?;
        SchemaManager::<E>::require_reverse(&self.catalog, EdgeKind::Enrolled)?;

        let tx = self.engine.begin_read()?;
        let student = self.resolver.resolve_in(&tx, NodeKind::Student, student_id)?;
        let Some(student) = student.id() else {
            debug!(student_id, "no recommendations for unknown student");
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let result = HopQuery::from_nodes([student])
            .hop(EdgeKind::Enrolled, Direction::Outgoing)
            .hop(EdgeKind::Teaches, Direction::Incoming)
            .hop(EdgeKind::Teaches, Direction::Outgoing)
            .hop_excluding(EdgeKind::Enrolled, Direction::Incoming, [student])
            .hop(EdgeKind::Enrolled, Direction::Outgoing)
            .execute(&tx)?;
        if result.is_empty() {
            return Ok(Vec::new());
        }

        let enrolled: BTreeSet<NodeId> =
            Expand::neighbor_ids(&tx, student, EdgeKind::Enrolled, Direction::Outgoing)?
                .into_iter()
                .collect();

        let mut suggestions = Vec::new();
        for (course, peers) in result.last_predecessors() {
            if enrolled.contains(&course) {
                continue;
            }
            suggestions.push(summarize(&tx, course, peers.len())?);
        }

        suggestions.sort_by(|a, b| {
            (Reverse(a.support), &a.course_id).cmp(&(Reverse(b.support), &b.course_id))
        });
        suggestions.truncate(limit);

        debug!(student_id, suggestions = suggestions.len(), "recommendations computed");
        Ok(suggestions)
    }
}

fn summarize<T: Transaction>(tx: &T, course: NodeId, support: usize) -> Result<CourseSummary> {
    let node = NodeStore::get(tx, course)?
        .ok_or_else(|| Error::IntegrityAnomaly(format!("traversal reached missing node {course}")))?;
    if node.kind() != NodeKind::Course {
        return Err(Error::IntegrityAnomaly(format!(
            "enrolled edge leads to {} instead of a course",
            node.key()
        )));
    }
    Ok(CourseSummary {
        node_id: node.id,
        course_id: node.domain_id.clone(),
        title: node.title().map(str::to_owned),
        support,
    })
}
