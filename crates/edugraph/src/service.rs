//! The graph service.
//!
//! [`EduGraph`] owns the storage engine and wires it into every component.
//! Each domain event method resolves its endpoints, commits one write
//! transaction, and re-resolves and retries if it lost a creation race.

use std::sync::{Arc, RwLock};

use edugraph_core::{EdgeKind, Node, NodeFields, NodeKind, Relationship};
use edugraph_graph::schema::{SchemaCatalog, SchemaStore};
use edugraph_graph::store::{EdgeStore, IdGenerator, NodeStore};
use edugraph_graph::traversal::{Direction, Expand};
use edugraph_storage::backends::RedbEngine;
use edugraph_storage::StorageEngine;
use serde::Serialize;
use tracing::debug;

use crate::config::{EduGraphBuilder, EngineConfig};
use crate::error::{Error, Result};
use crate::forum::{ForumThreadBuilder, Post, ThreadNode};
use crate::mutator::{EdgeMutator, MutationOutcome};
use crate::recommend::{CourseSummary, RecommendationTraversal};
use crate::resolver::{EntityResolver, NodeRef};
use crate::schema::SchemaManager;

/// A neighbor returned by [`EduGraph::neighbors`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    /// The neighbor node.
    pub node: Node,
    /// The relationship connecting it.
    pub relationship: Relationship,
    /// Whether the edge was followed forward or backward.
    pub incoming: bool,
}

/// Node and edge counts per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Node count per kind.
    pub nodes: Vec<(NodeKind, usize)>,
    /// Edge count per kind.
    pub edges: Vec<(EdgeKind, usize)>,
}

impl GraphStats {
    /// Total number of nodes.
    #[must_use]
    pub fn node_total(&self) -> usize {
        self.nodes.iter().map(|(_, n)| n).sum()
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_total(&self) -> usize {
        self.edges.iter().map(|(_, n)| n).sum()
    }

    /// Number of nodes of one kind.
    #[must_use]
    pub fn nodes_of(&self, kind: NodeKind) -> usize {
        self.nodes.iter().find(|(k, _)| *k == kind).map_or(0, |(_, n)| *n)
    }

    /// Number of edges of one kind.
    #[must_use]
    pub fn edges_of(&self, kind: EdgeKind) -> usize {
        self.edges.iter().find(|(k, _)| *k == kind).map_or(0, |(_, n)| *n)
    }
}

/// The education graph.
///
/// `EduGraph` is `Send + Sync`; share it across threads with an `Arc`.
///
/// # Examples
///
/// ```ignore
/// use edugraph::EduGraph;
///
/// let graph = EduGraph::in_memory()?;
/// graph.schema().define_schema()?;
///
/// graph.enroll_student("s1", "c1")?;
/// graph.enroll_student("s2", "c1")?;
/// graph.instructor_teaches("i1", "c1")?;
/// graph.instructor_teaches("i1", "c2")?;
/// graph.enroll_student("s2", "c2")?;
///
/// let courses = graph.recommend("s1", 5)?;
/// assert_eq!(courses[0].course_id, "c2");
/// ```
pub struct EduGraph<E: StorageEngine = RedbEngine> {
    engine: Arc<E>,
    config: EngineConfig,
    catalog: Arc<RwLock<SchemaCatalog>>,
    schema: SchemaManager<E>,
    resolver: EntityResolver<E>,
    mutator: EdgeMutator<E>,
    recommender: RecommendationTraversal<E>,
    forum: ForumThreadBuilder<E>,
}

impl EduGraph {
    /// Open or create a graph at `path` with default settings.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the database cannot be opened.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        EduGraphBuilder::new().path(path).open()
    }

    /// Create an in-memory graph with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn in_memory() -> Result<Self> {
        EduGraphBuilder::new().in_memory().open()
    }

    /// A builder for a graph with custom settings.
    #[must_use]
    pub fn builder() -> EduGraphBuilder {
        EduGraphBuilder::new()
    }
}

impl<E: StorageEngine> EduGraph<E> {
    /// Build the service over an already opened engine.
    ///
    /// Loads the stored schema and continues ID assignment after the highest
    /// stored IDs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid configuration, or an error if
    /// the stored state cannot be read.
    pub fn with_engine(engine: E, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let engine = Arc::new(engine);

        let (catalog, ids) = {
            let tx = engine.begin_read()?;
            let catalog = SchemaStore::load(&tx)?;
            let ids = IdGenerator::after(NodeStore::max_id(&tx)?, EdgeStore::max_id(&tx)?);
            (catalog, ids)
        };
        debug!(schema_version = catalog.version(), "graph opened");

        let catalog = Arc::new(RwLock::new(catalog));
        let ids = Arc::new(ids);

        let resolver =
            EntityResolver::new(Arc::clone(&engine), Arc::clone(&catalog), config.resolver_cache);
        let mutator = EdgeMutator::new(
            Arc::clone(&engine),
            ids,
            resolver.clone(),
            config.max_conflict_retries,
        );
        let schema = SchemaManager::new(
            Arc::clone(&engine),
            Arc::clone(&catalog),
            resolver.clone(),
            config.allow_destructive_reset,
        );
        let recommender =
            RecommendationTraversal::new(Arc::clone(&engine), Arc::clone(&catalog), resolver.clone());
        let forum = ForumThreadBuilder::new(Arc::clone(&engine), resolver.clone(), mutator.clone());

        Ok(Self { engine, config, catalog, schema, resolver, mutator, recommender, forum })
    }

    /// The configuration this graph was opened with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The schema manager.
    #[must_use]
    pub const fn schema(&self) -> &SchemaManager<E> {
        &self.schema
    }

    /// The identity resolver.
    #[must_use]
    pub const fn resolver(&self) -> &EntityResolver<E> {
        &self.resolver
    }

    /// The edge mutator.
    #[must_use]
    pub const fn mutator(&self) -> &EdgeMutator<E> {
        &self.mutator
    }

    /// The recommendation traversal.
    #[must_use]
    pub const fn recommender(&self) -> &RecommendationTraversal<E> {
        &self.recommender
    }

    /// The forum thread builder.
    #[must_use]
    pub const fn forum(&self) -> &ForumThreadBuilder<E> {
        &self.forum
    }

    // ========================================================================
    // Domain events
    // ========================================================================

    /// Record that a student enrolled in a course.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetryableConflict`] if creation races persist past the
    /// configured attempts, or the error of the failed step.
    pub fn enroll_student(&self, student_id: &str, course_id: &str) -> Result<MutationOutcome> {
        self.link(
            Relationship::Enrolled,
            self.resolver.resolve(NodeKind::Student, student_id)?,
            self.resolver.resolve(NodeKind::Course, course_id)?,
        )
    }

    /// Record that an instructor teaches a course.
    ///
    /// # Errors
    ///
    /// See [`enroll_student`](Self::enroll_student).
    pub fn instructor_teaches(&self, instructor_id: &str, course_id: &str) -> Result<MutationOutcome> {
        self.link(
            Relationship::Teaches,
            self.resolver.resolve(NodeKind::Instructor, instructor_id)?,
            self.resolver.resolve(NodeKind::Course, course_id)?,
        )
    }

    /// Record an assignment submission and its score.
    ///
    /// The score is stored on the edge and as the assignment's latest score.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedQuery`] if `score` is not finite, otherwise
    /// see [`enroll_student`](Self::enroll_student).
    pub fn submit_assignment(
        &self,
        student_id: &str,
        assignment_id: &str,
        score: f64,
    ) -> Result<MutationOutcome> {
        if !score.is_finite() {
            return Err(Error::malformed(format!("score must be finite, got {score}")));
        }
        self.link(
            Relationship::Submitted { score },
            self.resolver.resolve(NodeKind::Student, student_id)?,
            self.resolver
                .resolve(NodeKind::Assignment, assignment_id)?
                .with_fields(NodeFields::Assignment { score: Some(score) }),
        )
    }

    /// Record that a student follows an instructor.
    ///
    /// # Errors
    ///
    /// See [`enroll_student`](Self::enroll_student).
    pub fn follow_instructor(&self, student_id: &str, instructor_id: &str) -> Result<MutationOutcome> {
        self.link(
            Relationship::Follows,
            self.resolver.resolve(NodeKind::Student, student_id)?,
            self.resolver.resolve(NodeKind::Instructor, instructor_id)?,
        )
    }

    /// Record a direct message between two users.
    ///
    /// # Errors
    ///
    /// See [`enroll_student`](Self::enroll_student).
    pub fn message_user(
        &self,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
    ) -> Result<MutationOutcome> {
        self.link(
            Relationship::message(content),
            self.resolver.resolve(NodeKind::User, sender_id)?,
            self.resolver.resolve(NodeKind::User, receiver_id)?,
        )
    }

    /// Record that `prereq_id` must be taken before `course_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedQuery`] if both identifiers are the same,
    /// otherwise see [`enroll_student`](Self::enroll_student).
    pub fn add_prerequisite(&self, course_id: &str, prereq_id: &str) -> Result<MutationOutcome> {
        self.link(
            Relationship::Prerequisite,
            self.resolver.resolve(NodeKind::Course, course_id)?,
            self.resolver.resolve(NodeKind::Course, prereq_id)?,
        )
    }

    /// Record that a student completed a course.
    ///
    /// Completion is independent of enrollment.
    ///
    /// # Errors
    ///
    /// See [`enroll_student`](Self::enroll_student).
    pub fn mark_course_completed(&self, student_id: &str, course_id: &str) -> Result<MutationOutcome> {
        self.link(
            Relationship::Completed,
            self.resolver.resolve(NodeKind::Student, student_id)?,
            self.resolver.resolve(NodeKind::Course, course_id)?,
        )
    }

    /// Set a course's title, creating the course if needed.
    ///
    /// # Errors
    ///
    /// See [`enroll_student`](Self::enroll_student).
    pub fn set_course_title(&self, course_id: &str, title: &str) -> Result<Node> {
        let fields = NodeFields::Course { title: Some(title.to_owned()) };
        self.mutator.retry(|| {
            let course = self.resolver.resolve(NodeKind::Course, course_id)?;
            self.mutator.upsert_node(&course.with_fields(fields.clone()))
        })
    }

    /// Create a top-level forum post.
    ///
    /// # Errors
    ///
    /// See [`ForumThreadBuilder::create_post`].
    pub fn create_post(&self, post_id: &str, author_id: &str, content: &str) -> Result<Post> {
        self.forum.create_post(post_id, author_id, content)
    }

    /// Reply to a forum post.
    ///
    /// # Errors
    ///
    /// See [`ForumThreadBuilder::reply_to`].
    pub fn reply_to(
        &self,
        parent_id: &str,
        reply_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<Post> {
        self.forum.reply_to(parent_id, reply_id, author_id, content)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Suggest courses for a student.
    ///
    /// # Errors
    ///
    /// See [`RecommendationTraversal::recommend`].
    pub fn recommend(&self, student_id: &str, limit: usize) -> Result<Vec<CourseSummary>> {
        self.recommender.recommend(student_id, limit)
    }

    /// Read a reply thread.
    ///
    /// # Errors
    ///
    /// See [`ForumThreadBuilder::thread`].
    pub fn thread(&self, root_post_id: &str) -> Result<ThreadNode> {
        self.forum.thread(root_post_id)
    }

    /// Look up a node by its domain identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedQuery`] for an empty identifier or an
    /// undefined schema.
    pub fn node(&self, kind: NodeKind, domain_id: &str) -> Result<Option<Node>> {
        let tx = self.engine.begin_read()?;
        let node_ref = self.resolver.resolve_in(&tx, kind, domain_id)?;
        match node_ref.id() {
            Some(id) => Ok(NodeStore::get(&tx, id)?),
            None => Ok(None),
        }
    }

    /// Nodes connected to `(kind, domain_id)` by `edge` edges.
    ///
    /// An unknown node has no neighbors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedQuery`] if incoming edges are requested for
    /// a predicate without reverse traversal.
    pub fn neighbors(
        &self,
        kind: NodeKind,
        domain_id: &str,
        edge: EdgeKind,
        direction: Direction,
    ) -> Result<Vec<Neighbor>> {
        if direction.includes_incoming() {
            SchemaManager::<E>::require_reverse(&self.catalog, edge)?;
        }

        let tx = self.engine.begin_read()?;
        let Some(id) = self.resolver.resolve_in(&tx, kind, domain_id)?.id() else {
            return Ok(Vec::new());
        };

        Expand::neighbors(&tx, id, edge, direction)?
            .into_iter()
            .map(|found| -> Result<Neighbor> {
                let node = NodeStore::get(&tx, found.node)?.ok_or_else(|| {
                    Error::IntegrityAnomaly(format!(
                        "edge {} refers to missing node {}",
                        found.edge.id, found.node
                    ))
                })?;
                Ok(Neighbor {
                    node,
                    relationship: found.edge.relationship,
                    incoming: found.direction == Direction::Incoming,
                })
            })
            .collect()
    }

    /// Count nodes and edges per kind.
    ///
    /// # Errors
    ///
    /// Returns an error if a scan fails.
    pub fn stats(&self) -> Result<GraphStats> {
        let tx = self.engine.begin_read()?;
        let mut nodes = Vec::with_capacity(NodeKind::ALL.len());
        for kind in NodeKind::ALL {
            nodes.push((kind, NodeStore::count_by_kind(&tx, kind)?));
        }
        let edges = EdgeStore::count_by_kind(&tx)?;
        Ok(GraphStats { nodes, edges })
    }

    /// The stored schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the catalog lock is poisoned.
    pub fn catalog(&self) -> Result<SchemaCatalog> {
        self.schema.catalog()
    }

    /// Flush buffered writes to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn flush(&self) -> Result<()> {
        Ok(self.engine.flush()?)
    }

    fn link(&self, relationship: Relationship, from: NodeRef, to: NodeRef) -> Result<MutationOutcome> {
        self.mutator.apply_with_retry(relationship, from, to)
    }
}
