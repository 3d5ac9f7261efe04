//! `EduGraph` - relationship graph engine for an education platform
//!
//! EduGraph records who is enrolled where, who teaches what, who follows whom,
//! which assignments were submitted, and the forum and messaging threads
//! between users. It is embedded: the graph lives in a redb database owned by
//! the process.
//!
//! # Components
//!
//! - [`SchemaManager`] - declares node types, predicates and indexes; resets
//!   the graph on explicit request
//! - [`EntityResolver`] - maps domain identifiers to graph nodes
//! - [`EdgeMutator`] - commits nodes and edges atomically, retrying lost
//!   creation races
//! - [`RecommendationTraversal`] - ranked course suggestions
//! - [`ForumThreadBuilder`] - posts, replies and reply trees
//!
//! [`EduGraph`] owns the storage engine and exposes one method per domain
//! event.
//!
//! # Quick Start
//!
//! ```ignore
//! use edugraph::EduGraph;
//!
//! let graph = EduGraph::open("campus.redb")?;
//! graph.schema().define_schema()?;
//!
//! graph.enroll_student("s1", "c1")?;
//! graph.instructor_teaches("i1", "c1")?;
//! graph.set_course_title("c1", "Graph Theory")?;
//!
//! let post = graph.create_post("p1", "u1", "Where are the lecture notes?")?;
//! graph.reply_to(&post.post_id, "p2", "u2", "On the course page.")?;
//! let thread = graph.thread("p1")?;
//! assert_eq!(thread.len(), 2);
//! ```
//!
//! # Errors
//!
//! Every operation returns [`Result`]. [`Error::is_retryable`] tells whether
//! an error is worth retrying with backoff.

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

mod config;
mod error;
mod forum;
mod mutator;
mod recommend;
mod resolver;
mod schema;
mod service;

pub use config::{EduGraphBuilder, EngineConfig, StorageLocation, DEFAULT_MAX_CONFLICT_RETRIES};
pub use error::{Error, Result};
pub use forum::{ForumThreadBuilder, Post, ThreadNode};
pub use mutator::{EdgeMutator, MutationOutcome, MutationPlan, PlanOutcome};
pub use recommend::{CourseSummary, RecommendationTraversal};
pub use resolver::{EntityResolver, NodeRef};
pub use schema::{education_schema, DropAll, ResetReport, SchemaManager};
pub use service::{EduGraph, GraphStats, Neighbor};

pub use edugraph_core::{EdgeKind, Node, NodeFields, NodeId, NodeKey, NodeKind, Relationship};
pub use edugraph_graph::schema::{
    IndexKind, PredicateDef, SchemaCatalog, SchemaChange, SchemaDefinition, TypeDef, ValueType,
};
pub use edugraph_graph::traversal::Direction;
pub use edugraph_storage::backends::RedbEngine;
