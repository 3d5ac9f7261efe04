//! Mutations persist completely or not at all.

use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use edugraph::{EduGraph, EngineConfig, Error, NodeKind, Relationship};
use edugraph_storage::backends::{RedbCursor, RedbEngine, RedbTransaction};
use edugraph_storage::{StorageEngine, StorageError, Transaction};

/// Engine whose write transactions fail every put to one table while armed.
struct FailingEngine {
    inner: RedbEngine,
    table: &'static str,
    armed: Arc<AtomicBool>,
}

struct FailingTransaction {
    inner: RedbTransaction,
    table: &'static str,
    armed: Arc<AtomicBool>,
}

impl StorageEngine for FailingEngine {
    type Transaction<'a> = FailingTransaction;

    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError> {
        Ok(self.wrap(self.inner.begin_read()?))
    }

    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError> {
        Ok(self.wrap(self.inner.begin_write()?))
    }
}

impl FailingEngine {
    fn wrap(&self, inner: RedbTransaction) -> FailingTransaction {
        FailingTransaction { inner, table: self.table, armed: Arc::clone(&self.armed) }
    }
}

impl Transaction for FailingTransaction {
    type Cursor<'a>
        = RedbCursor<'a>
    where
        Self: 'a;

    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(table, key)
    }

    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        if table == self.table && self.armed.load(Ordering::SeqCst) {
            return Err(StorageError::Internal(format!("injected failure writing {table}")));
        }
        self.inner.put(table, key, value)
    }

    fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool, StorageError> {
        self.inner.delete(table, key)
    }

    fn cursor(&self, table: &str) -> Result<Self::Cursor<'_>, StorageError> {
        self.inner.cursor(table)
    }

    fn range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Self::Cursor<'_>, StorageError> {
        self.inner.range(table, start, end)
    }

    fn commit(self) -> Result<(), StorageError> {
        self.inner.commit()
    }

    fn rollback(self) -> Result<(), StorageError> {
        self.inner.rollback()
    }

    fn is_read_only(&self) -> bool {
        self.inner.is_read_only()
    }
}

fn failing_graph(table: &'static str) -> (EduGraph<FailingEngine>, Arc<AtomicBool>) {
    let armed = Arc::new(AtomicBool::new(false));
    let engine = FailingEngine {
        inner: RedbEngine::in_memory().expect("Failed to create in-memory engine"),
        table,
        armed: Arc::clone(&armed),
    };
    let graph = EduGraph::with_engine(engine, EngineConfig::in_memory()).unwrap();
    graph.schema().define_schema().unwrap();
    (graph, armed)
}

#[test]
fn failed_edge_write_leaves_no_nodes() {
    let (graph, armed) = failing_graph("edges");
    armed.store(true, Ordering::SeqCst);

    let err = graph.enroll_student("s1", "c1").unwrap_err();
    assert!(matches!(err, Error::Internal(_)), "{err}");

    armed.store(false, Ordering::SeqCst);
    assert!(graph.node(NodeKind::Student, "s1").unwrap().is_none());
    assert!(graph.node(NodeKind::Course, "c1").unwrap().is_none());
    let stats = graph.stats().unwrap();
    assert_eq!(stats.node_total(), 0);
    assert_eq!(stats.edge_total(), 0);
    assert_eq!(graph.resolver().cached_len().unwrap(), 0);
}

#[test]
fn failed_index_write_leaves_no_edge() {
    let (graph, armed) = failing_graph("edges_by_target");
    graph.enroll_student("s1", "c1").unwrap();

    armed.store(true, Ordering::SeqCst);
    assert!(graph.enroll_student("s2", "c1").is_err());
    armed.store(false, Ordering::SeqCst);

    let stats = graph.stats().unwrap();
    assert_eq!(stats.node_total(), 2);
    assert_eq!(stats.edge_total(), 1);

    // the graph is still usable and the failed call can be repeated
    graph.enroll_student("s2", "c1").unwrap();
    assert_eq!(graph.stats().unwrap().edge_total(), 2);
}

#[test]
fn failed_post_leaves_no_author() {
    let (graph, armed) = failing_graph("edges_by_source");
    armed.store(true, Ordering::SeqCst);

    assert!(graph.create_post("p1", "u1", "hello").is_err());
    armed.store(false, Ordering::SeqCst);

    assert!(graph.node(NodeKind::Post, "p1").unwrap().is_none());
    assert!(graph.node(NodeKind::User, "u1").unwrap().is_none());
}

#[test]
fn stale_pending_reference_conflicts_without_partial_writes() {
    let graph = EduGraph::in_memory().unwrap();
    graph.schema().define_schema().unwrap();

    let student = graph.resolver().resolve(NodeKind::Student, "s1").unwrap();
    let course = graph.resolver().resolve(NodeKind::Course, "c1").unwrap();
    assert!(course.is_pending());

    // another writer creates the course in between
    let winner = graph.enroll_student("s2", "c1").unwrap();

    let err = graph.mutator().apply_relationship(Relationship::Enrolled, &student, &course).unwrap_err();
    assert!(matches!(err, Error::RetryableConflict(_)), "{err}");
    assert!(err.is_retryable());
    assert!(graph.node(NodeKind::Student, "s1").unwrap().is_none());

    let outcome = graph.mutator().apply_with_retry(Relationship::Enrolled, student, course).unwrap();
    assert_eq!(outcome.edge.target, winner.edge.target);
    assert_eq!(outcome.created.len(), 1);
    assert_eq!(graph.stats().unwrap().nodes_of(NodeKind::Course), 1);
}
