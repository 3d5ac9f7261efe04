//! Atomic graph mutations.
//!
//! A [`MutationPlan`] lists the nodes and edges of one write. The
//! [`EdgeMutator`] commits a plan in a single write transaction: pending nodes
//! are created, attached fields merged into existing nodes, then the edges
//! written. Any failure aborts the transaction, so either every write of the
//! plan persists or none does.

use std::collections::BTreeMap;
use std::sync::Arc;

use edugraph_core::{Edge, Node, NodeFields, NodeId, NodeKey, Relationship};
use edugraph_graph::store::{EdgeStore, IdGenerator, NodeStore};
use edugraph_storage::{StorageEngine, Transaction};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::resolver::{EntityResolver, NodeRef};

/// The nodes and edges of one atomic write.
#[derive(Debug, Clone, Default)]
pub struct MutationPlan {
    nodes: Vec<NodeRef>,
    edges: Vec<PlannedEdge>,
}

#[derive(Debug, Clone)]
struct PlannedEdge {
    relationship: Relationship,
    from: usize,
    to: usize,
}

impl MutationPlan {
    /// Create an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its slot.
    ///
    /// A key already in the plan shares its slot. A stored reference wins over
    /// a pending one, and fields of the later reference replace earlier ones.
    pub fn node(&mut self, node_ref: NodeRef) -> usize {
        if let Some(slot) = self.nodes.iter().position(|n| n.key() == node_ref.key()) {
            let current = &mut self.nodes[slot];
            let fields = node_ref.fields().or(current.fields()).cloned();
            let mut merged = if current.is_pending() { node_ref } else { current.clone() };
            if let Some(fields) = fields {
                merged = merged.with_fields(fields);
            }
            *current = merged;
            return slot;
        }
        self.nodes.push(node_ref);
        self.nodes.len() - 1
    }

    /// Add an edge between two slots.
    pub fn edge(&mut self, relationship: Relationship, from: usize, to: usize) {
        self.edges.push(PlannedEdge { relationship, from, to });
    }

    /// The planned nodes.
    #[must_use]
    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    /// Number of planned edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn pending_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_pending()).count()
    }
}

/// The committed result of a [`MutationPlan`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    /// The nodes of the plan as stored after the commit, in slot order.
    pub nodes: Vec<Node>,
    /// The created edges, in plan order.
    pub edges: Vec<Edge>,
    /// Keys of pending references and the IDs assigned to them.
    pub created: BTreeMap<NodeKey, NodeId>,
}

/// The committed result of a single relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    /// Keys of the endpoints that were created and their new IDs.
    pub created: BTreeMap<NodeKey, NodeId>,
    /// The created edge.
    pub edge: Edge,
}

/// Commits relationships and node upserts.
pub struct EdgeMutator<E: StorageEngine> {
    engine: Arc<E>,
    ids: Arc<IdGenerator>,
    resolver: EntityResolver<E>,
    max_attempts: u32,
}

impl<E: StorageEngine> Clone for EdgeMutator<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            ids: Arc::clone(&self.ids),
            resolver: self.resolver.clone(),
            max_attempts: self.max_attempts,
        }
    }
}

impl<E: StorageEngine> EdgeMutator<E> {
    pub(crate) fn new(
        engine: Arc<E>,
        ids: Arc<IdGenerator>,
        resolver: EntityResolver<E>,
        max_attempts: u32,
    ) -> Self {
        Self { engine, ids, resolver, max_attempts: max_attempts.max(1) }
    }

    /// Commit `relationship` from `from` to `to`, creating pending endpoints.
    ///
    /// Repeated identical calls create repeated edges.
    ///
    /// # Errors
    ///
    /// - [`Error::RetryableConflict`] if a pending endpoint was created by
    ///   another writer since it was resolved
    /// - [`Error::MalformedQuery`] if the endpoint kinds do not fit the
    ///   relationship
    /// - [`Error::NodeNotFound`] if a stored endpoint no longer exists
    /// - [`Error::Rejected`] if a `replies` edge would break the reply tree
    pub fn apply_relationship(
        &self,
        relationship: Relationship,
        from: &NodeRef,
        to: &NodeRef,
    ) -> Result<MutationOutcome> {
        let mut plan = MutationPlan::new();
        let source = plan.node(from.clone());
        let target = plan.node(to.clone());
        plan.edge(relationship, source, target);

        let mut outcome = self.commit(&plan)?;
        let edge = outcome
            .edges
            .pop()
            .ok_or_else(|| Error::Internal("committed plan returned no edge".to_owned()))?;
        Ok(MutationOutcome { created: outcome.created, edge })
    }

    /// [`apply_relationship`](Self::apply_relationship), re-resolving both
    /// endpoints and retrying after a lost creation race.
    ///
    /// # Errors
    ///
    /// Returns the last [`Error::RetryableConflict`] once the configured
    /// attempts are used up, or any other error immediately.
    pub fn apply_with_retry(
        &self,
        relationship: Relationship,
        from: NodeRef,
        to: NodeRef,
    ) -> Result<MutationOutcome> {
        let mut first_attempt = true;
        self.retry(|| {
            if std::mem::take(&mut first_attempt) {
                return self.apply_relationship(relationship.clone(), &from, &to);
            }
            let from = self.resolver.refresh(&from)?;
            let to = self.resolver.refresh(&to)?;
            self.apply_relationship(relationship.clone(), &from, &to)
        })
    }

    /// Create or update a single node without adding edges.
    ///
    /// # Errors
    ///
    /// Same as [`apply_relationship`](Self::apply_relationship).
    pub fn upsert_node(&self, node_ref: &NodeRef) -> Result<Node> {
        let mut plan = MutationPlan::new();
        plan.node(node_ref.clone());
        self.commit(&plan)?
            .nodes
            .pop()
            .ok_or_else(|| Error::Internal("committed plan returned no node".to_owned()))
    }

    /// Run `op` until it succeeds, fails with a non-conflict error, or the
    /// configured attempts are used up.
    ///
    /// `op` must resolve its endpoints itself so each attempt sees the state
    /// left by the writer that won the previous race.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    pub fn retry<T>(&self, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 1;
        loop {
            match op() {
                Err(Error::RetryableConflict(reason)) if attempt < self.max_attempts => {
                    debug!(attempt, %reason, "creation race lost, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Commit a plan in one write transaction.
    ///
    /// # Errors
    ///
    /// Same as [`apply_relationship`](Self::apply_relationship). On error no
    /// write of the plan persists.
    pub fn commit(&self, plan: &MutationPlan) -> Result<PlanOutcome> {
        let mut tx = self.engine.begin_write()?;
        match write_plan(&mut tx, &self.ids, plan) {
            Ok(outcome) => {
                tx.commit()?;
                debug!(
                    nodes = plan.nodes().len(),
                    edges = plan.edge_count(),
                    created = outcome.created.len(),
                    kinds = ?outcome.edges.iter().map(Edge::kind).collect::<Vec<_>>(),
                    "mutation committed"
                );
                self.resolver.remember_committed(&outcome.nodes);
                Ok(outcome)
            }
            Err(err) => {
                if let Err(abort_err) = tx.rollback() {
                    warn!(error = %abort_err, "failed to abort mutation");
                }
                debug!(pending = plan.pending_count(), error = %err, "mutation aborted");
                Err(err)
            }
        }
    }
}

fn write_plan<T: Transaction>(
    tx: &mut T,
    ids: &IdGenerator,
    plan: &MutationPlan,
) -> Result<PlanOutcome> {
    let mut nodes = Vec::with_capacity(plan.nodes.len());
    let mut created = BTreeMap::new();

    for node_ref in &plan.nodes {
        let node = match node_ref.id() {
            Some(id) => {
                let node = match node_ref.fields() {
                    Some(fields) => NodeStore::merge_fields(tx, id, fields.clone())?,
                    None => NodeStore::get(tx, id)?
                        .ok_or_else(|| Error::NodeNotFound(node_ref.key().to_string()))?,
                };
                if !node.matches(node_ref.key()) {
                    return Err(Error::IntegrityAnomaly(format!(
                        "{} resolved to node {id}, which is {}",
                        node_ref.key(),
                        node.key()
                    )));
                }
                node
            }
            None => {
                let key = node_ref.key();
                let fields = match node_ref.fields() {
                    Some(fields) => fields.clone(),
                    None => NodeFields::empty(key.kind).ok_or_else(|| {
                        Error::malformed(format!("{key} cannot be created without attributes"))
                    })?,
                };
                if fields.kind() != key.kind {
                    return Err(Error::malformed(format!(
                        "{key} cannot be created with {} attributes",
                        fields.kind()
                    )));
                }
                let node = NodeStore::create(tx, ids, &key.domain_id, fields)?;
                created.insert(key.clone(), node.id);
                node
            }
        };
        nodes.push(node);
    }

    let mut edges = Vec::with_capacity(plan.edges.len());
    for planned in &plan.edges {
        let (Some(from), Some(to)) = (nodes.get(planned.from), nodes.get(planned.to)) else {
            return Err(Error::malformed("edge refers to a node outside the plan"));
        };
        edges.push(EdgeStore::create(tx, ids, from.id, to.id, planned.relationship.clone())?);
    }

    Ok(PlanOutcome { nodes, edges, created })
}
