//! Edge storage operations.
//!
//! Edges are append-only. Each edge is stored once, keyed by ID, and indexed
//! under both endpoints so it can be traversed in either direction.
//!
//! `replies` edges form a forest: a post has at most one parent and no post
//! is its own ancestor.

use std::collections::HashSet;

use edugraph_core::encoding::keys::{
    decode_edge_key, encode_edge_by_source_key, encode_edge_by_target_key, encode_edge_key,
};
use edugraph_core::encoding::{Decoder, Encoder};
use edugraph_core::{Edge, EdgeId, EdgeKind, NodeId, Relationship};
use edugraph_storage::{Cursor, Transaction};

use super::error::{GraphError, GraphResult};
use super::node::NodeStore;
use super::IdGenerator;
use crate::index::AdjacencyIndex;

/// Table name for edge data.
pub const TABLE_EDGES: &str = "edges";

/// Table name for the outgoing adjacency index.
pub const TABLE_EDGES_BY_SOURCE: &str = "edges_by_source";

/// Table name for the incoming adjacency index.
pub const TABLE_EDGES_BY_TARGET: &str = "edges_by_target";

/// Edge storage operations.
pub struct EdgeStore;

impl EdgeStore {
    /// Create an edge between two existing nodes.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidNodeReference`] if either endpoint is missing
    /// - [`GraphError::EndpointMismatch`] if the endpoint kinds do not fit the
    ///   relationship
    /// - [`GraphError::SelfLoop`] if the relationship forbids self-loops and
    ///   `source == target`
    /// - [`GraphError::ReplyTree`] if a `replies` edge would give the target a
    ///   second parent or close a cycle
    pub fn create<T: Transaction>(
        tx: &mut T,
        id_gen: &IdGenerator,
        source: NodeId,
        target: NodeId,
        relationship: Relationship,
    ) -> GraphResult<Edge> {
        let kind = relationship.kind();

        let source_node =
            NodeStore::get(tx, source)?.ok_or(GraphError::InvalidNodeReference(source))?;
        let target_node =
            NodeStore::get(tx, target)?.ok_or(GraphError::InvalidNodeReference(target))?;

        if !kind.accepts(source_node.kind(), target_node.kind()) {
            return Err(GraphError::EndpointMismatch {
                kind,
                source_kind: source_node.kind(),
                target_kind: target_node.kind(),
            });
        }
        if source == target && !kind.allows_self_loop() {
            return Err(GraphError::SelfLoop(kind));
        }
        if kind == EdgeKind::Replies {
            Self::check_reply_tree(tx, source, target)?;
        }

        let edge = Edge::new(id_gen.next_edge_id(), source, target, relationship);

        tx.put(TABLE_EDGES, &encode_edge_key(edge.id), &edge.encode()?)?;
        tx.put(TABLE_EDGES_BY_SOURCE, &encode_edge_by_source_key(source, kind, edge.id), &[])?;
        tx.put(TABLE_EDGES_BY_TARGET, &encode_edge_by_target_key(target, kind, edge.id), &[])?;

        Ok(edge)
    }

    /// Get an edge by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge cannot be read or decoded.
    pub fn get<T: Transaction>(tx: &T, id: EdgeId) -> GraphResult<Option<Edge>> {
        match tx.get(TABLE_EDGES, &encode_edge_key(id))? {
            Some(bytes) => Ok(Some(Edge::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get an edge by ID, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EdgeNotFound`] if the edge does not exist.
    pub fn get_or_error<T: Transaction>(tx: &T, id: EdgeId) -> GraphResult<Edge> {
        Self::get(tx, id)?.ok_or(GraphError::EdgeNotFound(id))
    }

    /// All edges of a kind leaving `source`, in edge ID order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DataCorruption`] if the index names a missing edge.
    pub fn outgoing<T: Transaction>(
        tx: &T,
        source: NodeId,
        kind: EdgeKind,
    ) -> GraphResult<Vec<Edge>> {
        let ids = AdjacencyIndex::outgoing_ids(tx, source, Some(kind))?;
        Self::load_indexed(tx, &ids)
    }

    /// All edges of a kind arriving at `target`, in edge ID order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DataCorruption`] if the index names a missing edge.
    pub fn incoming<T: Transaction>(
        tx: &T,
        target: NodeId,
        kind: EdgeKind,
    ) -> GraphResult<Vec<Edge>> {
        let ids = AdjacencyIndex::incoming_ids(tx, target, Some(kind))?;
        Self::load_indexed(tx, &ids)
    }

    /// Count stored edges per kind.
    ///
    /// Scans the whole edge table.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan or decoding fails.
    pub fn count_by_kind<T: Transaction>(tx: &T) -> GraphResult<Vec<(EdgeKind, usize)>> {
        let mut counts = [0usize; EdgeKind::ALL.len()];
        let mut cursor = tx.cursor(TABLE_EDGES)?;
        while let Some((_, value)) = cursor.next()? {
            let edge = Edge::decode(&value)?;
            if let Some(slot) = EdgeKind::ALL.iter().position(|k| *k == edge.kind()) {
                counts[slot] += 1;
            }
        }
        Ok(EdgeKind::ALL.into_iter().zip(counts).collect())
    }

    /// The highest stored edge ID, if any edge exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails.
    pub fn max_id<T: Transaction>(tx: &T) -> GraphResult<Option<EdgeId>> {
        let mut cursor = tx.cursor(TABLE_EDGES)?;
        Ok(cursor.seek_last()?.and_then(|(key, _)| decode_edge_key(&key)))
    }

    /// The target must have no parent yet and must not be an ancestor of the
    /// source.
    fn check_reply_tree<T: Transaction>(tx: &T, source: NodeId, target: NodeId) -> GraphResult<()> {
        if AdjacencyIndex::has_incoming(tx, target, EdgeKind::Replies)? {
            return Err(GraphError::ReplyTree(format!("post {target} already has a parent")));
        }

        let mut seen = HashSet::new();
        let mut current = source;
        while seen.insert(current) {
            if current == target {
                return Err(GraphError::ReplyTree(format!(
                    "post {target} is an ancestor of post {source}"
                )));
            }
            let mut parent = None;
            AdjacencyIndex::for_each_incoming(tx, current, EdgeKind::Replies, |edge_id| {
                parent = Some(Self::get_or_error(tx, edge_id)?.source);
                Ok(false)
            })?;
            match parent {
                Some(parent) => current = parent,
                None => return Ok(()),
            }
        }
        Err(GraphError::DataCorruption(format!("replies chain above post {source} loops")))
    }

    fn load_indexed<T: Transaction>(tx: &T, ids: &[EdgeId]) -> GraphResult<Vec<Edge>> {
        ids.iter()
            .map(|&id| {
                Self::get(tx, id)?.ok_or_else(|| {
                    GraphError::DataCorruption(format!("adjacency index names missing edge {id}"))
                })
            })
            .collect()
    }
}
