//! Single-hop expansion.

use edugraph_core::{Edge, EdgeId, EdgeKind, NodeId};
use edugraph_storage::Transaction;

use super::Direction;
use crate::index::AdjacencyIndex;
use crate::store::{EdgeStore, GraphError, GraphResult};

/// A neighbor reached by a single hop.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandResult {
    /// The neighbor node.
    pub node: NodeId,
    /// The edge that was followed.
    pub edge: Edge,
    /// The direction the edge was followed in.
    pub direction: Direction,
}

/// Single-hop expansion over one edge kind.
pub struct Expand;

impl Expand {
    /// Neighbors of `node` over edges of `kind`, in edge ID order per direction.
    ///
    /// # Errors
    ///
    /// Returns an error if an index scan fails or an indexed edge is missing.
    pub fn neighbors<T: Transaction>(
        tx: &T,
        node: NodeId,
        kind: EdgeKind,
        direction: Direction,
    ) -> GraphResult<Vec<ExpandResult>> {
        let mut results = Vec::new();

        if direction.includes_outgoing() {
            AdjacencyIndex::for_each_outgoing(tx, node, kind, |edge_id| {
                let edge = load(tx, edge_id)?;
                results.push(ExpandResult { node: edge.target, edge, direction: Direction::Outgoing });
                Ok(true)
            })?;
        }

        if direction.includes_incoming() {
            AdjacencyIndex::for_each_incoming(tx, node, kind, |edge_id| {
                let edge = load(tx, edge_id)?;
                results.push(ExpandResult { node: edge.source, edge, direction: Direction::Incoming });
                Ok(true)
            })?;
        }

        Ok(results)
    }

    /// Neighbor IDs of `node` over edges of `kind`.
    ///
    /// A neighbor connected by several edges appears once per edge.
    ///
    /// # Errors
    ///
    /// Returns an error if an index scan fails or an indexed edge is missing.
    pub fn neighbor_ids<T: Transaction>(
        tx: &T,
        node: NodeId,
        kind: EdgeKind,
        direction: Direction,
    ) -> GraphResult<Vec<NodeId>> {
        Ok(Self::neighbors(tx, node, kind, direction)?.into_iter().map(|r| r.node).collect())
    }
}

fn load<T: Transaction>(tx: &T, id: EdgeId) -> GraphResult<Edge> {
    EdgeStore::get(tx, id)?
        .ok_or_else(|| GraphError::DataCorruption(format!("adjacency index names missing edge {id}")))
}
