//! Adjacency index for graph traversal.
//!
//! Key format, see [`edugraph_core::encoding::keys`]:
//!
//! - Outgoing: `[0x03][source_id][edge_kind][edge_id]`
//! - Incoming: `[0x04][target_id][edge_kind][edge_id]`
//!
//! Both directions are plain index entries over a single stored edge, so
//! reverse traversal never duplicates edge data.

use std::ops::Bound;

use edugraph_core::encoding::keys::{
    decode_edge_by_source_edge_id, decode_edge_by_target_edge_id, encode_edge_by_source_kind_prefix,
    encode_edge_by_source_prefix, encode_edge_by_target_kind_prefix, encode_edge_by_target_prefix,
    prefix_end,
};
use edugraph_core::{EdgeId, EdgeKind, NodeId};
use edugraph_storage::{Cursor, Transaction};

use crate::store::{GraphResult, TABLE_EDGES_BY_SOURCE, TABLE_EDGES_BY_TARGET};

/// Adjacency list index for neighbor lookups.
pub struct AdjacencyIndex;

impl AdjacencyIndex {
    /// Edge IDs leaving `source`, optionally restricted to one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the index scan fails.
    pub fn outgoing_ids<T: Transaction>(
        tx: &T,
        source: NodeId,
        kind: Option<EdgeKind>,
    ) -> GraphResult<Vec<EdgeId>> {
        let prefix = match kind {
            Some(kind) => encode_edge_by_source_kind_prefix(source, kind),
            None => encode_edge_by_source_prefix(source),
        };
        Self::collect(tx, TABLE_EDGES_BY_SOURCE, &prefix, decode_edge_by_source_edge_id)
    }

    /// Edge IDs arriving at `target`, optionally restricted to one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the index scan fails.
    pub fn incoming_ids<T: Transaction>(
        tx: &T,
        target: NodeId,
        kind: Option<EdgeKind>,
    ) -> GraphResult<Vec<EdgeId>> {
        let prefix = match kind {
            Some(kind) => encode_edge_by_target_kind_prefix(target, kind),
            None => encode_edge_by_target_prefix(target),
        };
        Self::collect(tx, TABLE_EDGES_BY_TARGET, &prefix, decode_edge_by_target_edge_id)
    }

    /// Visit outgoing edge IDs of one kind. Return `Ok(false)` to stop early.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails or the callback returns one.
    pub fn for_each_outgoing<T, F>(tx: &T, source: NodeId, kind: EdgeKind, f: F) -> GraphResult<()>
    where
        T: Transaction,
        F: FnMut(EdgeId) -> GraphResult<bool>,
    {
        let prefix = encode_edge_by_source_kind_prefix(source, kind);
        Self::for_each(tx, TABLE_EDGES_BY_SOURCE, &prefix, decode_edge_by_source_edge_id, f)
    }

    /// Visit incoming edge IDs of one kind. Return `Ok(false)` to stop early.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails or the callback returns one.
    pub fn for_each_incoming<T, F>(tx: &T, target: NodeId, kind: EdgeKind, f: F) -> GraphResult<()>
    where
        T: Transaction,
        F: FnMut(EdgeId) -> GraphResult<bool>,
    {
        let prefix = encode_edge_by_target_kind_prefix(target, kind);
        Self::for_each(tx, TABLE_EDGES_BY_TARGET, &prefix, decode_edge_by_target_edge_id, f)
    }

    /// Check whether any edge of a kind arrives at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails.
    pub fn has_incoming<T: Transaction>(
        tx: &T,
        target: NodeId,
        kind: EdgeKind,
    ) -> GraphResult<bool> {
        let mut found = false;
        Self::for_each_incoming(tx, target, kind, |_| {
            found = true;
            Ok(false)
        })?;
        Ok(found)
    }

    fn collect<T: Transaction>(
        tx: &T,
        table: &str,
        prefix: &[u8],
        decode: fn(&[u8]) -> Option<EdgeId>,
    ) -> GraphResult<Vec<EdgeId>> {
        let mut ids = Vec::new();
        Self::for_each(tx, table, prefix, decode, |id| {
            ids.push(id);
            Ok(true)
        })?;
        Ok(ids)
    }

    fn for_each<T, F>(
        tx: &T,
        table: &str,
        prefix: &[u8],
        decode: fn(&[u8]) -> Option<EdgeId>,
        mut f: F,
    ) -> GraphResult<()>
    where
        T: Transaction,
        F: FnMut(EdgeId) -> GraphResult<bool>,
    {
        let end = prefix_end(prefix);
        let mut cursor = tx.range(table, Bound::Included(prefix), Bound::Excluded(end.as_slice()))?;

        while let Some((key, _)) = cursor.next()? {
            if let Some(id) = decode(&key) {
                if !f(id)? {
                    break;
                }
            }
        }
        Ok(())
    }
}
