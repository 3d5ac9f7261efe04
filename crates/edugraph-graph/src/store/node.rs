//! Node storage operations.
//!
//! Every node is written together with two index entries: its identity
//! `(kind, domain_id) -> node_id` and its kind tag. The identity index is the
//! uniqueness arbiter for concurrent creators; redb serializes write
//! transactions, so the existence check and the insert below are atomic.

use std::ops::Bound;

use edugraph_core::encoding::keys::{
    decode_node_key, decode_node_kind_node_id, encode_identity_key, encode_node_key,
    encode_node_kind_key, encode_node_kind_prefix, prefix_end,
};
use edugraph_core::encoding::{Decoder, Encoder};
use edugraph_core::{Node, NodeFields, NodeId, NodeKey, NodeKind};
use edugraph_storage::{Cursor, Transaction};

use super::error::{GraphError, GraphResult};
use super::IdGenerator;

/// Table name for node data.
pub const TABLE_NODES: &str = "nodes";

/// Table name for the unique identity index.
pub const TABLE_NODE_IDENTITY: &str = "node_identity";

/// Table name for the node kind index.
pub const TABLE_NODE_KINDS: &str = "node_kinds";

/// Node storage operations.
///
/// # Example
///
/// ```ignore
/// let mut tx = engine.begin_write()?;
/// let course = NodeStore::create(&mut tx, &id_gen, "c1", NodeFields::Course { title: None })?;
/// tx.commit()?;
///
/// let tx = engine.begin_read()?;
/// let found = NodeStore::lookup_identity(&tx, NodeKind::Course, "c1")?;
/// assert_eq!(found, Some(course.id));
/// ```
pub struct NodeStore;

impl NodeStore {
    /// Create a node for a domain identifier that does not exist yet.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Validation`] if `domain_id` is empty
    /// - [`GraphError::IdentityConflict`] if the identity index already holds
    ///   `(kind, domain_id)`
    pub fn create<T: Transaction>(
        tx: &mut T,
        id_gen: &IdGenerator,
        domain_id: &str,
        fields: NodeFields,
    ) -> GraphResult<Node> {
        if domain_id.is_empty() {
            return Err(GraphError::Validation("domain identifier must not be empty".to_owned()));
        }

        let kind = fields.kind();
        if let Some(existing) = Self::lookup_identity(tx, kind, domain_id)? {
            return Err(GraphError::IdentityConflict {
                key: NodeKey::new(kind, domain_id),
                existing,
            });
        }

        let node = Node::new(id_gen.next_node_id(), domain_id, fields);

        tx.put(TABLE_NODES, &encode_node_key(node.id), &node.encode()?)?;
        tx.put(
            TABLE_NODE_IDENTITY,
            &encode_identity_key(kind, domain_id),
            &node.id.as_u64().to_be_bytes(),
        )?;
        tx.put(TABLE_NODE_KINDS, &encode_node_kind_key(kind, node.id), &[])?;

        Ok(node)
    }

    /// Get a node by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be read or decoded.
    pub fn get<T: Transaction>(tx: &T, id: NodeId) -> GraphResult<Option<Node>> {
        match tx.get(TABLE_NODES, &encode_node_key(id))? {
            Some(bytes) => Ok(Some(Node::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get a node by ID, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if the node does not exist.
    pub fn get_or_error<T: Transaction>(tx: &T, id: NodeId) -> GraphResult<Node> {
        Self::get(tx, id)?.ok_or(GraphError::NodeNotFound(id))
    }

    /// Check whether a node exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage read fails.
    pub fn exists<T: Transaction>(tx: &T, id: NodeId) -> GraphResult<bool> {
        Ok(tx.get(TABLE_NODES, &encode_node_key(id))?.is_some())
    }

    /// Look up the node ID registered for `(kind, domain_id)`.
    ///
    /// This is a single exact-match index read.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DataCorruption`] if the index entry is malformed.
    pub fn lookup_identity<T: Transaction>(
        tx: &T,
        kind: NodeKind,
        domain_id: &str,
    ) -> GraphResult<Option<NodeId>> {
        let Some(bytes) = tx.get(TABLE_NODE_IDENTITY, &encode_identity_key(kind, domain_id))? else {
            return Ok(None);
        };
        let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
            GraphError::DataCorruption(format!("identity entry for {kind}({domain_id}) is malformed"))
        })?;
        Ok(Some(NodeId::new(u64::from_be_bytes(raw))))
    }

    /// Get the node registered for a key, verifying the index against the node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DataCorruption`] if the index points at a missing
    /// node or at a node with a different identity.
    pub fn get_by_key<T: Transaction>(tx: &T, key: &NodeKey) -> GraphResult<Option<Node>> {
        let Some(id) = Self::lookup_identity(tx, key.kind, &key.domain_id)? else {
            return Ok(None);
        };
        let node = Self::get(tx, id)?.ok_or_else(|| {
            GraphError::DataCorruption(format!("identity index maps {key} to missing node {id}"))
        })?;
        if !node.matches(key) {
            return Err(GraphError::DataCorruption(format!(
                "identity index maps {key} to node {id}, which is {}",
                node.key()
            )));
        }
        Ok(Some(node))
    }

    /// Merge a patch into an existing node's fields.
    ///
    /// The node is only rewritten if the patch changes something.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NodeNotFound`] if the node does not exist
    /// - [`GraphError::Validation`] if the patch is for another kind or
    ///   modifies a post
    pub fn merge_fields<T: Transaction>(
        tx: &mut T,
        id: NodeId,
        patch: NodeFields,
    ) -> GraphResult<Node> {
        let mut node = Self::get_or_error(tx, id)?;
        if node.fields.merge(patch)? {
            tx.put(TABLE_NODES, &encode_node_key(id), &node.encode()?)?;
        }
        Ok(node)
    }

    /// List the IDs of all nodes of a kind, in ID order.
    ///
    /// # Errors
    ///
    /// Returns an error if the index scan fails.
    pub fn ids_by_kind<T: Transaction>(tx: &T, kind: NodeKind) -> GraphResult<Vec<NodeId>> {
        let prefix = encode_node_kind_prefix(kind);
        let end = prefix_end(&prefix);
        let mut cursor = tx.range(
            TABLE_NODE_KINDS,
            Bound::Included(prefix.as_slice()),
            Bound::Excluded(end.as_slice()),
        )?;

        let mut ids = Vec::new();
        while let Some((key, _)) = cursor.next()? {
            if let Some(id) = decode_node_kind_node_id(&key) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Count the nodes of a kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the index scan fails.
    pub fn count_by_kind<T: Transaction>(tx: &T, kind: NodeKind) -> GraphResult<usize> {
        Ok(Self::ids_by_kind(tx, kind)?.len())
    }

    /// The highest stored node ID, if any node exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails.
    pub fn max_id<T: Transaction>(tx: &T) -> GraphResult<Option<NodeId>> {
        let mut cursor = tx.cursor(TABLE_NODES)?;
        Ok(cursor.seek_last()?.and_then(|(key, _)| decode_node_key(&key)))
    }
}
