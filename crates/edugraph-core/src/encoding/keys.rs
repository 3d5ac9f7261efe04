//! Key encoding for ordered storage.
//!
//! Keys are designed to support efficient prefix-based range scans.
//!
//! # Key Prefixes
//!
//! - `0x01` - Node keys: `[0x01][node_id]`
//! - `0x02` - Edge keys: `[0x02][edge_id]`
//! - `0x03` - Edge by source: `[0x03][source_id][edge_kind][edge_id]`
//! - `0x04` - Edge by target: `[0x04][target_id][edge_kind][edge_id]`
//! - `0x05` - Identity index: `[0x05][node_kind][domain_id bytes]`
//! - `0x06` - Node kind index: `[0x06][node_kind][node_id]`
//!
//! All numeric values are encoded in big-endian format to preserve sort order.
//! Kinds are encoded as their one-byte tag.

use crate::types::{EdgeId, EdgeKind, NodeId, NodeKind};

/// Key prefix for node data.
pub const PREFIX_NODE: u8 = 0x01;
/// Key prefix for edge data.
pub const PREFIX_EDGE: u8 = 0x02;
/// Key prefix for edges indexed by source node.
pub const PREFIX_EDGE_BY_SOURCE: u8 = 0x03;
/// Key prefix for edges indexed by target node.
pub const PREFIX_EDGE_BY_TARGET: u8 = 0x04;
/// Key prefix for the unique `(kind, domain_id)` identity index.
pub const PREFIX_IDENTITY: u8 = 0x05;
/// Key prefix for the node kind index.
pub const PREFIX_NODE_KIND: u8 = 0x06;

/// Encode a node ID as a storage key.
///
/// The key format is: `[PREFIX_NODE][node_id as big-endian u64]`
#[inline]
#[must_use]
pub fn encode_node_key(id: NodeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(PREFIX_NODE);
    key.extend_from_slice(&id.as_u64().to_be_bytes());
    key
}

/// Decode a node ID from a node key.
#[must_use]
pub fn decode_node_key(key: &[u8]) -> Option<NodeId> {
    if key.len() != 9 || key[0] != PREFIX_NODE {
        return None;
    }
    read_u64(&key[1..]).map(NodeId::new)
}

/// Encode an edge ID as a storage key.
///
/// The key format is: `[PREFIX_EDGE][edge_id as big-endian u64]`
#[inline]
#[must_use]
pub fn encode_edge_key(id: EdgeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(PREFIX_EDGE);
    key.extend_from_slice(&id.as_u64().to_be_bytes());
    key
}

/// Decode an edge ID from an edge key.
#[must_use]
pub fn decode_edge_key(key: &[u8]) -> Option<EdgeId> {
    if key.len() != 9 || key[0] != PREFIX_EDGE {
        return None;
    }
    read_u64(&key[1..]).map(EdgeId::new)
}

fn adjacency_key(prefix: u8, node: NodeId, kind: EdgeKind, edge_id: EdgeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(18);
    key.push(prefix);
    key.extend_from_slice(&node.as_u64().to_be_bytes());
    key.push(kind.tag());
    key.extend_from_slice(&edge_id.as_u64().to_be_bytes());
    key
}

fn adjacency_prefix(prefix: u8, node: NodeId, kind: Option<EdgeKind>) -> Vec<u8> {
    let mut key = Vec::with_capacity(10);
    key.push(prefix);
    key.extend_from_slice(&node.as_u64().to_be_bytes());
    if let Some(kind) = kind {
        key.push(kind.tag());
    }
    key
}

fn decode_adjacency_edge_id(prefix: u8, key: &[u8]) -> Option<EdgeId> {
    if key.len() != 18 || key[0] != prefix {
        return None;
    }
    read_u64(&key[10..]).map(EdgeId::new)
}

/// Encode a key for looking up edges by source node.
///
/// The key format is: `[PREFIX_EDGE_BY_SOURCE][source_id][edge_kind][edge_id]`
#[must_use]
pub fn encode_edge_by_source_key(source: NodeId, kind: EdgeKind, edge_id: EdgeId) -> Vec<u8> {
    adjacency_key(PREFIX_EDGE_BY_SOURCE, source, kind, edge_id)
}

/// Encode a prefix for scanning all edges leaving a node.
#[inline]
#[must_use]
pub fn encode_edge_by_source_prefix(source: NodeId) -> Vec<u8> {
    adjacency_prefix(PREFIX_EDGE_BY_SOURCE, source, None)
}

/// Encode a prefix for scanning edges of one kind leaving a node.
#[must_use]
pub fn encode_edge_by_source_kind_prefix(source: NodeId, kind: EdgeKind) -> Vec<u8> {
    adjacency_prefix(PREFIX_EDGE_BY_SOURCE, source, Some(kind))
}

/// Decode the edge ID from an edge-by-source key.
#[must_use]
pub fn decode_edge_by_source_edge_id(key: &[u8]) -> Option<EdgeId> {
    decode_adjacency_edge_id(PREFIX_EDGE_BY_SOURCE, key)
}

/// Encode a key for looking up edges by target node.
///
/// The key format is: `[PREFIX_EDGE_BY_TARGET][target_id][edge_kind][edge_id]`
#[must_use]
pub fn encode_edge_by_target_key(target: NodeId, kind: EdgeKind, edge_id: EdgeId) -> Vec<u8> {
    adjacency_key(PREFIX_EDGE_BY_TARGET, target, kind, edge_id)
}

/// Encode a prefix for scanning all edges arriving at a node.
#[inline]
#[must_use]
pub fn encode_edge_by_target_prefix(target: NodeId) -> Vec<u8> {
    adjacency_prefix(PREFIX_EDGE_BY_TARGET, target, None)
}

/// Encode a prefix for scanning edges of one kind arriving at a node.
#[must_use]
pub fn encode_edge_by_target_kind_prefix(target: NodeId, kind: EdgeKind) -> Vec<u8> {
    adjacency_prefix(PREFIX_EDGE_BY_TARGET, target, Some(kind))
}

/// Decode the edge ID from an edge-by-target key.
#[must_use]
pub fn decode_edge_by_target_edge_id(key: &[u8]) -> Option<EdgeId> {
    decode_adjacency_edge_id(PREFIX_EDGE_BY_TARGET, key)
}

/// Encode a key for the identity index.
///
/// The key format is: `[PREFIX_IDENTITY][node_kind][domain_id as UTF-8]`
///
/// The domain identifier is the last component, so the key is unambiguous
/// without a length prefix.
#[must_use]
pub fn encode_identity_key(kind: NodeKind, domain_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(2 + domain_id.len());
    key.push(PREFIX_IDENTITY);
    key.push(kind.tag());
    key.extend_from_slice(domain_id.as_bytes());
    key
}

/// Decode the kind and domain identifier from an identity key.
#[must_use]
pub fn decode_identity_key(key: &[u8]) -> Option<(NodeKind, &str)> {
    if key.len() < 2 || key[0] != PREFIX_IDENTITY {
        return None;
    }
    let kind = NodeKind::from_tag(key[1])?;
    let domain_id = std::str::from_utf8(&key[2..]).ok()?;
    Some((kind, domain_id))
}

/// Encode a key for the node kind index.
///
/// The key format is: `[PREFIX_NODE_KIND][node_kind][node_id]`
#[must_use]
pub fn encode_node_kind_key(kind: NodeKind, id: NodeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(10);
    key.push(PREFIX_NODE_KIND);
    key.push(kind.tag());
    key.extend_from_slice(&id.as_u64().to_be_bytes());
    key
}

/// Encode a prefix for scanning all nodes of a kind.
#[must_use]
pub fn encode_node_kind_prefix(kind: NodeKind) -> Vec<u8> {
    vec![PREFIX_NODE_KIND, kind.tag()]
}

/// Decode the node ID from a node kind index key.
#[must_use]
pub fn decode_node_kind_node_id(key: &[u8]) -> Option<NodeId> {
    if key.len() != 10 || key[0] != PREFIX_NODE_KIND {
        return None;
    }
    read_u64(&key[2..]).map(NodeId::new)
}

/// Compute the exclusive upper bound for a prefix scan.
///
/// Returns the smallest key greater than every key starting with `prefix`.
#[must_use]
pub fn prefix_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return end;
        }
    }
    // All bytes were 0xFF; no prefix in this keyspace starts that way.
    vec![u8::MAX; prefix.len() + 1]
}

fn read_u64(bytes: &[u8]) -> Option<u64> {
    let array: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    Some(u64::from_be_bytes(array))
}
