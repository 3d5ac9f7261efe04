//! Node and edge storage operations.
//!
//! # Tables
//!
//! - `nodes` - Node data keyed by node ID
//! - `node_identity` - Unique `(kind, domain_id)` index
//! - `node_kinds` - Node kind index
//! - `edges` - Edge data keyed by edge ID
//! - `edges_by_source` - Index for outgoing edge lookups
//! - `edges_by_target` - Index for incoming edge lookups
//!
//! Schema declarations live in the `metadata` table, see
//! [`crate::schema::SchemaStore`].

mod edge;
mod error;
mod id_gen;
mod node;

use edugraph_storage::{Cursor, Transaction};

pub use edge::{EdgeStore, TABLE_EDGES, TABLE_EDGES_BY_SOURCE, TABLE_EDGES_BY_TARGET};
pub use error::{GraphError, GraphResult};
pub use id_gen::IdGenerator;
pub use node::{NodeStore, TABLE_NODES, TABLE_NODE_IDENTITY, TABLE_NODE_KINDS};

/// Every table holding graph data.
pub const GRAPH_TABLES: [&str; 6] = [
    TABLE_NODES,
    TABLE_NODE_IDENTITY,
    TABLE_NODE_KINDS,
    TABLE_EDGES,
    TABLE_EDGES_BY_SOURCE,
    TABLE_EDGES_BY_TARGET,
];

/// Delete every entry of the given tables.
///
/// Returns the number of entries removed.
///
/// # Errors
///
/// Returns an error if a scan or delete fails.
pub fn clear_tables<T: Transaction>(tx: &mut T, tables: &[&str]) -> GraphResult<usize> {
    let mut removed = 0;
    for table in tables {
        let keys = {
            let mut cursor = tx.cursor(table)?;
            let mut keys = Vec::new();
            while let Some((key, _)) = cursor.next()? {
                keys.push(key);
            }
            keys
        };
        for key in keys {
            if tx.delete(table, &key)? {
                removed += 1;
            }
        }
    }
    Ok(removed)
}
