//! Monotonic ID generation for nodes and edges.

use std::sync::atomic::{AtomicU64, Ordering};

use edugraph_core::{EdgeId, NodeId};

/// Thread-safe generator of node and edge IDs.
///
/// IDs handed to a transaction that later aborts are never reused; gaps in
/// the ID space are expected. On open the generator is seeded past the
/// highest stored IDs.
#[derive(Debug)]
pub struct IdGenerator {
    next_node_id: AtomicU64,
    next_edge_id: AtomicU64,
}

impl IdGenerator {
    /// Create a generator whose first IDs are 1.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_start(1, 1)
    }

    /// Create a generator with explicit first IDs.
    #[must_use]
    pub const fn with_start(node_start: u64, edge_start: u64) -> Self {
        Self { next_node_id: AtomicU64::new(node_start), next_edge_id: AtomicU64::new(edge_start) }
    }

    /// Create a generator that continues after the given highest IDs.
    #[must_use]
    pub fn after(max_node: Option<NodeId>, max_edge: Option<EdgeId>) -> Self {
        Self::with_start(
            max_node.map_or(1, |id| id.as_u64() + 1),
            max_edge.map_or(1, |id| id.as_u64() + 1),
        )
    }

    /// Allocate the next node ID.
    pub fn next_node_id(&self) -> NodeId {
        NodeId::new(self.next_node_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate the next edge ID.
    pub fn next_edge_id(&self) -> EdgeId {
        EdgeId::new(self.next_edge_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
