//! Graph indexes.
//!
//! - [`AdjacencyIndex`] - Outgoing and incoming edge lookups by node and kind

mod adjacency;

pub use adjacency::AdjacencyIndex;
