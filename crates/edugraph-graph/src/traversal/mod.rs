//! Graph traversal.
//!
//! - [`Expand`] - Single-hop expansion from a node over one edge kind
//! - [`HopQuery`] - Fixed multi-hop traversal with cascade pruning
//!
//! # Example
//!
//! ```ignore
//! use edugraph_graph::traversal::{Direction, HopQuery};
//!
//! // Courses taught by the instructors of a course
//! let result = HopQuery::from_nodes([course])
//!     .hop(EdgeKind::Teaches, Direction::Incoming)
//!     .hop(EdgeKind::Teaches, Direction::Outgoing)
//!     .execute(&tx)?;
//! ```

mod expand;
mod hop;

pub use expand::{Expand, ExpandResult};
pub use hop::{Hop, HopQuery, HopResult};

/// Direction for graph traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Follow edges from source to target.
    #[default]
    Outgoing,

    /// Follow edges from target back to source.
    Incoming,

    /// Follow edges either way.
    Both,
}

impl Direction {
    /// Returns true if this direction includes outgoing edges.
    #[inline]
    #[must_use]
    pub const fn includes_outgoing(self) -> bool {
        matches!(self, Self::Outgoing | Self::Both)
    }

    /// Returns true if this direction includes incoming edges.
    #[inline]
    #[must_use]
    pub const fn includes_incoming(self) -> bool {
        matches!(self, Self::Incoming | Self::Both)
    }
}
