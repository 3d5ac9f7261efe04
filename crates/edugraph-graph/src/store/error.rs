//! Error types for graph storage operations.

use edugraph_core::{CoreError, EdgeId, EdgeKind, NodeId, NodeKey, NodeKind};
use edugraph_storage::StorageError;
use thiserror::Error;

/// Errors that can occur in graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The requested node does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The requested edge does not exist.
    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// An edge refers to a node that does not exist.
    #[error("referenced node does not exist: {0}")]
    InvalidNodeReference(NodeId),

    /// The identity index already maps this key to a node.
    #[error("{key} already exists as node {existing}")]
    IdentityConflict {
        /// The key that was being created.
        key: NodeKey,
        /// The node already holding the key.
        existing: NodeId,
    },

    /// The endpoints of an edge have the wrong kinds.
    #[error("{kind} cannot connect {source_kind} to {target_kind}")]
    EndpointMismatch {
        /// The edge kind.
        kind: EdgeKind,
        /// The kind of the source node.
        source_kind: NodeKind,
        /// The kind of the target node.
        target_kind: NodeKind,
    },

    /// An edge of a kind that forbids self-loops points back at its source.
    #[error("{0} edge cannot connect a node to itself")]
    SelfLoop(EdgeKind),

    /// A `replies` edge would break the reply tree.
    #[error("reply tree violation: {0}")]
    ReplyTree(String),

    /// A schema change is incompatible with the declared schema.
    #[error("schema conflict: {0}")]
    SchemaConflict(String),

    /// Input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// An encoding error occurred.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Stored data is inconsistent with its indexes.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A storage error occurred.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CoreError> for GraphError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Encoding(msg) => Self::Encoding(msg),
            err @ CoreError::KindMismatch { .. } => Self::Validation(err.to_string()),
            CoreError::Validation(msg) => Self::Validation(msg),
        }
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
