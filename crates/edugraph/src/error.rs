//! Error types for `EduGraph`.
//!
//! This module provides the [`enum@Error`] type returned by every engine
//! operation. Errors of the lower layers are folded into these kinds at the
//! service boundary.

use edugraph_core::CoreError;
use edugraph_graph::store::GraphError;
use edugraph_storage::StorageError;
use thiserror::Error;

/// Errors that can occur when using `EduGraph`.
#[derive(Debug, Error)]
pub enum Error {
    /// The store is unavailable.
    #[error("connection error: {0}")]
    Connection(String),

    /// The store did not respond in time.
    #[error("timeout: {0}")]
    Timeout(String),

    /// A schema change is incompatible with the declared schema.
    #[error("schema conflict: {0}")]
    SchemaConflict(String),

    /// Another writer created the same entity first.
    ///
    /// Re-resolve the endpoints and retry.
    #[error("unique constraint conflict: {0}")]
    RetryableConflict(String),

    /// The mutation or traversal payload is invalid.
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// Committed data is partial or inconsistent.
    #[error("integrity anomaly: {0}")]
    IntegrityAnomaly(String),

    /// A node that must exist does not.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// The request is well-formed but not allowed in the current state.
    #[error("rejected: {0}")]
    Rejected(String),

    /// A destructive reset was requested without enabling it.
    #[error("destructive reset is disabled; enable allow_destructive_reset to drop all data")]
    ResetNotAllowed,

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Config(String),

    /// A value could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// An internal lock was poisoned (a thread panicked while holding it).
    #[error("internal lock poisoned: {0}")]
    LockPoisoned(String),

    /// The storage backend reported an unexpected failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns `true` if the operation may succeed when retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_) | Self::RetryableConflict(_))
    }

    /// Create a malformed query error.
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedQuery(msg.into())
    }

    /// Create a rejection.
    #[must_use]
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a lock poisoned error.
    #[must_use]
    pub fn lock_poisoned(msg: impl Into<String>) -> Self {
        Self::LockPoisoned(msg.into())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Open(msg) => Self::Connection(msg),
            StorageError::Io(e) => Self::Connection(e.to_string()),
            StorageError::Timeout(msg) => Self::Timeout(msg),
            StorageError::Conflict(msg) => Self::RetryableConflict(msg),
            StorageError::Serialization(msg) => Self::Encoding(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<GraphError> for Error {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NodeNotFound(id) | GraphError::InvalidNodeReference(id) => {
                Self::NodeNotFound(format!("node {id}"))
            }
            GraphError::IdentityConflict { key, existing } => {
                Self::RetryableConflict(format!("{key} was created concurrently as node {existing}"))
            }
            GraphError::EndpointMismatch { .. } | GraphError::SelfLoop(_) => {
                Self::MalformedQuery(err.to_string())
            }
            GraphError::Validation(msg) => Self::MalformedQuery(msg),
            GraphError::ReplyTree(msg) => Self::Rejected(msg),
            GraphError::SchemaConflict(msg) => Self::SchemaConflict(msg),
            GraphError::Encoding(msg) => Self::Encoding(msg),
            GraphError::EdgeNotFound(_) | GraphError::DataCorruption(_) => {
                Self::IntegrityAnomaly(err.to_string())
            }
            GraphError::Storage(e) => e.into(),
        }
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        GraphError::from(err).into()
    }
}

/// A specialized `Result` type for `EduGraph` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use edugraph_core::{EdgeKind, NodeId, NodeKey, NodeKind};

    use super::*;

    #[test]
    fn retryable_kinds() {
        assert!(Error::Connection("down".into()).is_retryable());
        assert!(Error::Timeout("slow".into()).is_retryable());
        assert!(Error::RetryableConflict("race".into()).is_retryable());

        assert!(!Error::SchemaConflict("x".into()).is_retryable());
        assert!(!Error::malformed("x").is_retryable());
        assert!(!Error::IntegrityAnomaly("x".into()).is_retryable());
        assert!(!Error::ResetNotAllowed.is_retryable());
    }

    #[test]
    fn identity_conflict_is_retryable() {
        let err: Error = GraphError::IdentityConflict {
            key: NodeKey::new(NodeKind::Student, "s1"),
            existing: NodeId::new(7),
        }
        .into();
        assert!(matches!(err, Error::RetryableConflict(_)));
        assert!(err.to_string().contains("Student(s1)"));
    }

    #[test]
    fn graph_errors_map_to_engine_kinds() {
        let err: Error = GraphError::SelfLoop(EdgeKind::Prerequisite).into();
        assert!(matches!(err, Error::MalformedQuery(_)));

        let err: Error = GraphError::DataCorruption("dangling".into()).into();
        assert!(matches!(err, Error::IntegrityAnomaly(_)));

        let err: Error = GraphError::Storage(StorageError::Timeout("lock".into())).into();
        assert!(matches!(err, Error::Timeout(_)));

        let err: Error = GraphError::ReplyTree("post 0x2 already has a parent".into()).into();
        assert!(matches!(err, Error::Rejected(_)));

        let err: Error = StorageError::ReadOnly.into();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn display() {
        assert_eq!(Error::rejected("post p1 already exists").to_string(), "rejected: post p1 already exists");
    }
}
