//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be opened.
    #[error("failed to open database: {0}")]
    Open(String),

    /// A table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// A transaction could not be started or committed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A write was attempted in a read-only transaction.
    #[error("cannot write in a read-only transaction")]
    ReadOnly,

    /// A concurrent writer prevented the operation.
    #[error("write conflict: {0}")]
    Conflict(String),

    /// The store did not respond in time.
    #[error("storage timeout: {0}")]
    Timeout(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The backend reported an unexpected failure.
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Check whether retrying the operation may succeed.
    ///
    /// Conflicts, timeouts and I/O failures are transient. Everything else
    /// reflects a state that a retry would observe again.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Timeout(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StorageError::Conflict("busy".to_owned()).is_transient());
        assert!(StorageError::Timeout("slow disk".to_owned()).is_transient());
        assert!(!StorageError::ReadOnly.is_transient());
        assert!(!StorageError::Open("locked".to_owned()).is_transient());
    }

    #[test]
    fn read_only_message() {
        assert!(StorageError::ReadOnly.to_string().contains("read-only"));
    }
}
