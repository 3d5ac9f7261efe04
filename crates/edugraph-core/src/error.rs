//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur in the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An encoding or decoding error occurred.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A node or edge kind did not match what the operation requires.
    #[error("kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        /// The expected kind.
        expected: String,
        /// The actual kind.
        actual: String,
    },

    /// A validation error occurred.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// Creates a kind mismatch error.
    #[must_use]
    pub fn kind_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::KindMismatch { expected: expected.into(), actual: actual.into() }
    }
}
