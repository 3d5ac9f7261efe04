//! Error types for the CLI.

use thiserror::Error;

/// CLI-specific result type.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
pub enum CliError {
    /// No database specified.
    #[error("no database specified. Use --database or set EDUGRAPH_DB environment variable")]
    NoDatabaseSpecified,

    /// A destructive command was run without confirmation.
    #[error("refusing to drop all data without --yes")]
    ConfirmationRequired,

    /// EduGraph error.
    #[error("graph error: {0}")]
    Graph(#[from] edugraph::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
