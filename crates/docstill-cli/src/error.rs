//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Extraction pipeline error
    #[error("Extraction error: {0}")]
    Extraction(#[from] docstill_extractor::ExtractError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
