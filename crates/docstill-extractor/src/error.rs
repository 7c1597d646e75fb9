//! Error types for the extraction pipeline

use docstill_llm::ModelError;
use thiserror::Error;

/// Errors that can occur during an extraction run
///
/// The normalizer and the relevance filter have no error type at all:
/// they always produce a best-effort tree.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The model could not be reached or rejected the key
    #[error("Model error: {0}")]
    Model(String),

    /// Usage quota exhausted; back off and retry later
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Too many requests; back off and retry later
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The repairer could not recover any structure from the reply
    #[error("Could not parse model reply (preview: {preview:?})")]
    ParseFailure {
        /// First ~200 characters of the offending text, to aid prompt tuning
        preview: String,
    },

    /// The model call exceeded the configured timeout; retryable
    #[error("Extraction timeout")]
    Timeout,

    /// Document exceeds the configured size limit
    #[error("Document too large: {0} bytes (max: {1})")]
    DocumentTooLarge(usize, usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ModelError> for ExtractError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::QuotaExceeded(msg) => ExtractError::QuotaExceeded(msg),
            ModelError::RateLimited(msg) => ExtractError::RateLimited(msg),
            other => ExtractError::Model(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_distinction_survives_conversion() {
        let err: ExtractError = ModelError::QuotaExceeded("monthly cap".into()).into();
        assert!(matches!(err, ExtractError::QuotaExceeded(_)));

        let err: ExtractError = ModelError::RateLimited("slow down".into()).into();
        assert!(matches!(err, ExtractError::RateLimited(_)));

        let err: ExtractError = ModelError::Unavailable("down".into()).into();
        assert!(matches!(err, ExtractError::Model(_)));
    }

    #[test]
    fn test_parse_failure_display_carries_preview() {
        let err = ExtractError::ParseFailure {
            preview: "I'm sorry, I can't".to_string(),
        };
        assert!(err.to_string().contains("I'm sorry"));
    }
}
