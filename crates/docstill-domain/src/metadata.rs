//! Provenance metadata for one extraction run

use crate::options::ExtractionOptions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one pipeline run
///
/// The surrounding system keys persisted results by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtractionId(pub Uuid);

impl ExtractionId {
    /// Generate a fresh identifier
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ExtractionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Provenance record created once per extraction, immutable thereafter
///
/// Persisted alongside the data tree as a single versioned unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    /// ISO-8601 timestamp of the run
    pub timestamp: String,

    /// Identifier of the generative model used
    pub model_id: String,

    /// Detected document type, when detection ran and succeeded
    pub document_type: Option<String>,

    /// The user instruction the prompt was built from
    pub prompt_used: String,

    /// Wall-clock duration of the run in milliseconds
    pub processing_time_ms: u64,

    /// The effective options for this run
    pub options: ExtractionOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_ids_are_unique() {
        let a = ExtractionId::new();
        let b = ExtractionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_extraction_id_serde_round_trip() {
        let id = ExtractionId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ExtractionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let metadata = ExtractionMetadata {
            timestamp: "2024-06-01T12:00:00Z".to_string(),
            model_id: "gemini-2.0-flash".to_string(),
            document_type: Some("Invoice".to_string()),
            prompt_used: "extract invoice number and total".to_string(),
            processing_time_ms: 1200,
            options: ExtractionOptions::default(),
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["modelId"], "gemini-2.0-flash");
        assert_eq!(json["documentType"], "Invoice");
        assert_eq!(json["promptUsed"], "extract invoice number and total");
        assert_eq!(json["processingTimeMs"], 1200);
        assert_eq!(json["options"]["includeConfidence"], true);
    }

    #[test]
    fn test_metadata_round_trip() {
        let metadata = ExtractionMetadata {
            timestamp: "2024-06-01T12:00:00Z".to_string(),
            model_id: "gemini-2.0-flash".to_string(),
            document_type: None,
            prompt_used: String::new(),
            processing_time_ms: 0,
            options: ExtractionOptions::default(),
        };

        let json = serde_json::to_string(&metadata).unwrap();
        let parsed: ExtractionMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(metadata, parsed);
    }
}
