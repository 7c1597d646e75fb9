//! Per-request extraction options

use serde::{Deserialize, Serialize};

/// Switches consumed by the prompt builder and recorded in metadata
///
/// The serialized names are camelCase to match the persisted-result
/// contract consumed by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionOptions {
    /// Ask the model for a confidence score on every scalar
    pub include_confidence: bool,

    /// Ask the model for page number and bounding box on every scalar
    pub include_positions: bool,

    /// Run a short classification call before extraction
    pub detect_document_type: bool,

    /// Sampling temperature for the extraction call
    pub temperature: f64,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            include_confidence: true,
            include_positions: false,
            detect_document_type: true,
            temperature: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractionOptions::default();
        assert!(options.include_confidence);
        assert!(!options.include_positions);
        assert!(options.detect_document_type);
        assert_eq!(options.temperature, 0.1);
    }

    #[test]
    fn test_camel_case_names() {
        let options = ExtractionOptions::default();
        let json = serde_json::to_value(&options).unwrap();

        assert_eq!(json["includeConfidence"], true);
        assert_eq!(json["includePositions"], false);
        assert_eq!(json["detectDocumentType"], true);
        assert_eq!(json["temperature"], 0.1);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let options: ExtractionOptions =
            serde_json::from_str(r#"{"includePositions": true}"#).unwrap();
        assert!(options.include_positions);
        assert!(options.include_confidence);
        assert_eq!(options.temperature, 0.1);
    }
}
