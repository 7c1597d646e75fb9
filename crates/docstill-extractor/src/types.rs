//! Request and response types for extraction

use docstill_domain::{ExtractedNode, ExtractionId, ExtractionMetadata, ExtractionOptions};
use serde_json::{json, Value};

/// Request to extract structured data from a document
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Raw document bytes
    pub document: Vec<u8>,

    /// MIME type of the document (e.g. "application/pdf")
    pub mime_type: String,

    /// Free-text instruction describing what to extract; empty means
    /// "extract all key information"
    pub instruction: String,

    /// Per-request options; `None` falls back to the configured defaults
    pub options: Option<ExtractionOptions>,
}

impl ExtractionRequest {
    /// Build a request with default options
    pub fn new(
        document: Vec<u8>,
        mime_type: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            document,
            mime_type: mime_type.into(),
            instruction: instruction.into(),
            options: None,
        }
    }

    /// Override the options for this request
    pub fn with_options(mut self, options: ExtractionOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Result of a successful extraction run
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Identifier of this run
    pub id: ExtractionId,

    /// The normalized, filtered data tree
    pub data: ExtractedNode,

    /// Provenance for the run
    pub metadata: ExtractionMetadata,
}

impl ExtractionOutcome {
    /// The persisted-result shape callers store and read back
    pub fn to_json(&self) -> Value {
        json!({
            "data": self.data.to_json(),
            "metadata": self.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstill_domain::Field;
    use indexmap::IndexMap;

    #[test]
    fn test_persisted_shape() {
        let mut record = IndexMap::new();
        record.insert(
            "total".to_string(),
            ExtractedNode::field(Field::with_confidence("199.99", 0.9)),
        );

        let outcome = ExtractionOutcome {
            id: ExtractionId::new(),
            data: ExtractedNode::Object(record),
            metadata: ExtractionMetadata {
                timestamp: "2024-06-01T12:00:00Z".to_string(),
                model_id: "gemini-2.0-flash".to_string(),
                document_type: None,
                prompt_used: "extract the total".to_string(),
                processing_time_ms: 42,
                options: ExtractionOptions::default(),
            },
        };

        let json = outcome.to_json();
        assert_eq!(json["data"]["total"]["value"], "199.99");
        assert_eq!(json["metadata"]["modelId"], "gemini-2.0-flash");
        assert_eq!(json["metadata"]["processingTimeMs"], 42);
    }
}
