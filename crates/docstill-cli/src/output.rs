//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use docstill_extractor::ExtractionOutcome;

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat) -> Self {
        Self { format }
    }

    /// Render the persisted-result shape `{ "data": ..., "metadata": ... }`.
    pub fn format_outcome(&self, outcome: &ExtractionOutcome) -> Result<String> {
        let json = outcome.to_json();
        let rendered = match self.format {
            CliFormat::Pretty => serde_json::to_string_pretty(&json)?,
            CliFormat::Compact => serde_json::to_string(&json)?,
        };
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstill_domain::{
        ExtractedNode, ExtractionId, ExtractionMetadata, ExtractionOptions, Field,
    };
    use indexmap::IndexMap;

    fn outcome() -> ExtractionOutcome {
        let mut record = IndexMap::new();
        record.insert(
            "total".to_string(),
            ExtractedNode::field(Field::with_confidence("199.99", 0.9)),
        );
        ExtractionOutcome {
            id: ExtractionId::new(),
            data: ExtractedNode::Object(record),
            metadata: ExtractionMetadata {
                timestamp: "2024-06-01T12:00:00Z".to_string(),
                model_id: "gemini-2.0-flash".to_string(),
                document_type: None,
                prompt_used: "extract the total".to_string(),
                processing_time_ms: 10,
                options: ExtractionOptions::default(),
            },
        }
    }

    #[test]
    fn test_pretty_output_is_multiline() {
        let rendered = Formatter::new(CliFormat::Pretty)
            .format_outcome(&outcome())
            .unwrap();
        assert!(rendered.contains('\n'));
        assert!(rendered.contains("\"total\""));
    }

    #[test]
    fn test_compact_output_is_single_line() {
        let rendered = Formatter::new(CliFormat::Compact)
            .format_outcome(&outcome())
            .unwrap();
        assert!(!rendered.contains('\n'));
        assert!(rendered.contains("\"modelId\":\"gemini-2.0-flash\""));
    }
}
