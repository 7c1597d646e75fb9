//! Best-effort recovery of a parseable tree from raw model text
//!
//! Model replies are usually well-formed JSON but occasionally degrade
//! to `key: value` prose under certain prompts. A cheap line-based
//! fallback avoids discarding a whole extraction rather than requiring a
//! retry.

use crate::error::ExtractError;
use docstill_domain::{ExtractedNode, Field};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Fixed confidence marking low-trust line-based recovery
pub const RECOVERY_CONFIDENCE: f64 = 0.8;

/// How much of the offending text a `ParseFailure` carries
const PREVIEW_LEN: usize = 200;

/// Repair raw model text into a parsed (not yet normalized) tree
pub fn repair_response(raw: &str) -> Result<ExtractedNode, ExtractError> {
    let stripped = strip_fences(raw);

    if stripped.is_empty() {
        return Err(ExtractError::ParseFailure {
            preview: String::new(),
        });
    }

    if stripped.starts_with('{') {
        match serde_json::from_str::<Value>(stripped) {
            Ok(value) => return Ok(ExtractedNode::from_json(&value)),
            Err(e) => {
                debug!("Strict JSON parse failed ({}), trying line recovery", e);
            }
        }
    }

    line_recovery(stripped).ok_or_else(|| ExtractError::ParseFailure {
        preview: preview(stripped),
    })
}

/// Strip leading/trailing markdown code-fence markers and whitespace
///
/// Handles the ```json and bare ``` variants the model habitually wraps
/// replies in despite being told not to.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the fence line itself (``` or ```json)
        text = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => "",
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Line-oriented `key: value` recovery
///
/// Each colon-bearing segment becomes a field at a fixed low-trust
/// confidence; segments without a colon are skipped. Comma-delimited
/// pairs on a single line are split too, so replies like
/// `"invoice_number: INV-2024, total: 199.99"` recover both keys.
fn line_recovery(text: &str) -> Option<ExtractedNode> {
    let mut record = IndexMap::new();

    for line in text.lines() {
        for segment in line.split(',') {
            let Some(colon) = segment.find(':') else {
                continue;
            };
            let key = normalize_key(&segment[..colon]);
            let value = segment[colon + 1..].trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            record.insert(key, ExtractedNode::field(Field::with_confidence(
                value,
                RECOVERY_CONFIDENCE,
            )));
        }
    }

    if record.is_empty() {
        None
    } else {
        Some(ExtractedNode::Object(record))
    }
}

/// Lower-case a recovered key and collapse whitespace runs to `_`
fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn preview(text: &str) -> String {
    if text.len() <= PREVIEW_LEN {
        return text.to_string();
    }
    // Respect char boundaries when truncating
    let mut end = PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstill_domain::FieldValue;

    #[test]
    fn test_strict_json_parsed() {
        let raw = r#"{"invoice_number": {"value": "INV-2024", "confidence": 0.95}}"#;
        let tree = repair_response(raw).unwrap();

        let record = tree.as_object().unwrap();
        let field = record["invoice_number"].as_field().unwrap();
        assert_eq!(field.value, FieldValue::Text("INV-2024".to_string()));
        assert_eq!(field.confidence, Some(0.95));
    }

    #[test]
    fn test_fenced_json_equals_unwrapped() {
        let inner = r#"{"total": {"value": "199.99", "confidence": 0.9}}"#;
        let fenced = format!("```json\n{}\n```", inner);

        assert_eq!(repair_response(inner).unwrap(), repair_response(&fenced).unwrap());
    }

    #[test]
    fn test_fence_without_language_tag() {
        let inner = r#"{"total": {"value": "199.99"}}"#;
        let fenced = format!("```\n{}\n```", inner);

        assert_eq!(repair_response(inner).unwrap(), repair_response(&fenced).unwrap());
    }

    #[test]
    fn test_line_recovery_from_prose() {
        let raw = "invoice_number: INV-2024, total: 199.99";
        let tree = repair_response(raw).unwrap();

        let record = tree.as_object().unwrap();
        assert_eq!(record.len(), 2);

        let invoice = record["invoice_number"].as_field().unwrap();
        assert_eq!(invoice.value, FieldValue::Text("INV-2024".to_string()));
        assert_eq!(invoice.confidence, Some(RECOVERY_CONFIDENCE));

        let total = record["total"].as_field().unwrap();
        assert_eq!(total.value, FieldValue::Text("199.99".to_string()));
        assert_eq!(total.confidence, Some(RECOVERY_CONFIDENCE));
    }

    #[test]
    fn test_line_recovery_multiline() {
        let raw = "Invoice Number: INV-2024\nTotal Amount: 199.99\nno separator here";
        let tree = repair_response(raw).unwrap();

        let record = tree.as_object().unwrap();
        assert_eq!(record.len(), 2);
        assert!(record.contains_key("invoice_number"));
        assert!(record.contains_key("total_amount"));
    }

    #[test]
    fn test_colonless_text_fails_with_preview() {
        let raw = "I could not find any of the requested fields in this document.";
        let err = repair_response(raw).unwrap_err();

        match err {
            ExtractError::ParseFailure { preview } => {
                assert!(preview.starts_with("I could not find"));
            }
            other => panic!("expected ParseFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_after_stripping_fails_with_empty_preview() {
        let err = repair_response("```json\n```").unwrap_err();
        match err {
            ExtractError::ParseFailure { preview } => assert!(preview.is_empty()),
            other => panic!("expected ParseFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_preview_truncated_to_200_chars() {
        let raw = "x".repeat(500);
        let err = repair_response(&raw).unwrap_err();
        match err {
            ExtractError::ParseFailure { preview } => {
                assert_eq!(preview.len(), 203); // 200 chars + "..."
            }
            other => panic!("expected ParseFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_broken_json_falls_back_to_lines() {
        // Starts with '{' but is not valid JSON; the colon pairs inside
        // are still recoverable
        let raw = "{ invoice_number: INV-2024\n  total: 199.99";
        let tree = repair_response(raw).unwrap();

        let record = tree.as_object().unwrap();
        assert!(record.contains_key("{_invoice_number") || record.contains_key("invoice_number"));
        assert!(record.contains_key("total"));
    }

    #[test]
    fn test_round_trip_through_serialization() {
        let raw = r#"{
            "invoice_number": {"value": "INV-2024", "confidence": 0.95},
            "line_items": [
                {"product_code": {"value": "101", "confidence": 0.9}}
            ]
        }"#;
        let tree = repair_response(raw).unwrap();
        let serialized = serde_json::to_string(&tree.to_json()).unwrap();

        assert_eq!(repair_response(&serialized).unwrap(), tree);
    }
}
