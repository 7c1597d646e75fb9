//! Canonicalization of repeating groups
//!
//! Models sometimes collapse a whole line-item table into one
//! string-valued field. This module walks the parsed tree and enforces
//! the invariant that repeating data is an array of record objects,
//! splitting mis-shaped values with layered heuristics. It never fails:
//! an unsplittable candidate degrades to a single-item record.

use docstill_domain::{ExtractedNode, Field};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Repeated "digits then letters" markers used as split points when the
/// primary separators found nothing (product-code prefixes)
static PRODUCT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+[\s-]+[A-Z]").unwrap());

/// Whitespace preceding a short numeric/code token, the last-resort split
static CODE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+(\d+\s*[-:])").unwrap());

/// `<numeric code><separator><description>`
static NUMERIC_CODE_DESC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)[\s-]+(.+)$").unwrap());

/// `<alphanumeric code><separator><description>`
static ALNUM_CODE_DESC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([A-Z0-9]+)[\s:-]+(.+)$").unwrap());

/// Tuning knobs for repeating-group splitting
///
/// The constants are load-bearing for behavioral compatibility with the
/// system this pipeline replaces; they live here, apart from the
/// tree-walking logic, so they can be tuned and tested independently.
#[derive(Debug, Clone)]
pub struct SplitPolicy {
    /// Key-name substrings marking a repeating-group candidate
    ///
    /// Plural forms only: the record keys the splitter itself emits
    /// (`item`, `product_code`, `description`) must never re-match, or
    /// normalization would not be idempotent.
    pub indicators: Vec<String>,

    /// Minimum string length before the aggressive marker-based retry
    pub min_retry_len: usize,

    /// Confidence multiplier for fields produced by heuristic splitting
    pub confidence_decay: f64,

    /// Confidence assumed when the field being split carries none
    pub fallback_confidence: f64,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            indicators: ["items", "products", "details", "lines", "rows", "entries", "list"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_retry_len: 30,
            confidence_decay: 0.95,
            fallback_confidence: 0.9,
        }
    }
}

impl SplitPolicy {
    /// True if the key names a repeating-group candidate
    pub fn is_candidate(&self, key: &str) -> bool {
        let lowered = key.to_lowercase();
        self.indicators.iter().any(|ind| lowered.contains(ind))
    }
}

/// Enforces the repeating-group invariant over a parsed tree
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    policy: SplitPolicy,
}

impl Normalizer {
    /// Create a normalizer with a specific policy
    pub fn new(policy: SplitPolicy) -> Self {
        Self { policy }
    }

    /// Normalize a parsed tree
    ///
    /// Idempotent: arrays of objects are recursed into but never
    /// re-split, so a second pass is a no-op.
    pub fn normalize(&self, node: ExtractedNode) -> ExtractedNode {
        match node {
            ExtractedNode::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, child) in map {
                    let child = self.normalize_entry(&key, child);
                    out.insert(key, child);
                }
                ExtractedNode::Object(out)
            }
            ExtractedNode::Array(items) => {
                ExtractedNode::Array(items.into_iter().map(|n| self.normalize(n)).collect())
            }
            leaf => leaf,
        }
    }

    fn normalize_entry(&self, key: &str, child: ExtractedNode) -> ExtractedNode {
        if !self.policy.is_candidate(key) {
            return self.normalize(child);
        }
        match child {
            // The mis-shaped case: a repeating group collapsed into one field
            ExtractedNode::Field(field) => {
                if let Some(text) = field.value.as_text().map(str::to_string) {
                    debug!("Splitting collapsed repeating group at key '{}'", key);
                    ExtractedNode::Array(self.split_into_records(&text, &field))
                } else {
                    // Non-text candidates cannot be split; leave the leaf alone
                    ExtractedNode::Field(field)
                }
            }
            other => self.normalize(other),
        }
    }

    /// Split a collapsed string into record objects
    fn split_into_records(&self, content: &str, field: &Field) -> Vec<ExtractedNode> {
        let mut segments = primary_split(content);

        if segments.len() <= 1 && content.len() > self.policy.min_retry_len {
            segments = marker_split(content).unwrap_or_else(|| code_token_split(content));
        }

        debug!("Split into {} segment(s)", segments.len());

        let confidence = field
            .confidence
            .unwrap_or(self.policy.fallback_confidence);

        segments
            .into_iter()
            .map(|segment| self.segment_to_record(segment, confidence))
            .collect()
    }

    /// Turn one segment into a record object
    ///
    /// `<code><separator><description>` becomes a two-field record at a
    /// reduced confidence (heuristic splitting loses trust); anything
    /// else becomes a one-field `item` record.
    fn segment_to_record(&self, segment: String, confidence: f64) -> ExtractedNode {
        let captures = NUMERIC_CODE_DESC
            .captures(&segment)
            .or_else(|| ALNUM_CODE_DESC.captures(&segment));

        let mut record = IndexMap::new();
        match captures {
            Some(caps) => {
                let decayed = confidence * self.policy.confidence_decay;
                record.insert(
                    "product_code".to_string(),
                    ExtractedNode::field(Field::with_confidence(&caps[1], decayed)),
                );
                record.insert(
                    "description".to_string(),
                    ExtractedNode::field(Field::with_confidence(&caps[2], decayed)),
                );
            }
            None => {
                record.insert(
                    "item".to_string(),
                    ExtractedNode::field(Field::with_confidence(segment, confidence)),
                );
            }
        }
        ExtractedNode::Object(record)
    }
}

/// Split on `,` (outside parentheses), `;`, and newlines
fn primary_split(content: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (i, ch) in content.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(&content[start..i]);
                start = i + 1;
            }
            ';' | '\n' => {
                segments.push(&content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&content[start..]);

    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Split at repeated product-code markers; `None` when fewer than two
/// markers are present
fn marker_split(content: &str) -> Option<Vec<String>> {
    let starts: Vec<usize> = PRODUCT_MARKER.find_iter(content).map(|m| m.start()).collect();
    if starts.len() < 2 {
        return None;
    }

    debug!("Using product marker splitting, found {} markers", starts.len());

    let mut segments = Vec::with_capacity(starts.len());
    let mut begin = 0;
    for &cut in &starts[1..] {
        if cut > begin {
            segments.push(content[begin..cut].trim().to_string());
            begin = cut;
        }
    }
    segments.push(content[begin..].trim().to_string());
    segments.retain(|s| !s.is_empty());
    Some(segments)
}

/// Last resort: split on `,`/`;` or on whitespace preceding a short
/// numeric/code token like `102 -`
fn code_token_split(content: &str) -> Vec<String> {
    let mut cuts: Vec<(usize, usize)> = Vec::new(); // (segment end, next start)
    for (i, ch) in content.char_indices() {
        if ch == ',' || ch == ';' {
            cuts.push((i, i + 1));
        }
    }
    for caps in CODE_TOKEN.captures_iter(content) {
        let whole = caps.get(0).unwrap();
        let token = caps.get(1).unwrap();
        cuts.push((whole.start(), token.start()));
    }
    cuts.sort();

    let mut segments = Vec::new();
    let mut begin = 0;
    for (end, next) in cuts {
        if end >= begin {
            segments.push(content[begin..end].trim().to_string());
            begin = next;
        }
    }
    segments.push(content[begin..].trim().to_string());
    segments.retain(|s| !s.is_empty());
    segments
}
