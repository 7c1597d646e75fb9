//! Relevance filtering of extracted top-level keys
//!
//! When a specific instruction was given, the model sometimes volunteers
//! fields nobody asked for. This filter drops them using lexical overlap
//! with the instruction. It never fails and never empties a non-empty
//! tree: under-filtering is always preferred over destroying a valid
//! extraction.

use docstill_domain::ExtractedNode;
use tracing::debug;

/// Fixed synonym pairs matched on whole instruction words
const SYNONYMS: &[(&str, &str)] = &[("sender", "from"), ("recipient", "to")];

/// Keys trusted whenever the instruction mentions tabular data
const TABULAR_KEYS: &[&str] = &["table", "items", "line_items"];

/// Substring tokens must be longer than this many characters
const MIN_TOKEN_LEN: usize = 3;

/// Filter a normalized tree against the original user instruction
///
/// An empty instruction keeps everything (general extraction). Only
/// top-level keys are considered; nested records ride along with their
/// parent.
pub fn filter_relevant(tree: ExtractedNode, instruction: &str) -> ExtractedNode {
    if instruction.trim().is_empty() {
        return tree;
    }
    let ExtractedNode::Object(map) = tree else {
        return tree;
    };

    let lowered = instruction.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let tokens: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| w.len() > MIN_TOKEN_LEN)
        .collect();

    let mut kept = indexmap::IndexMap::new();
    let mut dropped = 0usize;
    for (key, child) in &map {
        if key_is_relevant(key, &words, &tokens) {
            kept.insert(key.clone(), child.clone());
        } else {
            debug!("Dropping unrequested key '{}'", key);
            dropped += 1;
        }
    }

    // Never return an empty result when the unfiltered result was
    // non-empty; the heuristic under-matched.
    if kept.is_empty() && !map.is_empty() {
        debug!("Filter would drop all {} keys; keeping the tree unchanged", dropped);
        return ExtractedNode::Object(map);
    }

    ExtractedNode::Object(kept)
}

fn key_is_relevant(key: &str, words: &[&str], tokens: &[&str]) -> bool {
    let lowered = key.to_lowercase();

    // Explicitly extracted tables are always trusted
    if lowered == "table" {
        return true;
    }

    // Substring relationship with any instruction token, either direction
    if tokens
        .iter()
        .any(|token| lowered.contains(token) || token.contains(lowered.as_str()))
    {
        return true;
    }

    // Fixed synonym pairs, matched on whole words so "to" never fires
    // inside "total"
    for &(a, b) in SYNONYMS {
        if (lowered.contains(a) && words.contains(&b)) || (lowered.contains(b) && words.contains(&a))
        {
            return true;
        }
    }

    // Tabular keys when the instruction mentions tables or items
    if TABULAR_KEYS.contains(&lowered.as_str())
        && (words.contains(&"table") || words.contains(&"items"))
    {
        return true;
    }

    false
}
