//! CLI argument definitions and parsing.

use clap::Parser;
use std::path::{Path, PathBuf};

/// Docstill CLI - extract structured data from a document.
#[derive(Debug, Parser)]
#[command(name = "docstill")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Document to extract from (PDF or image)
    pub file: PathBuf,

    /// What to extract; empty means "extract all key information"
    #[arg(short, long, default_value = "")]
    pub instruction: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Model id to use
    #[arg(long, default_value = "gemini-2.0-flash")]
    pub model: String,

    /// Override the API endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Ask for on-page positions (page number + bounding box)
    #[arg(long)]
    pub positions: bool,

    /// Do not ask for confidence scores
    #[arg(long)]
    pub no_confidence: bool,

    /// Skip document-type detection
    #[arg(long)]
    pub no_detect: bool,

    /// Sampling temperature for the extraction call
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CliFormat::Pretty)]
    pub format: CliFormat,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Pretty-printed JSON (default)
    Pretty,
    /// Single-line JSON
    Compact,
}

/// Infer the document MIME type from the file extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
