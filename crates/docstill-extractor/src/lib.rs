//! Docstill Extractor
//!
//! Turns a document plus a free-text instruction into a predictable,
//! strongly-shaped record of typed fields with confidence and optional
//! on-page position, tolerant of the generative model's habitual
//! sloppiness (extra prose, markdown fences, inconsistent nesting,
//! concatenated list items as one string).
//!
//! # Architecture
//!
//! ```text
//! Document + Instruction → Prompt Builder → Model → Repairer → Normalizer → Filter → Outcome
//! ```
//!
//! Each stage is a pure transformation. The prompt builder never fails;
//! the repairer and the model call can fail the current request; the
//! normalizer and relevance filter always produce a best-effort tree,
//! preferring to under-filter or under-split rather than discard data.
//!
//! # Example Usage
//!
//! ```no_run
//! use docstill_extractor::{Extractor, ExtractorConfig, ExtractionRequest};
//! use docstill_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::new(r#"{"total": {"value": "199.99", "confidence": 0.9}}"#);
//! let extractor = Extractor::new(provider, ExtractorConfig::default())
//!     .with_model_id("gemini-2.0-flash");
//!
//! let request = ExtractionRequest::new(
//!     std::fs::read("invoice.pdf")?,
//!     "application/pdf",
//!     "extract the total",
//! );
//!
//! let outcome = extractor.extract(request).await?;
//! println!("{}", outcome.to_json());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod filter;
mod normalize;
mod prompt;
mod repair;
mod types;


pub use config::ExtractorConfig;
pub use error::ExtractError;
pub use extractor::Extractor;
pub use filter::filter_relevant;
pub use normalize::{Normalizer, SplitPolicy};
pub use prompt::{PromptBuilder, DETECTION_PROMPT};
pub use repair::{repair_response, RECOVERY_CONFIDENCE};
pub use types::{ExtractionOutcome, ExtractionRequest};
