//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Provider implementations live in docstill-llm.

/// A document handed to the model inline with the prompt
#[derive(Debug, Clone)]
pub struct DocumentPart {
    /// Raw document bytes
    pub bytes: Vec<u8>,
    /// MIME type of the document (e.g. "application/pdf")
    pub mime_type: String,
}

/// One generation request to a model provider
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// The full prompt text
    pub prompt: String,

    /// Optional inline document to analyze
    pub document: Option<DocumentPart>,

    /// Sampling temperature
    pub temperature: f64,

    /// Output token budget
    pub max_output_tokens: u32,

    /// Ask the provider for a JSON-typed response where supported
    pub json_output: bool,
}

impl ModelRequest {
    /// A plain-text request with no document attached
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            document: None,
            temperature: 0.0,
            max_output_tokens: 1024,
            json_output: false,
        }
    }

    /// Attach a document part
    pub fn with_document(mut self, bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        self.document = Some(DocumentPart {
            bytes,
            mime_type: mime_type.into(),
        });
        self
    }
}

/// Trait for generative model providers
///
/// Implemented by the infrastructure layer (docstill-llm). The trait is
/// synchronous; async providers wrap themselves and the pipeline calls
/// through a blocking task.
pub trait ModelProvider {
    /// Error type for provider operations
    type Error;

    /// Generate a completion for the request
    fn generate(&self, request: &ModelRequest) -> Result<String, Self::Error>;
}
