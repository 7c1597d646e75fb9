//! Core pipeline implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::filter::filter_relevant;
use crate::normalize::{Normalizer, SplitPolicy};
use crate::prompt::{PromptBuilder, DETECTION_PROMPT};
use crate::repair::repair_response;
use crate::types::{ExtractionOutcome, ExtractionRequest};
use docstill_domain::{
    ExtractionId, ExtractionMetadata, ExtractionOptions, ModelProvider, ModelRequest,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Token budget for the short classification call
const DETECTION_MAX_TOKENS: u32 = 50;

/// The Extractor turns a document and an instruction into a normalized,
/// filtered data tree plus provenance metadata
///
/// Stateless per request: concurrent extractions for different documents
/// share nothing mutable.
pub struct Extractor<M>
where
    M: ModelProvider,
{
    provider: Arc<M>,
    config: ExtractorConfig,
    normalizer: Normalizer,
    model_id: String,
}

impl<M> Extractor<M>
where
    M: ModelProvider + Send + Sync + 'static,
    M::Error: Send,
    ExtractError: From<M::Error>,
{
    /// Create a new Extractor
    pub fn new(provider: M, config: ExtractorConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config,
            normalizer: Normalizer::default(),
            model_id: "model".to_string(),
        }
    }

    /// Record a specific model id in metadata
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Use a tuned splitting policy
    pub fn with_policy(mut self, policy: SplitPolicy) -> Self {
        self.normalizer = Normalizer::new(policy);
        self
    }

    /// Run the full pipeline for one document
    pub async fn extract(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractionOutcome, ExtractError> {
        if request.document.len() > self.config.max_document_bytes {
            return Err(ExtractError::DocumentTooLarge(
                request.document.len(),
                self.config.max_document_bytes,
            ));
        }

        let options = request
            .options
            .clone()
            .unwrap_or_else(|| self.config.defaults.clone());

        info!(
            "Starting extraction: {} bytes of {}, instruction {:?}",
            request.document.len(),
            request.mime_type,
            if request.instruction.is_empty() {
                "<general>"
            } else {
                request.instruction.as_str()
            }
        );

        let start_time = Instant::now();
        let timestamp = chrono::Utc::now().to_rfc3339();

        // Optional document-type detection; failure is tolerated, the
        // extraction proceeds without the hint
        let document_type = if options.detect_document_type {
            self.detect_document_type(&request).await
        } else {
            None
        };

        // Build the extraction prompt
        let prompt = PromptBuilder::new(&request.instruction, &options)
            .with_document_type(document_type.as_deref())
            .build();

        debug!("Prompt length: {} chars", prompt.len());

        let model_request = ModelRequest {
            prompt,
            document: None,
            temperature: options.temperature,
            max_output_tokens: self.config.max_output_tokens,
            json_output: true,
        }
        .with_document(request.document.clone(), request.mime_type.clone());

        // Call the model with a timeout; a timeout is retryable and
        // distinct from a parse failure
        let raw_reply = timeout(
            self.config.extraction_timeout(),
            self.call_model(model_request),
        )
        .await
        .map_err(|_| ExtractError::Timeout)??;

        debug!("Model reply length: {} chars", raw_reply.len());

        // Repair, normalize, filter
        let tree = repair_response(&raw_reply)?;
        let tree = self.normalizer.normalize(tree);
        let tree = filter_relevant(tree, &request.instruction);

        let metadata = ExtractionMetadata {
            timestamp,
            model_id: self.model_id.clone(),
            document_type,
            prompt_used: if request.instruction.is_empty() {
                "General extraction".to_string()
            } else {
                request.instruction.clone()
            },
            processing_time_ms: start_time.elapsed().as_millis() as u64,
            options,
        };

        info!(
            "Extraction complete in {} ms, document type {:?}",
            metadata.processing_time_ms, metadata.document_type
        );

        Ok(ExtractionOutcome {
            id: ExtractionId::new(),
            data: tree,
            metadata,
        })
    }

    /// Short classification call run before extraction
    ///
    /// Errors are logged and swallowed: a missing type hint must never
    /// fail the extraction.
    async fn detect_document_type(&self, request: &ExtractionRequest) -> Option<String> {
        let detection_request = ModelRequest {
            prompt: DETECTION_PROMPT.to_string(),
            document: None,
            temperature: 0.0,
            max_output_tokens: DETECTION_MAX_TOKENS,
            json_output: false,
        }
        .with_document(request.document.clone(), request.mime_type.clone());

        let result = timeout(
            self.config.detection_timeout(),
            self.call_model(detection_request),
        )
        .await;

        match result {
            Ok(Ok(reply)) => {
                let document_type = sanitize_document_type(&reply);
                debug!("Detected document type: {:?}", document_type);
                document_type
            }
            Ok(Err(e)) => {
                warn!("Document type detection failed: {}", e);
                None
            }
            Err(_) => {
                warn!("Document type detection timed out");
                None
            }
        }
    }

    /// Call the model provider
    async fn call_model(&self, request: ModelRequest) -> Result<String, ExtractError> {
        let provider = Arc::clone(&self.provider);

        // The provider trait is sync, so call it in a blocking context
        tokio::task::spawn_blocking(move || {
            provider.generate(&request).map_err(ExtractError::from)
        })
        .await
        .map_err(|e| ExtractError::Model(format!("Task join error: {}", e)))?
    }

    /// The effective default options of this extractor
    pub fn default_options(&self) -> &ExtractionOptions {
        &self.config.defaults
    }
}

/// Keep only alphanumerics, spaces, and hyphens from the model's type
/// name reply
fn sanitize_document_type(reply: &str) -> Option<String> {
    let cleaned: String = reply
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .collect();
    let cleaned = cleaned.trim().to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
