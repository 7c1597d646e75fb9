//! Docstill Model Provider Layer
//!
//! Pluggable implementations of the `ModelProvider` trait from
//! `docstill-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: deterministic mock for testing
//! - `GeminiProvider`: Google Generative Language REST API
//!
//! # Examples
//!
//! ```
//! use docstill_llm::MockProvider;
//! use docstill_domain::{ModelProvider, ModelRequest};
//!
//! let provider = MockProvider::new("Hello from the model!");
//! let result = provider.generate(&ModelRequest::text("test prompt")).unwrap();
//! assert_eq!(result, "Hello from the model!");
//! ```

#![warn(missing_docs)]

pub mod gemini;

use docstill_domain::{ModelProvider as ModelProviderTrait, ModelRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gemini::GeminiProvider;

/// Errors that can occur during model operations
#[derive(Error, Debug)]
pub enum ModelError {
    /// The model could not be reached or rejected the key
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    /// Usage quota exhausted; caller should back off and retry later
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Too many requests; caller should back off and retry later
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The requested model id does not exist on the endpoint
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// The endpoint answered with something the provider cannot read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// True when the caller may retry after backing off
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::QuotaExceeded(_) | ModelError::RateLimited(_))
    }
}

/// Mock model provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
///
/// # Examples
///
/// ```
/// use docstill_llm::MockProvider;
/// use docstill_domain::{ModelProvider, ModelRequest};
///
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// assert_eq!(provider.generate(&ModelRequest::text("prompt1")).unwrap(), "response1");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Add a specific response for a given prompt
    ///
    /// Matching is by substring so tests can key on a distinctive part
    /// of a long assembled prompt.
    pub fn add_response(&mut self, prompt_fragment: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt_fragment.into(), response.into());
    }

    /// Configure an error for prompts containing the fragment
    pub fn add_error(&mut self, prompt_fragment: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt_fragment.into(), "ERROR".to_string());
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ModelProviderTrait for MockProvider {
    type Error = ModelError;

    fn generate(&self, request: &ModelRequest) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        let responses = self.responses.lock().unwrap();
        for (fragment, response) in responses.iter() {
            if request.prompt.contains(fragment.as_str()) {
                if response == "ERROR" {
                    return Err(ModelError::Unavailable("Mock error".to_string()));
                }
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.clone())
    }
}
