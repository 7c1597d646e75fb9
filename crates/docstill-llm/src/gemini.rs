//! Gemini Provider Implementation
//!
//! Integration with the Google Generative Language REST API
//! (`models/{model}:generateContent`). Documents travel inline with the
//! prompt as base64 parts.
//!
//! # Features
//!
//! - Async HTTP communication with the generateContent endpoint
//! - Configurable endpoint and model
//! - Retry logic with exponential backoff on transport errors
//! - Quota / rate-limit errors surfaced distinctly so callers can back off
//!
//! # Examples
//!
//! ```no_run
//! use docstill_llm::GeminiProvider;
//!
//! let provider = GeminiProvider::new("api-key", "gemini-2.0-flash");
//! // The generate method is async; the ModelProvider trait impl wraps it
//! // for synchronous callers.
//! ```

use crate::ModelError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use docstill_domain::{ModelProvider as ModelProviderTrait, ModelRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model id
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default timeout for model requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Provider backed by the Gemini generateContent API
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
enum Part {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "inline_data")]
    InlineData {
        #[serde(rename = "mime_type")]
        mime_type: String,
        data: String,
    },
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiProvider {
    /// Create a new provider for the default endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key, model)
    }

    /// Create a new provider against a specific endpoint
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The model id this provider targets
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body(&self, request: &ModelRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::Text(request.prompt.clone())];
        if let Some(document) = &request.document {
            parts.push(Part::InlineData {
                mime_type: document.mime_type.clone(),
                data: BASE64.encode(&document.bytes),
            });
        }

        GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
                response_mime_type: if request.json_output {
                    "application/json".to_string()
                } else {
                    "text/plain".to_string()
                },
            },
        }
    }

    /// Generate a completion via the generateContent API
    pub async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );
        let body = self.build_body(request);

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed = response
                            .json::<GenerateContentResponse>()
                            .await
                            .map_err(|e| {
                                ModelError::InvalidResponse(format!(
                                    "Failed to parse response: {}",
                                    e
                                ))
                            })?;
                        return extract_text(parsed);
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());

                    match status {
                        reqwest::StatusCode::TOO_MANY_REQUESTS => {
                            return if error_text.to_lowercase().contains("quota") {
                                Err(ModelError::QuotaExceeded(error_text))
                            } else {
                                Err(ModelError::RateLimited(error_text))
                            };
                        }
                        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                            return Err(ModelError::Unavailable(format!(
                                "API key rejected: {}",
                                error_text
                            )));
                        }
                        reqwest::StatusCode::NOT_FOUND => {
                            return Err(ModelError::ModelNotAvailable(self.model.clone()));
                        }
                        _ => {
                            last_error = Some(ModelError::Unavailable(format!(
                                "HTTP {}: {}",
                                status, error_text
                            )));
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(ModelError::Unavailable(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, ...
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Model call attempt {} failed, retrying in {:?}", attempts, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| ModelError::Unavailable("Max retries exceeded".to_string())))
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, ModelError> {
    let text = response
        .candidates
        .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .map(|parts| {
            parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ModelError::InvalidResponse(
            "Response contained no candidate text".to_string(),
        ));
    }
    Ok(text)
}

impl ModelProviderTrait for GeminiProvider {
    type Error = ModelError;

    fn generate(&self, request: &ModelRequest) -> Result<String, Self::Error> {
        // Blocking wrapper for the async implementation
        tokio::runtime::Runtime::new()
            .map_err(|e| ModelError::Unavailable(format!("Runtime error: {}", e)))?
            .block_on(async { self.generate(request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = GeminiProvider::new("key", "gemini-2.0-flash");
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model(), "gemini-2.0-flash");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_provider_with_max_retries() {
        let provider = GeminiProvider::new("key", DEFAULT_MODEL).with_max_retries(5);
        assert_eq!(provider.max_retries, 5);
    }

    #[test]
    fn test_request_body_includes_document_part() {
        let provider = GeminiProvider::new("key", DEFAULT_MODEL);
        let request = ModelRequest {
            prompt: "analyze this".to_string(),
            document: None,
            temperature: 0.1,
            max_output_tokens: 8192,
            json_output: true,
        }
        .with_document(vec![1, 2, 3], "application/pdf");

        let body = provider.build_body(&request);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "analyze this");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "application/pdf"
        );
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["temperature"], 0.1);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\""}, {"text": ": 1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(ModelError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_error_on_unreachable_endpoint() {
        let provider =
            GeminiProvider::with_endpoint("http://127.0.0.1:1", "key", DEFAULT_MODEL)
                .with_max_retries(1);

        let result = provider.generate(&ModelRequest::text("test")).await;
        assert!(matches!(result, Err(ModelError::Unavailable(_))));
    }
}
