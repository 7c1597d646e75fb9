//! Configuration for the extraction pipeline

use docstill_domain::ExtractionOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum document size in bytes
    pub max_document_bytes: usize,

    /// Maximum time for the extraction call (seconds)
    pub extraction_timeout_secs: u64,

    /// Maximum time for the document-type detection call (seconds)
    pub detection_timeout_secs: u64,

    /// Output token budget for the extraction call
    pub max_output_tokens: u32,

    /// Default options applied when a request does not override them
    pub defaults: ExtractionOptions,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Get the detection timeout as a Duration
    pub fn detection_timeout(&self) -> Duration {
        Duration::from_secs(self.detection_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_document_bytes == 0 {
            return Err("max_document_bytes must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if self.detection_timeout_secs == 0 {
            return Err("detection_timeout_secs must be greater than 0".to_string());
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.defaults.temperature) {
            return Err("defaults.temperature must be in [0.0, 2.0]".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_document_bytes: 20 * 1024 * 1024,
            extraction_timeout_secs: 120,
            detection_timeout_secs: 30,
            max_output_tokens: 8192,
            defaults: ExtractionOptions::default(),
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: shorter timeouts and budgets for interactive use
    pub fn aggressive() -> Self {
        Self {
            max_document_bytes: 5 * 1024 * 1024,
            extraction_timeout_secs: 60,
            detection_timeout_secs: 15,
            max_output_tokens: 4096,
            defaults: ExtractionOptions::default(),
        }
    }

    /// Lenient preset: longer timeouts for large scanned documents
    pub fn lenient() -> Self {
        Self {
            max_document_bytes: 50 * 1024 * 1024,
            extraction_timeout_secs: 300,
            detection_timeout_secs: 60,
            max_output_tokens: 8192,
            defaults: ExtractionOptions::default(),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::aggressive().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_document_limit() {
        let mut config = ExtractorConfig::default();
        config.max_document_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_default_temperature() {
        let mut config = ExtractorConfig::default();
        config.defaults.temperature = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.max_document_bytes, parsed.max_document_bytes);
        assert_eq!(config.extraction_timeout_secs, parsed.extraction_timeout_secs);
        assert_eq!(config.defaults, parsed.defaults);
    }

    #[test]
    fn test_defaults_match_persisted_contract() {
        let config = ExtractorConfig::default();
        assert!(config.defaults.include_confidence);
        assert!(!config.defaults.include_positions);
        assert_eq!(config.defaults.temperature, 0.1);
    }
}
