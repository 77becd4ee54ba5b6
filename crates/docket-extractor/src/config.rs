//! Configuration for fact extraction

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for chunking, mining, and deduplication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum chunk size (characters)
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,

    /// Stage-1 duplicate pre-filter: minimum embedding similarity
    pub vector_similarity_threshold: f32,

    /// Stage-2 duplicate confirmation: minimum text similarity, exclusive
    pub text_similarity_threshold: f64,

    /// Nearest-neighbour candidates considered per dedup check
    pub dedup_search_limit: usize,

    /// Maximum time for a single oracle call (seconds)
    pub call_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap {} must be less than chunk_size {}",
                self.chunk_overlap, self.chunk_size
            ));
        }
        if !(0.0..=1.0).contains(&self.vector_similarity_threshold) {
            return Err("vector_similarity_threshold must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.text_similarity_threshold) {
            return Err("text_similarity_threshold must be within [0, 1]".to_string());
        }
        if self.dedup_search_limit == 0 {
            return Err("dedup_search_limit must be greater than 0".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
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

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4000,
            chunk_overlap: 400,
            vector_similarity_threshold: 0.85,
            text_similarity_threshold: 0.90,
            dedup_search_limit: 10,
            call_timeout_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_less_than_chunk() {
        let mut config = ExtractorConfig::default();
        config.chunk_overlap = config.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_ranges() {
        let mut config = ExtractorConfig::default();
        config.vector_similarity_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.text_similarity_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::default();
        let parsed = ExtractorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config.chunk_size, parsed.chunk_size);
        assert_eq!(config.text_similarity_threshold, parsed.text_similarity_threshold);
    }
}
