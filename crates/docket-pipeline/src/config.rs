//! Pipeline configuration, composing the segmenter and extractor configs

use docket_extractor::ExtractorConfig;
use docket_segmenter::SegmenterConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a production run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Boundary detection and merging
    pub segmenter: SegmenterConfig,

    /// Chunking, mining, and deduplication
    pub extractor: ExtractorConfig,

    /// Concurrent boundary-detection calls
    pub detection_concurrency: usize,

    /// Concurrent segment extractions
    pub extraction_concurrency: usize,
}

impl PipelineConfig {
    /// Validate the configuration, including the composed sections
    pub fn validate(&self) -> Result<(), String> {
        self.segmenter.validate()?;
        self.extractor.validate()?;
        if self.detection_concurrency == 0 {
            return Err("detection_concurrency must be greater than 0".to_string());
        }
        if self.extraction_concurrency == 0 {
            return Err("extraction_concurrency must be greater than 0".to_string());
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

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            extractor: ExtractorConfig::default(),
            detection_concurrency: 4,
            extraction_concurrency: 3,
        }
    }
}
