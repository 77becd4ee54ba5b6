//! Configuration for segmentation

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for windowing, boundary detection, and merging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Analysis window size (pages)
    pub window_size: u32,

    /// Pages shared by consecutive windows
    pub window_overlap: u32,

    /// Minimum merged-boundary confidence to survive the threshold
    pub confidence_threshold: f64,

    /// Candidates whose pages differ by at most this are one boundary
    pub coalesce_tolerance: u32,

    /// Adaptive fallback only fires for productions longer than this
    pub fallback_min_pages: u32,

    /// Floor for the halved fallback window size
    pub min_window_size: u32,

    /// Maximum time for a single oracle call (seconds)
    pub call_timeout_secs: u64,
}

impl SegmenterConfig {
    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Window size used by the one-shot adaptive fallback pass
    pub fn fallback_window_size(&self) -> u32 {
        (self.window_size / 2).max(self.min_window_size)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window_size == 0 {
            return Err("window_size must be greater than 0".to_string());
        }
        if self.window_overlap >= self.window_size {
            return Err(format!(
                "window_overlap {} must be less than window_size {}",
                self.window_overlap, self.window_size
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err("confidence_threshold must be within [0, 1]".to_string());
        }
        if self.min_window_size == 0 || self.min_window_size > self.window_size {
            return Err(format!(
                "min_window_size {} must be in [1, window_size]",
                self.min_window_size
            ));
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

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            window_overlap: 2,
            confidence_threshold: 0.7,
            coalesce_tolerance: 1,
            fallback_min_pages: 10,
            min_window_size: 3,
            call_timeout_secs: 60,
        }
    }
}
