//! Embedding models for fact similarity
//!
//! The dedup pipeline only needs a vector per fact text and cosine
//! similarity between vectors; which model produces the vectors is a
//! deployment concern behind the [`EmbeddingModel`] trait.
//!
//! [`HashEmbedder`] is the deterministic default: hash-derived, unit
//! length, no model files, no network. It gives identical texts identical
//! vectors, which is what the similarity tests rely on. Real deployments
//! substitute an actual model through the same trait.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model inference error
    #[error("Model inference failed: {0}")]
    InferenceFailed(String),
}

/// Text-to-vector capability
pub trait EmbeddingModel: Send + Sync {
    /// Generate an embedding for `text`
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Dimension of the vectors this model produces
    fn dimension(&self) -> usize;
}

/// Deterministic hash-based embedder.
///
/// Properties:
/// - same text, same vector
/// - unit length (safe for cosine similarity)
/// - different texts diverge
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder producing `dimension`-length vectors
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn component(text: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        seed.hash(&mut hasher);
        let raw = hasher.finish();
        ((raw as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32
    }
}

impl EmbeddingModel for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }

        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|i| Self::component(text, i as u64))
            .collect();

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity between two vectors of equal length.
///
/// Returns a value in `[-1, 1]`; zero-magnitude inputs yield 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have the same length");

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}
