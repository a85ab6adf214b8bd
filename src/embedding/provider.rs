/// Embedding provider traits
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Model initialization failed: {0}")]
    InitializationError(String),

    #[error("Embedding generation failed: {0}")]
    GenerationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Dense embedding backend
///
/// Must return one vector per input text, in input order.
#[async_trait]
pub trait DenseEmbedder: Send + Sync {
    async fn embed_strings(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbeddingError>;

    /// Model name, for logging
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// Sparse embedding backend (e.g. SPLADE, BM25)
///
/// Must return one index -> weight map per input text, in input order.
#[async_trait]
pub trait SparseEmbedder: Send + Sync {
    async fn embed_strings(
        &self,
        texts: &[String],
    ) -> Result<Vec<HashMap<i64, f64>>, EmbeddingError>;

    fn model_name(&self) -> &str {
        "unknown"
    }
}
