//! Application-side document representation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Metadata key mirroring the similarity score
pub const SCORE_KEY: &str = "score";

/// A stored or retrieved document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Primary key
    pub id: String,

    /// Text content
    pub content: String,

    /// Free-form metadata
    #[serde(default)]
    pub metadata: HashMap<String, Value>,

    /// Similarity score reported by the engine (retrieval only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Precomputed dense vector, used by the indexer when no embedder is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dense_vector: Option<Vec<f64>>,

    /// Precomputed sparse vector (feature index -> weight)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_vector: Option<HashMap<i64, f64>>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the score, mirrored into `metadata["score"]`
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self.metadata.insert(SCORE_KEY.to_string(), Value::from(score));
        self
    }

    /// The score field, else a numeric `metadata["score"]`
    pub fn effective_score(&self) -> Option<f64> {
        self.score
            .or_else(|| self.metadata.get(SCORE_KEY).and_then(Value::as_f64))
    }

    pub fn with_dense_vector(mut self, vector: Vec<f64>) -> Self {
        self.dense_vector = Some(vector);
        self
    }

    pub fn with_sparse_vector(mut self, vector: HashMap<i64, f64>) -> Self {
        self.sparse_vector = Some(vector);
        self
    }
}
