//! Query-side embedding: one query text in, one vector out

use super::{DenseEmbedder, SparseEmbedder};
use crate::error::{Result, VecdockError};
use crate::types::VectorKind;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Turns a query string into dense and/or sparse vectors.
///
/// Nothing is cached; every call re-embeds.
#[derive(Clone, Default)]
pub struct QueryEmbedder {
    dense: Option<Arc<dyn DenseEmbedder>>,
    sparse: Option<Arc<dyn SparseEmbedder>>,
}

impl QueryEmbedder {
    pub fn new(
        dense: Option<Arc<dyn DenseEmbedder>>,
        sparse: Option<Arc<dyn SparseEmbedder>>,
    ) -> Self {
        Self { dense, sparse }
    }

    pub fn has_dense(&self) -> bool {
        self.dense.is_some()
    }

    pub fn has_sparse(&self) -> bool {
        self.sparse.is_some()
    }

    /// Embed `text` with the dense provider, narrowed to f32
    pub async fn embed_dense(&self, text: &str) -> Result<Vec<f32>> {
        let embedder = self.dense.as_ref().ok_or(VecdockError::EmbeddingUnavailable {
            kind: VectorKind::Dense,
        })?;

        let mut vectors = embedder
            .embed_strings(&[text.to_string()])
            .await
            .map_err(|source| VecdockError::Embedding {
                kind: VectorKind::Dense,
                source,
            })?;

        let vector = single(&mut vectors, VectorKind::Dense)?;
        debug!(
            "Embedded query with {} ({} dims)",
            embedder.model_name(),
            vector.len()
        );

        Ok(narrow(&vector))
    }

    /// Embed `text` with the sparse provider
    pub async fn embed_sparse(&self, text: &str) -> Result<HashMap<i64, f64>> {
        let embedder = self
            .sparse
            .as_ref()
            .ok_or(VecdockError::EmbeddingUnavailable {
                kind: VectorKind::Sparse,
            })?;

        let mut vectors = embedder
            .embed_strings(&[text.to_string()])
            .await
            .map_err(|source| VecdockError::Embedding {
                kind: VectorKind::Sparse,
                source,
            })?;

        let vector = single(&mut vectors, VectorKind::Sparse)?;
        debug!(
            "Embedded sparse query with {} ({} terms)",
            embedder.model_name(),
            vector.len()
        );

        Ok(vector)
    }
}

fn single<T>(vectors: &mut Vec<T>, kind: VectorKind) -> Result<T> {
    if vectors.len() != 1 {
        return Err(VecdockError::EmbeddingShapeMismatch {
            kind,
            expected: 1,
            actual: vectors.len(),
        });
    }
    vectors.pop().ok_or(VecdockError::EmbeddingShapeMismatch {
        kind,
        expected: 1,
        actual: 0,
    })
}

/// Element-wise f64 -> f32 conversion
pub fn narrow(vector: &[f64]) -> Vec<f32> {
    vector.iter().map(|v| *v as f32).collect()
}
