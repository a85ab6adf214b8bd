//! Engine-native request objects

use super::result::Column;
use super::result::FieldValue;
use crate::types::{ConsistencyLevel, MetricType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SparseVectorError {
    #[error("Sparse index {0} is outside the u32 range")]
    IndexOutOfRange(i64),

    #[error("Sparse weight at index {index} is not finite")]
    NonFiniteWeight { index: i64 },
}

/// Sparse vector in engine form, sorted by index
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    /// Build from a provider's index -> weight map, narrowing weights to f32
    pub fn from_weights(weights: &HashMap<i64, f64>) -> Result<Self, SparseVectorError> {
        let mut pairs = Vec::with_capacity(weights.len());
        for (&index, &weight) in weights {
            let position =
                u32::try_from(index).map_err(|_| SparseVectorError::IndexOutOfRange(index))?;
            if !weight.is_finite() {
                return Err(SparseVectorError::NonFiniteWeight { index });
            }
            pairs.push((position, weight as f32));
        }
        pairs.sort_by_key(|(position, _)| *position);

        let (indices, values) = pairs.into_iter().unzip();
        Ok(Self { indices, values })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A query vector of either kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum QueryVector {
    Dense(Vec<f32>),
    Sparse(SparseVector),
}

/// Group results by a scalar field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grouping {
    /// Field whose values define the groups
    pub field: String,
    /// Maximum entities returned per group
    pub group_size: usize,
    /// Require every group to be filled to `group_size`
    pub strict_group_size: bool,
}

/// Fusion strategy applied by the engine to hybrid sub-results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reranker {
    /// Reciprocal rank fusion: score = sum 1 / (k + rank)
    Rrf {
        #[serde(default = "default_rrf_k")]
        k: f64,
    },
    /// Weighted score fusion, one weight per sub-request
    Weighted {
        weights: Vec<f64>,
        #[serde(default)]
        normalize: bool,
    },
}

fn default_rrf_k() -> f64 {
    60.0
}

impl Reranker {
    pub fn rrf() -> Self {
        Self::Rrf { k: default_rrf_k() }
    }

    /// The reranker for a request that kept only the sub-requests at `kept`
    pub fn restricted_to(&self, kept: &[usize]) -> Self {
        match self {
            Self::Rrf { .. } => self.clone(),
            Self::Weighted { weights, normalize } => Self::Weighted {
                weights: kept
                    .iter()
                    .filter_map(|idx| weights.get(*idx).copied())
                    .collect(),
                normalize: *normalize,
            },
        }
    }
}

impl Default for Reranker {
    fn default() -> Self {
        Self::rrf()
    }
}

/// One-shot top-K search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub collection: String,
    pub partitions: Vec<String>,
    pub anns_field: String,
    pub vectors: Vec<QueryVector>,
    pub limit: usize,
    pub metric_type: MetricType,
    pub search_params: BTreeMap<String, String>,
    pub filter: Option<String>,
    pub grouping: Option<Grouping>,
    pub output_fields: Vec<String>,
    pub consistency_level: ConsistencyLevel,
}

/// One sub-search of a hybrid search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnRequest {
    pub anns_field: String,
    pub vector: QueryVector,
    pub limit: usize,
    pub metric_type: Option<MetricType>,
    pub search_params: BTreeMap<String, String>,
    pub filter: Option<String>,
    pub grouping: Option<Grouping>,
}

/// Multi-vector search fused by a reranker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridSearchRequest {
    pub collection: String,
    pub partitions: Vec<String>,
    pub requests: Vec<AnnRequest>,
    pub reranker: Reranker,
    pub limit: usize,
    pub output_fields: Vec<String>,
    pub consistency_level: ConsistencyLevel,
}

/// Scalar (metadata-only) query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub collection: String,
    pub partitions: Vec<String>,
    /// Boolean filter expression; empty matches every row
    pub filter: String,
    pub limit: usize,
    pub output_fields: Vec<String>,
    pub consistency_level: ConsistencyLevel,
}

/// Batched cursor over a search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchIteratorRequest {
    pub collection: String,
    pub partitions: Vec<String>,
    pub anns_field: String,
    pub vector: QueryVector,
    pub metric_type: MetricType,
    pub batch_size: usize,
    /// Total rows to yield across all batches; `None` runs to exhaustion
    pub limit: Option<usize>,
    pub search_params: BTreeMap<String, String>,
    pub filter: Option<String>,
    pub grouping: Option<Grouping>,
    pub output_fields: Vec<String>,
    pub consistency_level: ConsistencyLevel,
}

/// Column-based insert
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRequest {
    pub collection: String,
    pub partition: Option<String>,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertResult {
    /// Primary keys of the inserted rows, in insert order
    pub ids: Vec<FieldValue>,
    pub insert_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_from_weights_sorts_by_index() {
        let weights = HashMap::from([(7, 0.5), (2, 1.25), (40, 0.0)]);
        let sparse = SparseVector::from_weights(&weights).unwrap();

        assert_eq!(sparse.indices, vec![2, 7, 40]);
        assert_eq!(sparse.values, vec![1.25, 0.5, 0.0]);
    }

    #[test]
    fn test_sparse_rejects_negative_index() {
        let weights = HashMap::from([(-1, 0.5)]);
        let err = SparseVector::from_weights(&weights).unwrap_err();
        assert_eq!(err, SparseVectorError::IndexOutOfRange(-1));
    }

    #[test]
    fn test_sparse_rejects_nan_weight() {
        let weights = HashMap::from([(3, f64::NAN)]);
        let err = SparseVector::from_weights(&weights).unwrap_err();
        assert_eq!(err, SparseVectorError::NonFiniteWeight { index: 3 });
    }

    #[test]
    fn test_reranker_serde() {
        let rrf: Reranker = toml::from_str("type = \"rrf\"").unwrap();
        assert_eq!(rrf, Reranker::Rrf { k: 60.0 });

        let weighted: Reranker =
            toml::from_str("type = \"weighted\"\nweights = [0.7, 0.3]").unwrap();
        assert_eq!(
            weighted,
            Reranker::Weighted {
                weights: vec![0.7, 0.3],
                normalize: false
            }
        );
    }
}
