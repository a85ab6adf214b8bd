use super::BuildError;
use crate::config::SearchTarget;
use crate::engine::{AnnRequest, HybridSearchRequest, QueryVector, Reranker, SparseVector};
use crate::retriever::CallOptions;
use crate::types::{MetricType, VectorKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Per sub-request top-K when none is set
pub const DEFAULT_SUB_REQUEST_TOP_K: usize = 10;

/// One vector search inside a hybrid search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRequest {
    /// Falls back to the retriever's vector field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_field: Option<String>,
    #[serde(default)]
    pub vector_kind: VectorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<MetricType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub search_params: BTreeMap<String, String>,
}

impl SubRequest {
    fn of_kind(vector_field: impl Into<String>, vector_kind: VectorKind) -> Self {
        Self {
            vector_field: Some(vector_field.into()),
            vector_kind,
            metric_type: None,
            top_k: None,
            search_params: BTreeMap::new(),
        }
    }

    pub fn dense(vector_field: impl Into<String>) -> Self {
        Self::of_kind(vector_field, VectorKind::Dense)
    }

    pub fn sparse(vector_field: impl Into<String>) -> Self {
        Self::of_kind(vector_field, VectorKind::Sparse)
    }

    pub fn with_metric(mut self, metric: MetricType) -> Self {
        self.metric_type = Some(metric);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_search_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.search_params.insert(key.into(), value.to_string());
        self
    }
}

/// Several vector searches fused by a reranker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSearch {
    pub sub_requests: Vec<SubRequest>,
    #[serde(default)]
    pub reranker: Reranker,
    /// Overall top-K, between the call option and the configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl HybridSearch {
    pub fn new(reranker: Reranker, sub_requests: Vec<SubRequest>) -> Self {
        Self {
            sub_requests,
            reranker,
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Build the multi-vector request.
    ///
    /// Sub-requests whose vector kind was not supplied are left out, along
    /// with their reranker weights; the build fails only when none remain.
    pub fn build_hybrid_request(
        &self,
        target: &SearchTarget,
        dense: Option<&[f32]>,
        sparse: Option<&HashMap<i64, f64>>,
        options: &CallOptions,
    ) -> Result<HybridSearchRequest, BuildError> {
        let dense = dense.filter(|v| !v.is_empty());
        let sparse = sparse.filter(|v| !v.is_empty());
        let filter = options.filter_expr();

        let mut requests = Vec::with_capacity(self.sub_requests.len());
        let mut kept = Vec::with_capacity(self.sub_requests.len());

        for (idx, sub) in self.sub_requests.iter().enumerate() {
            let vector = match (sub.vector_kind, dense, sparse) {
                (VectorKind::Dense, Some(v), _) => QueryVector::Dense(v.to_vec()),
                (VectorKind::Sparse, _, Some(weights)) => {
                    QueryVector::Sparse(SparseVector::from_weights(weights)?)
                }
                (kind, _, _) => {
                    debug!("Skipping hybrid sub-request {}: no {} vector", idx, kind);
                    continue;
                }
            };

            requests.push(AnnRequest {
                anns_field: sub
                    .vector_field
                    .clone()
                    .filter(|f| !f.is_empty())
                    .unwrap_or_else(|| target.vector_field.clone()),
                vector,
                limit: sub
                    .top_k
                    .filter(|k| *k > 0)
                    .unwrap_or(DEFAULT_SUB_REQUEST_TOP_K),
                metric_type: sub.metric_type,
                search_params: sub.search_params.clone(),
                filter: filter.clone(),
                grouping: options.grouping.clone(),
            });
            kept.push(idx);
        }

        if requests.is_empty() {
            return Err(BuildError::NoSubRequests);
        }

        let limit = options
            .top_k_override()
            .or(self.top_k.filter(|k| *k > 0))
            .unwrap_or(target.top_k);

        Ok(HybridSearchRequest {
            collection: target.collection.clone(),
            partitions: target.partitions.clone(),
            requests,
            reranker: self.reranker.restricted_to(&kept),
            limit,
            output_fields: target.output_fields.clone(),
            consistency_level: target.consistency_level,
        })
    }
}
