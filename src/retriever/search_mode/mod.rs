//! Search-mode strategies
//!
//! Each mode turns a query (vector or filter text), the configured search
//! target and the call options into one engine request. The mode is fixed
//! for the lifetime of a retriever.

mod approximate;
mod hybrid;
mod iterator;
mod range;
mod scalar;

pub use approximate::ApproximateSearch;
pub use hybrid::{HybridSearch, SubRequest, DEFAULT_SUB_REQUEST_TOP_K};
pub use iterator::{IteratorSearch, DEFAULT_BATCH_SIZE};
pub use range::RangeSearch;
pub use scalar::{build_filter_query, ScalarSearch};

use super::CallOptions;
use crate::config::SearchTarget;
use crate::engine::{
    HybridSearchRequest, QueryRequest, SearchIteratorRequest, SearchRequest, SparseVectorError,
};
use crate::types::VectorKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("{mode} search cannot build a single search request, use {entry_point}")]
    WrongEntryPoint {
        mode: &'static str,
        entry_point: &'static str,
    },

    #[error("Failed to build sparse query vector: {0}")]
    SparseEmbedding(#[from] SparseVectorError),

    #[error("No hybrid sub-request could be built from the supplied vectors")]
    NoSubRequests,

    #[error("{kind} query vector not supplied")]
    MissingVector { kind: VectorKind },

    #[error("Query vector is empty")]
    EmptyVector,
}

/// The configured search strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchMode {
    Approximate(ApproximateSearch),
    Range(RangeSearch),
    Scalar(ScalarSearch),
    Hybrid(HybridSearch),
    Iterator(IteratorSearch),
}

/// Query vectors available to a build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVectors {
    pub dense: Option<Vec<f32>>,
    pub sparse: Option<HashMap<i64, f64>>,
}

impl QueryVectors {
    pub fn dense(vector: Vec<f32>) -> Self {
        Self {
            dense: Some(vector),
            sparse: None,
        }
    }

    fn take_dense(self) -> Result<Vec<f32>, BuildError> {
        self.dense.ok_or(BuildError::MissingVector {
            kind: VectorKind::Dense,
        })
    }
}

/// A fully built engine request, one variant per engine call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", content = "request", rename_all = "snake_case")]
pub enum PlannedRequest {
    Search(SearchRequest),
    HybridSearch(HybridSearchRequest),
    Query(QueryRequest),
    SearchIterator(SearchIteratorRequest),
}

impl SearchMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approximate(_) => "approximate",
            Self::Range(_) => "range",
            Self::Scalar(_) => "scalar",
            Self::Hybrid(_) => "hybrid",
            Self::Iterator(_) => "iterator",
        }
    }

    /// Whether the available embedders can produce the vectors this mode needs
    pub fn satisfied_by(&self, has_dense: bool, has_sparse: bool) -> bool {
        match self {
            Self::Scalar(_) => true,
            Self::Hybrid(hybrid) => hybrid.sub_requests.iter().any(|sub| match sub.vector_kind {
                VectorKind::Dense => has_dense,
                VectorKind::Sparse => has_sparse,
            }),
            Self::Approximate(_) | Self::Range(_) | Self::Iterator(_) => has_dense,
        }
    }

    /// Build a one-shot search request.
    ///
    /// Only Approximate and Range searches have one; the other modes return
    /// [`BuildError::WrongEntryPoint`].
    pub fn build_search_request(
        &self,
        target: &SearchTarget,
        vector: Vec<f32>,
        options: &CallOptions,
    ) -> Result<SearchRequest, BuildError> {
        match self {
            Self::Approximate(mode) => mode.build_request(target, vector, options),
            Self::Range(mode) => mode.build_request(target, vector, options),
            Self::Scalar(_) => Err(BuildError::WrongEntryPoint {
                mode: "scalar",
                entry_point: "ScalarSearch::build_query_request",
            }),
            Self::Hybrid(_) => Err(BuildError::WrongEntryPoint {
                mode: "hybrid",
                entry_point: "HybridSearch::build_hybrid_request",
            }),
            Self::Iterator(_) => Err(BuildError::WrongEntryPoint {
                mode: "iterator",
                entry_point: "IteratorSearch::build_iterator_request",
            }),
        }
    }

    /// Build whichever request this mode issues for `query`
    pub fn plan(
        &self,
        target: &SearchTarget,
        query: &str,
        vectors: QueryVectors,
        options: &CallOptions,
    ) -> Result<PlannedRequest, BuildError> {
        match self {
            Self::Scalar(mode) => Ok(PlannedRequest::Query(
                mode.build_query_request(target, query, options),
            )),
            Self::Hybrid(mode) => mode
                .build_hybrid_request(
                    target,
                    vectors.dense.as_deref(),
                    vectors.sparse.as_ref(),
                    options,
                )
                .map(PlannedRequest::HybridSearch),
            Self::Iterator(mode) => mode
                .build_iterator_request(target, vectors.take_dense()?, options)
                .map(PlannedRequest::SearchIterator),
            Self::Approximate(_) | Self::Range(_) => self
                .build_search_request(target, vectors.take_dense()?, options)
                .map(PlannedRequest::Search),
        }
    }
}

impl From<ApproximateSearch> for SearchMode {
    fn from(mode: ApproximateSearch) -> Self {
        Self::Approximate(mode)
    }
}

impl From<RangeSearch> for SearchMode {
    fn from(mode: RangeSearch) -> Self {
        Self::Range(mode)
    }
}

impl From<ScalarSearch> for SearchMode {
    fn from(mode: ScalarSearch) -> Self {
        Self::Scalar(mode)
    }
}

impl From<HybridSearch> for SearchMode {
    fn from(mode: HybridSearch) -> Self {
        Self::Hybrid(mode)
    }
}

impl From<IteratorSearch> for SearchMode {
    fn from(mode: IteratorSearch) -> Self {
        Self::Iterator(mode)
    }
}

/// Vector field: call option, then configuration
pub(crate) fn resolve_anns_field(target: &SearchTarget, options: &CallOptions) -> String {
    options
        .vector_field
        .clone()
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| target.vector_field.clone())
}

/// Top-K: call option, then configuration
pub(crate) fn resolve_top_k(target: &SearchTarget, options: &CallOptions) -> usize {
    options.top_k_override().unwrap_or(target.top_k)
}

pub(crate) fn check_vector(vector: &[f32]) -> Result<(), BuildError> {
    if vector.is_empty() {
        Err(BuildError::EmptyVector)
    } else {
        Ok(())
    }
}
