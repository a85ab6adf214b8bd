//! Retrieval dispatch
//!
//! A [`Retriever`] holds an immutable [`RetrieverConfig`] and a shared engine
//! handle. Each `retrieve` call embeds the query as the configured search
//! mode requires, builds one engine request, executes it, converts the rows
//! and applies the score threshold.

mod convert;
mod options;
mod search_mode;

pub use convert::{
    convert_result_set, convert_row, default_converter, DocumentConverter, RowOutcome, SkipReason,
};
pub use options::{CallOptions, CancelToken};
pub use search_mode::{
    build_filter_query, ApproximateSearch, BuildError, HybridSearch, IteratorSearch,
    PlannedRequest, QueryVectors, RangeSearch, ScalarSearch, SearchMode, SubRequest,
    DEFAULT_BATCH_SIZE, DEFAULT_SUB_REQUEST_TOP_K,
};

use crate::config::RetrieverConfig;
use crate::document::Document;
use crate::embedding::QueryEmbedder;
use crate::engine::{EngineClient, LoadState, ResultSet, SearchIteratorRequest};
use crate::error::{Result, VecdockError};
use std::sync::Arc;
use tracing::{debug, info};

/// Query-side adapter over a vector engine collection
pub struct Retriever {
    engine: Arc<dyn EngineClient>,
    config: RetrieverConfig,
}

impl Retriever {
    /// Create a retriever, loading the collection if it is not loaded yet
    pub async fn new(engine: Arc<dyn EngineClient>, config: RetrieverConfig) -> Result<Self> {
        let collection = config.collection();

        let exists = engine
            .has_collection(collection)
            .await
            .map_err(|e| VecdockError::engine("has_collection", e))?;
        if !exists {
            return Err(VecdockError::CollectionNotFound {
                name: collection.to_string(),
            });
        }

        let state = engine
            .load_state(collection)
            .await
            .map_err(|e| VecdockError::engine("load_state", e))?;
        if state != LoadState::Loaded {
            info!("Loading collection {} (state: {:?})", collection, state);
            engine
                .load_collection(collection)
                .await
                .map_err(|e| VecdockError::engine("load_collection", e))?;
        }

        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Retrieve documents for `query`.
    ///
    /// For the scalar mode `query` is a filter expression; every other mode
    /// embeds it.
    pub async fn retrieve(&self, query: &str, options: &CallOptions) -> Result<Vec<Document>> {
        options.check_cancelled()?;

        let mode = self.config.search_mode();
        let vectors = self.embed_for(mode, query, options).await?;
        let request = mode.plan(self.config.target(), query, vectors, options)?;

        debug!(
            "Dispatching {} search on {}",
            mode.name(),
            self.config.collection()
        );

        let documents = match request {
            PlannedRequest::Query(request) => {
                let result = self
                    .engine
                    .query(request)
                    .await
                    .map_err(|e| VecdockError::engine("query", e))?;
                self.convert(&result)?
            }
            PlannedRequest::HybridSearch(request) => {
                let results = self
                    .engine
                    .hybrid_search(request)
                    .await
                    .map_err(|e| VecdockError::engine("hybrid_search", e))?;
                self.convert_first(results)?
            }
            PlannedRequest::Search(request) => {
                let results = self
                    .engine
                    .search(request)
                    .await
                    .map_err(|e| VecdockError::engine("search", e))?;
                self.convert_first(results)?
            }
            PlannedRequest::SearchIterator(request) => self.drain_iterator(request, options).await?,
        };

        let threshold = options
            .score_threshold
            .or_else(|| self.config.score_threshold());
        let converted = documents.len();
        let documents = apply_score_threshold(documents, threshold);

        debug!(
            "Retrieved {} documents ({} before score threshold)",
            documents.len(),
            converted
        );

        Ok(documents)
    }

    /// Embed the query into whatever vectors `mode` consumes
    async fn embed_for(
        &self,
        mode: &SearchMode,
        query: &str,
        options: &CallOptions,
    ) -> Result<QueryVectors> {
        let embedder = QueryEmbedder::new(
            options
                .embedder
                .clone()
                .or_else(|| self.config.dense_embedder().cloned()),
            self.config.sparse_embedder().cloned(),
        );

        match mode {
            SearchMode::Scalar(_) => Ok(QueryVectors::default()),
            SearchMode::Hybrid(_) => {
                let dense = if embedder.has_dense() {
                    Some(embedder.embed_dense(query).await?)
                } else {
                    None
                };
                let sparse = if embedder.has_sparse() {
                    Some(embedder.embed_sparse(query).await?)
                } else {
                    None
                };
                Ok(QueryVectors { dense, sparse })
            }
            SearchMode::Approximate(_) | SearchMode::Range(_) | SearchMode::Iterator(_) => {
                Ok(QueryVectors::dense(embedder.embed_dense(query).await?))
            }
        }
    }

    fn convert(&self, result: &ResultSet) -> Result<Vec<Document>> {
        (self.config.converter())(result)
    }

    /// One query vector goes in, so only the first result set is used
    fn convert_first(&self, results: Vec<ResultSet>) -> Result<Vec<Document>> {
        match results.first() {
            Some(result) => self.convert(result),
            None => Ok(Vec::new()),
        }
    }

    /// Fetch batches sequentially until the engine reports the end
    async fn drain_iterator(
        &self,
        request: SearchIteratorRequest,
        options: &CallOptions,
    ) -> Result<Vec<Document>> {
        let mut iterator = self
            .engine
            .search_iterator(request)
            .await
            .map_err(|e| VecdockError::engine("search_iterator", e))?;

        let mut documents = Vec::new();
        let mut batches = 0usize;

        loop {
            options.check_cancelled()?;

            let batch = match iterator
                .next_batch()
                .await
                .map_err(|e| VecdockError::engine("iterator_next", e))?
            {
                Some(batch) => batch,
                None => break,
            };

            if batch.is_empty() {
                break;
            }

            batches += 1;
            documents.extend(self.convert(&batch)?);
        }

        debug!("Iterator finished after {} batches", batches);
        Ok(documents)
    }
}

/// Drop documents without a score or scoring below `threshold`.
///
/// The score is read from `Document::score`, falling back to
/// `metadata["score"]`. Relative order is kept; applying the same threshold
/// twice is a no-op.
pub fn apply_score_threshold(documents: Vec<Document>, threshold: Option<f64>) -> Vec<Document> {
    match threshold {
        None => documents,
        Some(threshold) => documents
            .into_iter()
            .filter(|doc| doc.effective_score().is_some_and(|score| score >= threshold))
            .collect(),
    }
}
