//! Scripted engine double and stub embedders shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vecdock::embedding::{DenseEmbedder, EmbeddingError, SparseEmbedder};
use vecdock::engine::{
    Column, CollectionSchema, EngineClient, EngineError, FieldValue, HybridSearchRequest,
    IndexSpec, InsertRequest, InsertResult, LoadState, QueryRequest, ResultSet, SearchIterator,
    SearchIteratorRequest, SearchRequest,
};
use vecdock::types::ConsistencyLevel;
use vecdock::CancelToken;

/// One recorded engine call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    HasCollection(String),
    CreateCollection(CollectionSchema, ConsistencyLevel),
    LoadState(String),
    LoadCollection(String),
    ListIndexes(String),
    CreateIndex(String, IndexSpec),
    Insert(InsertRequest),
    Flush(String),
    Search(SearchRequest),
    HybridSearch(HybridSearchRequest),
    Query(QueryRequest),
    SearchIterator(SearchIteratorRequest),
    NextBatch,
}

/// Engine double that replays canned answers and records every call
pub struct ScriptedEngine {
    exists: bool,
    load_state: LoadState,
    /// `None` answers list_indexes with IndexNotFound
    indexes: Option<Vec<String>>,
    search_results: Vec<ResultSet>,
    query_result: ResultSet,
    batches: Vec<ResultSet>,
    cancel_after_first_batch: Option<CancelToken>,
    failing: Option<&'static str>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedEngine {
    /// An existing, loaded collection
    pub fn new() -> Self {
        Self {
            exists: true,
            load_state: LoadState::Loaded,
            indexes: Some(vec!["vector".to_string()]),
            search_results: Vec::new(),
            query_result: ResultSet::empty(),
            batches: Vec::new(),
            cancel_after_first_batch: None,
            failing: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn missing_collection(mut self) -> Self {
        self.exists = false;
        self.load_state = LoadState::NotExist;
        self
    }

    pub fn with_load_state(mut self, state: LoadState) -> Self {
        self.load_state = state;
        self
    }

    pub fn with_indexes(mut self, indexes: Option<Vec<String>>) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn with_search_results(mut self, results: Vec<ResultSet>) -> Self {
        self.search_results = results;
        self
    }

    pub fn with_query_result(mut self, result: ResultSet) -> Self {
        self.query_result = result;
        self
    }

    pub fn with_batches(mut self, batches: Vec<ResultSet>) -> Self {
        self.batches = batches;
        self
    }

    pub fn cancel_after_first_batch(mut self, token: CancelToken) -> Self {
        self.cancel_after_first_batch = Some(token);
        self
    }

    /// Make the named operation fail with an RPC error
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing = Some(operation);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(call);
        if self.failing == Some(operation) {
            return Err(EngineError::Rpc(format!("{} unavailable", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl EngineClient for ScriptedEngine {
    async fn has_collection(&self, collection: &str) -> Result<bool, EngineError> {
        self.record("has_collection", Call::HasCollection(collection.to_string()))?;
        Ok(self.exists)
    }

    async fn create_collection(
        &self,
        schema: CollectionSchema,
        consistency_level: ConsistencyLevel,
    ) -> Result<(), EngineError> {
        self.record(
            "create_collection",
            Call::CreateCollection(schema, consistency_level),
        )
    }

    async fn load_state(&self, collection: &str) -> Result<LoadState, EngineError> {
        self.record("load_state", Call::LoadState(collection.to_string()))?;
        Ok(self.load_state)
    }

    async fn load_collection(&self, collection: &str) -> Result<(), EngineError> {
        self.record("load_collection", Call::LoadCollection(collection.to_string()))
    }

    async fn list_indexes(&self, collection: &str) -> Result<Vec<String>, EngineError> {
        self.record("list_indexes", Call::ListIndexes(collection.to_string()))?;
        self.indexes
            .clone()
            .ok_or_else(|| EngineError::IndexNotFound(collection.to_string()))
    }

    async fn create_index(
        &self,
        _collection: &str,
        field: &str,
        index: IndexSpec,
    ) -> Result<(), EngineError> {
        self.record("create_index", Call::CreateIndex(field.to_string(), index))
    }

    async fn insert(&self, request: InsertRequest) -> Result<InsertResult, EngineError> {
        let ids = request
            .columns
            .iter()
            .find(|c| c.name == "id")
            .map(|c| c.values.clone())
            .unwrap_or_default();
        self.record("insert", Call::Insert(request))?;
        Ok(InsertResult {
            insert_count: ids.len(),
            ids,
        })
    }

    async fn flush(&self, collection: &str) -> Result<(), EngineError> {
        self.record("flush", Call::Flush(collection.to_string()))
    }

    async fn search(&self, request: SearchRequest) -> Result<Vec<ResultSet>, EngineError> {
        self.record("search", Call::Search(request))?;
        Ok(self.search_results.clone())
    }

    async fn hybrid_search(
        &self,
        request: HybridSearchRequest,
    ) -> Result<Vec<ResultSet>, EngineError> {
        self.record("hybrid_search", Call::HybridSearch(request))?;
        Ok(self.search_results.clone())
    }

    async fn query(&self, request: QueryRequest) -> Result<ResultSet, EngineError> {
        self.record("query", Call::Query(request))?;
        Ok(self.query_result.clone())
    }

    async fn search_iterator(
        &self,
        request: SearchIteratorRequest,
    ) -> Result<Box<dyn SearchIterator>, EngineError> {
        self.record("search_iterator", Call::SearchIterator(request))?;
        Ok(Box::new(ScriptedIterator {
            batches: self.batches.clone().into(),
            cancel_after_first_batch: self.cancel_after_first_batch.clone(),
            fail_next: self.failing == Some("iterator_next"),
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct ScriptedIterator {
    batches: VecDeque<ResultSet>,
    cancel_after_first_batch: Option<CancelToken>,
    fail_next: bool,
    calls: Arc<Mutex<Vec<Call>>>,
}

#[async_trait]
impl SearchIterator for ScriptedIterator {
    async fn next_batch(&mut self) -> Result<Option<ResultSet>, EngineError> {
        self.calls.lock().unwrap().push(Call::NextBatch);

        let batch = self.batches.pop_front();
        if self.fail_next && batch.is_none() {
            return Err(EngineError::Rpc("iterator stream broken".to_string()));
        }
        if let Some(token) = self.cancel_after_first_batch.take() {
            token.cancel();
        }
        Ok(batch)
    }
}

/// Dense embedder returning the same vector for every text
pub struct StubDense {
    vector: Vec<f64>,
    calls: AtomicUsize,
}

impl StubDense {
    pub fn new(vector: Vec<f64>) -> Arc<Self> {
        Arc::new(Self {
            vector,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DenseEmbedder for StubDense {
    async fn embed_strings(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|_| self.vector.clone()).collect())
    }

    fn model_name(&self) -> &str {
        "stub-dense"
    }
}

/// Dense embedder that always fails
pub struct FailingDense;

#[async_trait]
impl DenseEmbedder for FailingDense {
    async fn embed_strings(&self, _texts: &[String]) -> Result<Vec<Vec<f64>>, EmbeddingError> {
        Err(EmbeddingError::GenerationError("model offline".to_string()))
    }
}

/// Sparse embedder returning the same weights for every text
pub struct StubSparse(pub HashMap<i64, f64>);

#[async_trait]
impl SparseEmbedder for StubSparse {
    async fn embed_strings(
        &self,
        texts: &[String],
    ) -> Result<Vec<HashMap<i64, f64>>, EmbeddingError> {
        Ok(texts.iter().map(|_| self.0.clone()).collect())
    }
}

/// Result set with an `id` column and one score per row
pub fn rows(ids: &[&str], scores: &[f32]) -> ResultSet {
    ResultSet::new(
        vec![Column::varchar(
            "id",
            ids.iter().map(|id| id.to_string()).collect(),
        )],
        scores.to_vec(),
    )
}

/// Result set with `id`, `content` and `metadata` columns and no scores
pub fn scalar_rows(entries: &[(&str, &str, &str)]) -> ResultSet {
    ResultSet::new(
        vec![
            Column::varchar("id", entries.iter().map(|e| e.0.to_string()).collect()),
            Column::varchar("content", entries.iter().map(|e| e.1.to_string()).collect()),
            Column::json(
                "metadata",
                entries.iter().map(|e| e.2.as_bytes().to_vec()).collect(),
            ),
        ],
        Vec::new(),
    )
}

pub fn ids(values: &[FieldValue]) -> Vec<String> {
    values.iter().filter_map(FieldValue::as_text).collect()
}
