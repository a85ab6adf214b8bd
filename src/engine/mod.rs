//! Contract with the external vector-search engine
//!
//! The engine owns index structures, nearest-neighbour search and durability.
//! This crate only builds requests for it and reads its result sets, through
//! the [`EngineClient`] trait. Implementations wrap a concrete database SDK;
//! they are expected to be safe for concurrent use and to honour cancellation
//! by having their futures dropped.

mod request;
mod result;
mod schema;

pub use request::{
    AnnRequest, Grouping, HybridSearchRequest, InsertRequest, InsertResult, QueryRequest,
    QueryVector, Reranker, SearchIteratorRequest, SearchRequest, SparseVector, SparseVectorError,
};
pub use result::{Column, FieldValue, ResultSet};
pub use schema::{CollectionSchema, DataType, FieldSchema, IndexSpec, LoadState};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Index not found on collection {0}")]
    IndexNotFound(String),

    #[error("Request rejected: {0}")]
    InvalidRequest(String),

    #[error("RPC failed: {0}")]
    Rpc(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Narrow client interface onto the vector engine
#[async_trait]
pub trait EngineClient: Send + Sync {
    async fn has_collection(&self, collection: &str) -> Result<bool, EngineError>;

    async fn create_collection(
        &self,
        schema: CollectionSchema,
        consistency_level: crate::types::ConsistencyLevel,
    ) -> Result<(), EngineError>;

    async fn load_state(&self, collection: &str) -> Result<LoadState, EngineError>;

    /// Load a collection into memory and wait until it is searchable
    async fn load_collection(&self, collection: &str) -> Result<(), EngineError>;

    /// Names of the indexes on a collection.
    ///
    /// Engines that report "no index yet" as a failure should map it to
    /// [`EngineError::IndexNotFound`].
    async fn list_indexes(&self, collection: &str) -> Result<Vec<String>, EngineError>;

    /// Create an index on `field` and wait until it is built
    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        index: IndexSpec,
    ) -> Result<(), EngineError>;

    async fn insert(&self, request: InsertRequest) -> Result<InsertResult, EngineError>;

    /// Seal pending inserts and wait for completion
    async fn flush(&self, collection: &str) -> Result<(), EngineError>;

    /// One result set per query vector
    async fn search(&self, request: SearchRequest) -> Result<Vec<ResultSet>, EngineError>;

    async fn hybrid_search(
        &self,
        request: HybridSearchRequest,
    ) -> Result<Vec<ResultSet>, EngineError>;

    async fn query(&self, request: QueryRequest) -> Result<ResultSet, EngineError>;

    async fn search_iterator(
        &self,
        request: SearchIteratorRequest,
    ) -> Result<Box<dyn SearchIterator>, EngineError>;
}

/// Cursor over a batched search
#[async_trait]
pub trait SearchIterator: Send {
    /// Fetch the next batch.
    ///
    /// `Ok(None)` is the end-of-results signal and is not an error.
    async fn next_batch(&mut self) -> Result<Option<ResultSet>, EngineError>;
}
