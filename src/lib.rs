//! vecdock - retrieval and indexing adapter for external vector engines
//!
//! Stores documents in, and retrieves documents from, a vector-search engine
//! reached through the [`engine::EngineClient`] trait. Retrieval goes through
//! one of five search modes (approximate, range, scalar, hybrid, iterator);
//! results come back as [`Document`]s filtered by an optional score threshold.

pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod indexer;
pub mod retriever;
pub mod types;

pub use config::{IndexerConfig, RetrieverConfig, Settings};
pub use document::Document;
pub use error::{Result, VecdockError};
pub use indexer::{IndexBuilder, Indexer, StoreOptions};
pub use retriever::{CallOptions, CancelToken, Retriever, SearchMode};
pub use types::{ConsistencyLevel, MetricType, VectorKind};
