use super::{ConfigValidator, DEFAULT_COLLECTION, DEFAULT_TOP_K, DEFAULT_VECTOR_FIELD};
use crate::embedding::{DenseEmbedder, SparseEmbedder};
use crate::error::{Result, VecdockError};
use crate::retriever::{default_converter, DocumentConverter, SearchMode};
use crate::types::ConsistencyLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Serialisable retriever settings (the `[retriever]` table)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverSettings {
    /// Empty means [`DEFAULT_COLLECTION`]
    pub collection: String,
    /// Empty means [`DEFAULT_VECTOR_FIELD`]
    pub vector_field: String,
    /// Zero means [`DEFAULT_TOP_K`]
    pub top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
    pub consistency_level: ConsistencyLevel,
    /// Empty searches all partitions
    pub partitions: Vec<String>,
    /// Empty returns the engine's default fields
    pub output_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
}

impl RetrieverSettings {
    pub(crate) fn apply_defaults(&mut self) {
        if self.collection.is_empty() {
            self.collection = DEFAULT_COLLECTION.to_string();
        }
        if self.vector_field.is_empty() {
            self.vector_field = DEFAULT_VECTOR_FIELD.to_string();
        }
        if self.top_k == 0 {
            self.top_k = DEFAULT_TOP_K;
        }
    }
}

/// The request-shaping part of a retriever configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTarget {
    pub collection: String,
    pub vector_field: String,
    pub top_k: usize,
    pub partitions: Vec<String>,
    pub output_fields: Vec<String>,
    pub consistency_level: ConsistencyLevel,
}

impl SearchTarget {
    /// Target with default field names and top-K
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            vector_field: DEFAULT_VECTOR_FIELD.to_string(),
            top_k: DEFAULT_TOP_K,
            partitions: Vec::new(),
            output_fields: Vec::new(),
            consistency_level: ConsistencyLevel::default(),
        }
    }

    /// Target described by `settings`, with defaults applied
    pub fn from_settings(settings: &RetrieverSettings) -> Self {
        let mut settings = settings.clone();
        settings.apply_defaults();
        Self {
            collection: settings.collection,
            vector_field: settings.vector_field,
            top_k: settings.top_k,
            partitions: settings.partitions,
            output_fields: settings.output_fields,
            consistency_level: settings.consistency_level,
        }
    }
}

/// Validated, immutable retriever configuration
#[derive(Clone)]
pub struct RetrieverConfig {
    target: SearchTarget,
    score_threshold: Option<f64>,
    search_mode: SearchMode,
    dense_embedder: Option<Arc<dyn DenseEmbedder>>,
    sparse_embedder: Option<Arc<dyn SparseEmbedder>>,
    converter: DocumentConverter,
}

impl RetrieverConfig {
    pub fn builder() -> RetrieverConfigBuilder {
        RetrieverConfigBuilder::default()
    }

    pub fn target(&self) -> &SearchTarget {
        &self.target
    }

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn top_k(&self) -> usize {
        self.target.top_k
    }

    pub fn score_threshold(&self) -> Option<f64> {
        self.score_threshold
    }

    pub fn search_mode(&self) -> &SearchMode {
        &self.search_mode
    }

    pub fn dense_embedder(&self) -> Option<&Arc<dyn DenseEmbedder>> {
        self.dense_embedder.as_ref()
    }

    pub fn sparse_embedder(&self) -> Option<&Arc<dyn SparseEmbedder>> {
        self.sparse_embedder.as_ref()
    }

    pub fn converter(&self) -> &DocumentConverter {
        &self.converter
    }
}

impl fmt::Debug for RetrieverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrieverConfig")
            .field("target", &self.target)
            .field("score_threshold", &self.score_threshold)
            .field("search_mode", &self.search_mode)
            .field("dense_embedder", &self.dense_embedder.as_ref().map(|e| e.model_name()))
            .field("sparse_embedder", &self.sparse_embedder.as_ref().map(|e| e.model_name()))
            .finish_non_exhaustive()
    }
}

/// Collects retriever configuration; `build` defaults and validates once
#[derive(Default)]
pub struct RetrieverConfigBuilder {
    settings: RetrieverSettings,
    dense_embedder: Option<Arc<dyn DenseEmbedder>>,
    sparse_embedder: Option<Arc<dyn SparseEmbedder>>,
    converter: Option<DocumentConverter>,
}

impl RetrieverConfigBuilder {
    pub fn from_settings(settings: RetrieverSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.settings.collection = collection.into();
        self
    }

    pub fn vector_field(mut self, field: impl Into<String>) -> Self {
        self.settings.vector_field = field.into();
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.settings.top_k = top_k;
        self
    }

    pub fn score_threshold(mut self, threshold: f64) -> Self {
        self.settings.score_threshold = Some(threshold);
        self
    }

    pub fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.settings.consistency_level = level;
        self
    }

    pub fn partitions<I, S>(mut self, partitions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.partitions = partitions.into_iter().map(Into::into).collect();
        self
    }

    pub fn output_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.output_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn search_mode(mut self, mode: impl Into<SearchMode>) -> Self {
        self.settings.search_mode = Some(mode.into());
        self
    }

    pub fn dense_embedder(mut self, embedder: Arc<dyn DenseEmbedder>) -> Self {
        self.dense_embedder = Some(embedder);
        self
    }

    pub fn sparse_embedder(mut self, embedder: Arc<dyn SparseEmbedder>) -> Self {
        self.sparse_embedder = Some(embedder);
        self
    }

    pub fn document_converter(mut self, converter: DocumentConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn build(self) -> Result<RetrieverConfig> {
        let mut settings = self.settings;
        settings.apply_defaults();

        ConfigValidator::validate_retriever(
            &settings,
            self.dense_embedder.is_some(),
            self.sparse_embedder.is_some(),
        )?;

        let target = SearchTarget::from_settings(&settings);
        let search_mode = settings.search_mode.ok_or_else(|| {
            VecdockError::Config("Search mode not provided".to_string())
        })?;

        Ok(RetrieverConfig {
            target,
            score_threshold: settings.score_threshold,
            search_mode,
            dense_embedder: self.dense_embedder,
            sparse_embedder: self.sparse_embedder,
            converter: self.converter.unwrap_or_else(default_converter),
        })
    }
}
