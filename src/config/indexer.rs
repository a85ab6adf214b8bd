use super::{ConfigValidator, DEFAULT_COLLECTION, DEFAULT_DESCRIPTION, DEFAULT_VECTOR_FIELD};
use crate::embedding::DenseEmbedder;
use crate::error::Result;
use crate::indexer::{default_column_converter, ColumnConverter, IndexBuilder};
use crate::types::{ConsistencyLevel, MetricType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Serialisable indexer settings (the `[indexer]` table)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerSettings {
    /// Empty means [`DEFAULT_COLLECTION`]
    pub collection: String,
    /// Empty means [`DEFAULT_DESCRIPTION`]
    pub description: String,
    /// Dense dimension; required only when the collection must be created
    pub dimension: usize,
    /// Default partition for inserts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_name: Option<String>,
    pub consistency_level: ConsistencyLevel,
    pub enable_dynamic_schema: bool,
    pub metric_type: MetricType,
    /// Dense index; AutoIndex when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexBuilder>,
    /// Sparse index; SparseInvertedIndex when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse_index: Option<IndexBuilder>,
    /// Empty means [`DEFAULT_VECTOR_FIELD`], unless the collection is sparse-only
    pub vector_field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse_vector_field: Option<String>,
}

impl IndexerSettings {
    pub(crate) fn apply_defaults(&mut self) {
        if self.collection.is_empty() {
            self.collection = DEFAULT_COLLECTION.to_string();
        }
        if self.description.is_empty() {
            self.description = DEFAULT_DESCRIPTION.to_string();
        }
        // Dimension 0 with a sparse field is a sparse-only collection
        let sparse_only = self.dimension == 0 && self.sparse_vector_field.is_some();
        if self.vector_field.is_empty() && !sparse_only {
            self.vector_field = DEFAULT_VECTOR_FIELD.to_string();
        }
    }
}

/// Validated, immutable indexer configuration
#[derive(Clone)]
pub struct IndexerConfig {
    settings: IndexerSettings,
    dense_embedder: Option<Arc<dyn DenseEmbedder>>,
    converter: ColumnConverter,
}

impl IndexerConfig {
    pub fn builder() -> IndexerConfigBuilder {
        IndexerConfigBuilder::default()
    }

    pub fn settings(&self) -> &IndexerSettings {
        &self.settings
    }

    pub fn collection(&self) -> &str {
        &self.settings.collection
    }

    /// Dense vector field, `None` for sparse-only collections
    pub fn vector_field(&self) -> Option<&str> {
        Some(self.settings.vector_field.as_str()).filter(|f| !f.is_empty())
    }

    pub fn sparse_vector_field(&self) -> Option<&str> {
        self.settings.sparse_vector_field.as_deref()
    }

    pub fn dense_embedder(&self) -> Option<&Arc<dyn DenseEmbedder>> {
        self.dense_embedder.as_ref()
    }

    pub fn converter(&self) -> &ColumnConverter {
        &self.converter
    }
}

impl fmt::Debug for IndexerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexerConfig")
            .field("settings", &self.settings)
            .field("dense_embedder", &self.dense_embedder.as_ref().map(|e| e.model_name()))
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct IndexerConfigBuilder {
    settings: IndexerSettings,
    dense_embedder: Option<Arc<dyn DenseEmbedder>>,
    converter: Option<ColumnConverter>,
}

impl IndexerConfigBuilder {
    pub fn from_settings(settings: IndexerSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.settings.collection = collection.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.settings.description = description.into();
        self
    }

    pub fn dimension(mut self, dimension: usize) -> Self {
        self.settings.dimension = dimension;
        self
    }

    pub fn partition_name(mut self, partition: impl Into<String>) -> Self {
        self.settings.partition_name = Some(partition.into());
        self
    }

    pub fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.settings.consistency_level = level;
        self
    }

    pub fn enable_dynamic_schema(mut self, enabled: bool) -> Self {
        self.settings.enable_dynamic_schema = enabled;
        self
    }

    pub fn metric_type(mut self, metric: MetricType) -> Self {
        self.settings.metric_type = metric;
        self
    }

    pub fn index(mut self, index: IndexBuilder) -> Self {
        self.settings.index = Some(index);
        self
    }

    pub fn sparse_index(mut self, index: IndexBuilder) -> Self {
        self.settings.sparse_index = Some(index);
        self
    }

    pub fn vector_field(mut self, field: impl Into<String>) -> Self {
        self.settings.vector_field = field.into();
        self
    }

    pub fn sparse_vector_field(mut self, field: impl Into<String>) -> Self {
        self.settings.sparse_vector_field = Some(field.into());
        self
    }

    pub fn dense_embedder(mut self, embedder: Arc<dyn DenseEmbedder>) -> Self {
        self.dense_embedder = Some(embedder);
        self
    }

    pub fn column_converter(mut self, converter: ColumnConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn build(self) -> Result<IndexerConfig> {
        let mut settings = self.settings;
        settings.apply_defaults();

        ConfigValidator::validate_indexer(&settings)?;

        let converter = self.converter.unwrap_or_else(|| {
            default_column_converter(
                Some(settings.vector_field.clone()).filter(|f| !f.is_empty()),
                settings.sparse_vector_field.clone(),
            )
        });

        Ok(IndexerConfig {
            settings,
            dense_embedder: self.dense_embedder,
            converter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VecdockError;

    #[test]
    fn test_defaults_applied() {
        let config = IndexerConfig::builder().dimension(128).build().unwrap();

        assert_eq!(config.collection(), DEFAULT_COLLECTION);
        assert_eq!(config.settings().description, DEFAULT_DESCRIPTION);
        assert_eq!(config.settings().metric_type, MetricType::L2);
        assert_eq!(config.vector_field(), Some(DEFAULT_VECTOR_FIELD));
        assert_eq!(config.settings().consistency_level, ConsistencyLevel::Bounded);
    }

    #[test]
    fn test_custom_values_preserved() {
        let config = IndexerConfig::builder()
            .collection("my_collection")
            .description("my description")
            .metric_type(MetricType::IP)
            .dimension(256)
            .partition_name("my_partition")
            .vector_field("my_vector")
            .index(IndexBuilder::hnsw())
            .build()
            .unwrap();

        assert_eq!(config.collection(), "my_collection");
        assert_eq!(config.settings().description, "my description");
        assert_eq!(config.vector_field(), Some("my_vector"));
        assert_eq!(config.settings().metric_type, MetricType::IP);
        assert_eq!(config.settings().partition_name.as_deref(), Some("my_partition"));
    }

    #[test]
    fn test_sparse_only_keeps_dense_field_empty() {
        let config = IndexerConfig::builder()
            .collection("sparse_only")
            .sparse_vector_field("s_vec")
            .build()
            .unwrap();

        assert_eq!(config.vector_field(), None);
        assert_eq!(config.sparse_vector_field(), Some("s_vec"));
    }

    #[test]
    fn test_invalid_collection_name() {
        let result = IndexerConfig::builder()
            .collection("bad-name")
            .dimension(8)
            .build();
        assert!(matches!(
            result,
            Err(VecdockError::ConfigValidation { .. })
        ));
    }
}
