//! Collection provisioning and document storage
//!
//! `Indexer::new` makes sure the target collection exists, is indexed and
//! is loaded. `Indexer::store` embeds documents, converts them to columns,
//! inserts and flushes.

mod convert;
mod index_builder;

pub use convert::{default_column_converter, ColumnConverter};
pub use index_builder::IndexBuilder;

use crate::config::{
    IndexerConfig, CONTENT_FIELD, DEFAULT_MAX_CONTENT_LEN, DEFAULT_MAX_ID_LEN, ID_FIELD,
    METADATA_FIELD,
};
use crate::document::Document;
use crate::embedding::DenseEmbedder;
use crate::engine::{
    CollectionSchema, DataType, EngineClient, EngineError, FieldSchema, InsertRequest, LoadState,
};
use crate::error::{Result, VecdockError};
use crate::types::{MetricType, VectorKind};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Per-call overrides for `store`
#[derive(Clone, Default)]
pub struct StoreOptions {
    /// Partition replacing the configured default
    pub partition: Option<String>,
    /// Dense embedder replacing the configured one
    pub embedder: Option<Arc<dyn DenseEmbedder>>,
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn DenseEmbedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("partition", &self.partition)
            .field("embedder", &self.embedder.as_ref().map(|e| e.model_name()))
            .finish()
    }
}

/// Write-side adapter over a vector engine collection
pub struct Indexer {
    engine: Arc<dyn EngineClient>,
    config: IndexerConfig,
}

impl Indexer {
    /// Create an indexer, provisioning the collection as needed
    pub async fn new(engine: Arc<dyn EngineClient>, config: IndexerConfig) -> Result<Self> {
        let collection = config.collection();

        let exists = engine
            .has_collection(collection)
            .await
            .map_err(|e| VecdockError::engine("has_collection", e))?;

        if !exists {
            if config.vector_field().is_some() && config.settings().dimension == 0 {
                return Err(VecdockError::Config(
                    "dimension is required when the collection does not exist".to_string(),
                ));
            }
            engine
                .create_collection(collection_schema(&config), config.settings().consistency_level)
                .await
                .map_err(|e| VecdockError::engine("create_collection", e))?;
            info!("Created collection {}", collection);
        }

        let state = engine
            .load_state(collection)
            .await
            .map_err(|e| VecdockError::engine("load_state", e))?;

        if state != LoadState::Loaded {
            let indexes = match engine.list_indexes(collection).await {
                Ok(indexes) => indexes,
                Err(EngineError::IndexNotFound(_)) => Vec::new(),
                Err(e) => return Err(VecdockError::engine("list_indexes", e)),
            };

            if indexes.is_empty() {
                create_indexes(engine.as_ref(), &config).await?;
            }

            engine
                .load_collection(collection)
                .await
                .map_err(|e| VecdockError::engine("load_collection", e))?;
            info!("Loaded collection {}", collection);
        }

        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Store documents and return their ids as reported by the engine.
    ///
    /// Documents with an empty id get a random UUID.
    pub async fn store(&self, docs: Vec<Document>, options: &StoreOptions) -> Result<Vec<String>> {
        let docs: Vec<Document> = docs
            .into_iter()
            .map(|mut doc| {
                if doc.id.is_empty() {
                    doc.id = Uuid::new_v4().to_string();
                }
                doc
            })
            .collect();

        let embedder = options
            .embedder
            .clone()
            .or_else(|| self.config.dense_embedder().cloned());

        let vectors = match embedder {
            Some(embedder) => {
                let texts: Vec<String> = docs.iter().map(|d| d.content.clone()).collect();
                let vectors = embedder
                    .embed_strings(&texts)
                    .await
                    .map_err(|source| VecdockError::Embedding {
                        kind: VectorKind::Dense,
                        source,
                    })?;
                if vectors.len() != docs.len() {
                    return Err(VecdockError::EmbeddingShapeMismatch {
                        kind: VectorKind::Dense,
                        expected: docs.len(),
                        actual: vectors.len(),
                    });
                }
                debug!("Embedded {} documents with {}", docs.len(), embedder.model_name());
                vectors
            }
            None => Vec::new(),
        };

        let columns = (self.config.converter())(&docs, &vectors)?;

        let partition = options
            .partition
            .clone()
            .or_else(|| self.config.settings().partition_name.clone());

        let result = self
            .engine
            .insert(InsertRequest {
                collection: self.config.collection().to_string(),
                partition,
                columns,
            })
            .await
            .map_err(|e| VecdockError::engine("insert", e))?;

        self.engine
            .flush(self.config.collection())
            .await
            .map_err(|e| VecdockError::engine("flush", e))?;

        let ids = result
            .ids
            .iter()
            .map(|id| {
                id.as_text().ok_or_else(|| {
                    VecdockError::engine(
                        "insert",
                        EngineError::InvalidRequest(format!("Non-scalar primary key {:?}", id)),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Stored {} documents in {}", ids.len(), self.config.collection());
        Ok(ids)
    }
}

/// Default schema: id, content, metadata plus the configured vector fields
fn collection_schema(config: &IndexerConfig) -> CollectionSchema {
    let settings = config.settings();

    let mut fields = vec![
        FieldSchema::new(ID_FIELD, DataType::VarChar)
            .primary_key()
            .with_max_length(DEFAULT_MAX_ID_LEN),
        FieldSchema::new(CONTENT_FIELD, DataType::VarChar).with_max_length(DEFAULT_MAX_CONTENT_LEN),
        FieldSchema::new(METADATA_FIELD, DataType::Json),
    ];

    if let Some(field) = config.vector_field() {
        fields.push(FieldSchema::new(field, DataType::FloatVector).with_dim(settings.dimension));
    }
    if let Some(field) = config.sparse_vector_field() {
        fields.push(FieldSchema::new(field, DataType::SparseFloatVector));
    }

    CollectionSchema {
        name: settings.collection.clone(),
        description: settings.description.clone(),
        fields,
        enable_dynamic_field: settings.enable_dynamic_schema,
    }
}

async fn create_indexes(engine: &dyn EngineClient, config: &IndexerConfig) -> Result<()> {
    let settings = config.settings();
    let collection = config.collection();

    if let Some(field) = config.vector_field() {
        let spec = settings
            .index
            .as_ref()
            .unwrap_or(&IndexBuilder::Auto)
            .build(settings.metric_type);
        info!("Creating {} index on {}.{}", spec.index_type, collection, field);
        engine
            .create_index(collection, field, spec)
            .await
            .map_err(|e| VecdockError::engine("create_index", e))?;
    }

    if let Some(field) = config.sparse_vector_field() {
        let spec = settings
            .sparse_index
            .clone()
            .unwrap_or_else(IndexBuilder::sparse_inverted)
            .build(MetricType::IP);
        info!("Creating {} index on {}.{}", spec.index_type, collection, field);
        engine
            .create_index(collection, field, spec)
            .await
            .map_err(|e| VecdockError::engine("create_index", e))?;
    }

    Ok(())
}
