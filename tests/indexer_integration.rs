//! Indexer provisioning and storage against a scripted engine

mod common;

use common::{ids, Call, ScriptedEngine, StubDense};
use std::sync::Arc;
use vecdock::engine::{DataType, FieldValue, LoadState};
use vecdock::types::{ConsistencyLevel, MetricType};
use vecdock::{Document, IndexBuilder, Indexer, IndexerConfig, StoreOptions, VecdockError};

#[tokio::test]
async fn test_new_creates_missing_collection() {
    let engine = Arc::new(
        ScriptedEngine::new()
            .missing_collection()
            .with_indexes(None),
    );
    let config = IndexerConfig::builder()
        .collection("articles")
        .dimension(4)
        .metric_type(MetricType::Cosine)
        .consistency_level(ConsistencyLevel::Strong)
        .build()
        .unwrap();

    Indexer::new(engine.clone(), config).await.unwrap();

    let calls = engine.calls();

    let (schema, level) = calls
        .iter()
        .find_map(|c| match c {
            Call::CreateCollection(schema, level) => Some((schema.clone(), *level)),
            _ => None,
        })
        .unwrap();
    assert_eq!(schema.name, "articles");
    assert_eq!(level, ConsistencyLevel::Strong);
    assert_eq!(schema.field("vector").unwrap().data_type, DataType::FloatVector);
    assert_eq!(schema.field("vector").unwrap().dim, Some(4));

    let indexes: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            Call::CreateIndex(field, spec) => Some((field.clone(), spec.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].0, "vector");
    assert_eq!(indexes[0].1.index_type, "AUTOINDEX");
    assert_eq!(indexes[0].1.metric_type, MetricType::Cosine);

    assert_eq!(calls.last(), Some(&Call::LoadCollection("articles".to_string())));
}

#[tokio::test]
async fn test_new_requires_dimension_for_new_collection() {
    let engine = Arc::new(ScriptedEngine::new().missing_collection());
    let config = IndexerConfig::builder().collection("articles").build().unwrap();

    let result = Indexer::new(engine.clone(), config).await;
    assert!(matches!(result, Err(VecdockError::Config(_))));
    assert!(!engine
        .calls()
        .iter()
        .any(|c| matches!(c, Call::CreateCollection(..))));
}

#[tokio::test]
async fn test_sparse_index_defaults() {
    let engine = Arc::new(
        ScriptedEngine::new()
            .with_load_state(LoadState::NotLoad)
            .with_indexes(Some(Vec::new())),
    );
    let config = IndexerConfig::builder()
        .collection("articles")
        .dimension(4)
        .index(IndexBuilder::hnsw())
        .sparse_vector_field("sparse")
        .build()
        .unwrap();

    Indexer::new(engine.clone(), config).await.unwrap();

    let specs: Vec<_> = engine
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreateIndex(field, spec) => Some((field, spec)),
            _ => None,
        })
        .collect();

    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].0, "vector");
    assert_eq!(specs[0].1.index_type, "HNSW");
    assert_eq!(specs[1].0, "sparse");
    assert_eq!(specs[1].1.index_type, "SPARSE_INVERTED_INDEX");
    assert_eq!(specs[1].1.metric_type, MetricType::IP);
}

#[tokio::test]
async fn test_existing_indexes_are_kept() {
    let engine = Arc::new(ScriptedEngine::new().with_load_state(LoadState::NotLoad));
    let config = IndexerConfig::builder().dimension(4).build().unwrap();

    Indexer::new(engine.clone(), config).await.unwrap();

    let calls = engine.calls();
    assert!(!calls.iter().any(|c| matches!(c, Call::CreateIndex(..))));
    assert!(calls.iter().any(|c| matches!(c, Call::LoadCollection(_))));
}

#[tokio::test]
async fn test_list_indexes_failure_propagates() {
    let engine = Arc::new(
        ScriptedEngine::new()
            .with_load_state(LoadState::NotLoad)
            .failing("list_indexes"),
    );
    let config = IndexerConfig::builder().dimension(4).build().unwrap();

    let result = Indexer::new(engine, config).await;
    assert!(matches!(
        result,
        Err(VecdockError::Engine {
            operation: "list_indexes",
            ..
        })
    ));
}

#[tokio::test]
async fn test_store_embeds_inserts_and_flushes() {
    let embedder = StubDense::new(vec![0.5, 0.25]);
    let engine = Arc::new(ScriptedEngine::new());
    let config = IndexerConfig::builder()
        .collection("articles")
        .dimension(2)
        .partition_name("default_part")
        .dense_embedder(embedder.clone())
        .build()
        .unwrap();

    let indexer = Indexer::new(engine.clone(), config).await.unwrap();
    let stored = indexer
        .store(
            vec![
                Document::new("a", "first").with_metadata("lang", "en"),
                Document::new("", "no id yet"),
            ],
            &StoreOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(embedder.calls(), 1);
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0], "a");
    assert!(uuid::Uuid::parse_str(&stored[1]).is_ok());

    let calls = engine.calls();
    let insert = calls
        .iter()
        .find_map(|c| match c {
            Call::Insert(req) => Some(req.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(insert.collection, "articles");
    assert_eq!(insert.partition.as_deref(), Some("default_part"));
    assert_eq!(ids(&insert.columns[0].values), stored);

    let vectors = insert.columns.iter().find(|c| c.name == "vector").unwrap();
    assert_eq!(vectors.values[0], FieldValue::FloatVector(vec![0.5, 0.25]));

    assert_eq!(calls.last(), Some(&Call::Flush("articles".to_string())));
}

#[tokio::test]
async fn test_store_partition_override_and_precomputed_vectors() {
    let engine = Arc::new(ScriptedEngine::new());
    let config = IndexerConfig::builder()
        .dimension(1)
        .partition_name("default_part")
        .build()
        .unwrap();

    let indexer = Indexer::new(engine.clone(), config).await.unwrap();
    indexer
        .store(
            vec![Document::new("a", "first").with_dense_vector(vec![0.75])],
            &StoreOptions::new().with_partition("hot"),
        )
        .await
        .unwrap();

    let insert = engine
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::Insert(req) => Some(req),
            _ => None,
        })
        .unwrap();
    assert_eq!(insert.partition.as_deref(), Some("hot"));
    assert_eq!(insert.columns[3].values, vec![FieldValue::FloatVector(vec![0.75])]);
}

#[tokio::test]
async fn test_store_insert_failure() {
    let engine = Arc::new(ScriptedEngine::new().failing("insert"));
    let config = IndexerConfig::builder()
        .dimension(1)
        .dense_embedder(StubDense::new(vec![1.0]))
        .build()
        .unwrap();

    let indexer = Indexer::new(engine.clone(), config).await.unwrap();
    let err = indexer
        .store(vec![Document::new("a", "x")], &StoreOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VecdockError::Engine {
            operation: "insert",
            ..
        }
    ));
    assert!(!engine.calls().iter().any(|c| matches!(c, Call::Flush(_))));
}
