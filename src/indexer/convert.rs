//! Document -> column conversion for inserts

use crate::config::{CONTENT_FIELD, ID_FIELD, METADATA_FIELD};
use crate::document::Document;
use crate::embedding::narrow;
use crate::engine::{Column, SparseVector};
use crate::error::{Result, VecdockError};
use std::sync::Arc;

/// Converts documents plus their dense vectors into insert columns.
///
/// `vectors` is empty when no embedder ran; converters then read
/// precomputed vectors from the documents.
pub type ColumnConverter =
    Arc<dyn Fn(&[Document], &[Vec<f64>]) -> Result<Vec<Column>> + Send + Sync>;

/// Columns `id`, `content`, `metadata`, then the dense and sparse vector
/// fields that are configured
pub fn default_column_converter(
    vector_field: Option<String>,
    sparse_vector_field: Option<String>,
) -> ColumnConverter {
    Arc::new(move |docs: &[Document], vectors: &[Vec<f64>]| {
        to_columns(docs, vectors, vector_field.as_deref(), sparse_vector_field.as_deref())
    })
}

fn to_columns(
    docs: &[Document],
    vectors: &[Vec<f64>],
    vector_field: Option<&str>,
    sparse_vector_field: Option<&str>,
) -> Result<Vec<Column>> {
    let mut ids = Vec::with_capacity(docs.len());
    let mut contents = Vec::with_capacity(docs.len());
    let mut metadata = Vec::with_capacity(docs.len());
    let mut dense = Vec::with_capacity(docs.len());
    let mut sparse = Vec::with_capacity(docs.len());

    for (idx, doc) in docs.iter().enumerate() {
        ids.push(doc.id.clone());
        contents.push(doc.content.clone());

        let blob = serde_json::to_vec(&doc.metadata).map_err(|e| VecdockError::Json {
            source: e,
            context: format!("Failed to encode metadata of document {}", doc.id),
        })?;
        metadata.push(blob);

        if vector_field.is_some() {
            let source = if vectors.len() == docs.len() {
                Some(vectors[idx].as_slice())
            } else {
                doc.dense_vector.as_deref()
            };

            match source {
                Some(v) if !v.is_empty() => dense.push(narrow(v)),
                _ => {
                    return Err(VecdockError::Config(format!(
                        "Vector data missing for document {} (id: {})",
                        idx, doc.id
                    )))
                }
            }
        }

        if sparse_vector_field.is_some() {
            let weights = doc.sparse_vector.clone().unwrap_or_default();
            let vector = SparseVector::from_weights(&weights).map_err(|e| {
                VecdockError::Config(format!("Invalid sparse vector for document {}: {}", doc.id, e))
            })?;
            sparse.push(vector);
        }
    }

    let mut columns = vec![
        Column::varchar(ID_FIELD, ids),
        Column::varchar(CONTENT_FIELD, contents),
        Column::json(METADATA_FIELD, metadata),
    ];

    if let Some(field) = vector_field {
        columns.push(Column::float_vector(field, dense));
    }
    if let Some(field) = sparse_vector_field {
        columns.push(Column::sparse_vector(field, sparse));
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FieldValue;
    use serde_json::Value;
    use std::collections::HashMap;

    #[test]
    fn test_embedded_vectors_take_precedence() {
        let converter = default_column_converter(Some("vector".to_string()), None);
        let docs = vec![
            Document::new("1", "first")
                .with_metadata("k", "v")
                .with_dense_vector(vec![9.0, 9.0]),
            Document::new("2", "second"),
        ];

        let columns = converter(&docs, &[vec![0.5, 0.25], vec![1.0, 2.0]]).unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "content", "metadata", "vector"]);

        assert_eq!(
            columns[3].values,
            vec![
                FieldValue::FloatVector(vec![0.5, 0.25]),
                FieldValue::FloatVector(vec![1.0, 2.0]),
            ]
        );

        match &columns[2].values[0] {
            FieldValue::Json(bytes) => {
                let parsed: HashMap<String, Value> = serde_json::from_slice(bytes).unwrap();
                assert_eq!(parsed["k"], Value::from("v"));
            }
            other => panic!("unexpected metadata value {:?}", other),
        }
    }

    #[test]
    fn test_precomputed_vectors_used_without_embedder() {
        let converter = default_column_converter(Some("vector".to_string()), None);
        let docs = vec![Document::new("1", "a").with_dense_vector(vec![0.5])];
        let columns = converter(&docs, &[]).unwrap();
        assert_eq!(columns[3].values, vec![FieldValue::FloatVector(vec![0.5])]);
    }

    #[test]
    fn test_missing_vector_fails() {
        let converter = default_column_converter(Some("vector".to_string()), None);
        let docs = vec![Document::new("1", "a")];
        assert!(converter(&docs, &[]).is_err());
    }

    #[test]
    fn test_sparse_only() {
        let converter = default_column_converter(None, Some("sparse".to_string()));
        let docs = vec![Document::new("1", "a").with_sparse_vector(HashMap::from([(4, 0.5), (2, 1.0)]))];
        let columns = converter(&docs, &[]).unwrap();

        assert_eq!(columns.len(), 4);
        assert_eq!(
            columns[3].values,
            vec![FieldValue::SparseVector(SparseVector {
                indices: vec![2, 4],
                values: vec![1.0, 0.5],
            })]
        );
    }
}
