//! Result set -> document conversion
//!
//! Rows that cannot become a document are skipped, never failed. Metadata
//! blobs that do not parse degrade to a document without those entries.

use crate::config::{CONTENT_FIELD, ID_FIELD, METADATA_FIELD};
use crate::document::Document;
use crate::engine::{FieldValue, ResultSet};
use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Converts one engine result set into documents
pub type DocumentConverter = Arc<dyn Fn(&ResultSet) -> Result<Vec<Document>> + Send + Sync>;

/// Why a row was left out of the converted documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No id column, or a null id
    MissingId,
    /// The id value has no textual form
    NonTextId,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId => write!(f, "missing {} field", ID_FIELD),
            Self::NonTextId => write!(f, "{} field is not a scalar", ID_FIELD),
        }
    }
}

/// Conversion result for a single row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Converted(Document),
    Skipped { row: usize, reason: SkipReason },
}

/// The converter used when none is configured
pub fn default_converter() -> DocumentConverter {
    Arc::new(convert_result_set)
}

/// Convert every usable row, in row order
pub fn convert_result_set(result: &ResultSet) -> Result<Vec<Document>> {
    let mut documents = Vec::with_capacity(result.len());

    for row in 0..result.len() {
        match convert_row(result, row) {
            RowOutcome::Converted(doc) => documents.push(doc),
            RowOutcome::Skipped { row, reason } => {
                debug!("Skipping result row {}: {}", row, reason);
            }
        }
    }

    Ok(documents)
}

/// Convert row `row` of `result`.
///
/// Metadata precedence, lowest first: passthrough columns, entries of the
/// metadata JSON blob, the score.
pub fn convert_row(result: &ResultSet, row: usize) -> RowOutcome {
    let id = match result.column(ID_FIELD).and_then(|c| c.get(row)) {
        None | Some(FieldValue::Null) => {
            return RowOutcome::Skipped {
                row,
                reason: SkipReason::MissingId,
            }
        }
        Some(value) => match value.as_text() {
            Some(id) => id,
            None => {
                return RowOutcome::Skipped {
                    row,
                    reason: SkipReason::NonTextId,
                }
            }
        },
    };

    let content = result
        .column(CONTENT_FIELD)
        .and_then(|c| c.get(row))
        .and_then(FieldValue::as_text)
        .unwrap_or_default();

    let mut metadata: HashMap<String, Value> = HashMap::new();

    for column in &result.columns {
        let name = column.name.as_str();
        if name == ID_FIELD || name == CONTENT_FIELD || name == METADATA_FIELD {
            continue;
        }
        if let Some(value) = column.get(row) {
            metadata.insert(column.name.clone(), value.to_json());
        }
    }

    if let Some(FieldValue::Json(bytes)) = result.column(METADATA_FIELD).and_then(|c| c.get(row)) {
        match serde_json::from_slice::<HashMap<String, Value>>(bytes) {
            Ok(entries) => metadata.extend(entries),
            Err(e) => debug!("Ignoring unparsable metadata for {}: {}", id, e),
        }
    }

    let mut doc = Document {
        id,
        content,
        metadata,
        ..Default::default()
    };

    if let Some(score) = result.score(row) {
        doc = doc.with_score(f64::from(score));
    }

    RowOutcome::Converted(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SCORE_KEY;
    use crate::engine::Column;

    fn scored(columns: Vec<Column>, scores: Vec<f32>) -> ResultSet {
        ResultSet::new(columns, scores)
    }

    #[test]
    fn test_score_and_metadata_round_trip() {
        let rs = scored(
            vec![
                Column::varchar("id", vec!["doc-1".into()]),
                Column::varchar("content", vec!["hello".into()]),
                Column::json("metadata", vec![br#"{"k":"v"}"#.to_vec()]),
            ],
            vec![0.87],
        );

        let docs = convert_result_set(&rs).unwrap();
        assert_eq!(docs.len(), 1);

        let doc = &docs[0];
        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.content, "hello");
        assert!((doc.score.unwrap() - 0.87).abs() < 1e-6);
        let mirrored = doc.metadata[SCORE_KEY].as_f64().unwrap();
        assert!((mirrored - 0.87).abs() < 1e-6);
        assert_eq!(doc.metadata["k"], Value::from("v"));
    }

    #[test]
    fn test_row_without_id_is_skipped() {
        let rs = scored(vec![Column::varchar("content", vec!["orphan".into()])], vec![]);
        assert_eq!(
            convert_row(&rs, 0),
            RowOutcome::Skipped {
                row: 0,
                reason: SkipReason::MissingId
            }
        );
        assert!(convert_result_set(&rs).unwrap().is_empty());
    }

    #[test]
    fn test_non_text_id_is_skipped() {
        let rs = scored(
            vec![Column::new("id", vec![FieldValue::FloatVector(vec![1.0])])],
            vec![],
        );
        assert!(matches!(
            convert_row(&rs, 0),
            RowOutcome::Skipped {
                reason: SkipReason::NonTextId,
                ..
            }
        ));
    }

    #[test]
    fn test_int_id_and_missing_content() {
        let rs = scored(vec![Column::new("id", vec![FieldValue::Int64(42)])], vec![]);
        let docs = convert_result_set(&rs).unwrap();
        assert_eq!(docs[0].id, "42");
        assert_eq!(docs[0].content, "");
        assert!(docs[0].score.is_none());
        assert!(docs[0].metadata.is_empty());
    }

    #[test]
    fn test_bad_metadata_degrades() {
        let rs = scored(
            vec![
                Column::varchar("id", vec!["a".into()]),
                Column::json("metadata", vec![b"{not json".to_vec()]),
            ],
            vec![0.5],
        );
        let docs = convert_result_set(&rs).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata.len(), 1);
        assert!(docs[0].metadata.contains_key(SCORE_KEY));
    }

    #[test]
    fn test_precedence_passthrough_metadata_score() {
        let rs = scored(
            vec![
                Column::varchar("id", vec!["a".into()]),
                Column::varchar("k", vec!["column".into()]),
                Column::varchar("score", vec!["column".into()]),
                Column::new("year", vec![FieldValue::Int64(2024)]),
                Column::json(
                    "metadata",
                    vec![br#"{"k":"blob","score":"blob"}"#.to_vec()],
                ),
            ],
            vec![0.25],
        );

        let doc = &convert_result_set(&rs).unwrap()[0];
        assert_eq!(doc.metadata["k"], Value::from("blob"));
        assert_eq!(doc.metadata["score"], Value::from(0.25));
        assert_eq!(doc.metadata["year"], Value::from(2024));
    }

    #[test]
    fn test_rows_keep_order() {
        let rs = scored(
            vec![Column::varchar(
                "id",
                vec!["1".into(), "2".into(), "3".into()],
            )],
            vec![0.3, 0.2, 0.1],
        );
        let ids: Vec<_> = convert_result_set(&rs)
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
