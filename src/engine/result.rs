//! Column-oriented result sets returned by the engine

use super::request::SparseVector;
use serde::Serialize;
use serde_json::Value;

/// A single cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float(f32),
    Double(f64),
    VarChar(String),
    /// JSON-encoded blob
    Json(Vec<u8>),
    FloatVector(Vec<f32>),
    SparseVector(SparseVector),
}

impl FieldValue {
    /// Textual form of scalar values, `None` for blobs and vectors
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::VarChar(s) => Some(s.clone()),
            Self::Int64(v) => Some(v.to_string()),
            Self::Bool(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Double(v) => Some(v.to_string()),
            Self::Null | Self::Json(_) | Self::FloatVector(_) | Self::SparseVector(_) => None,
        }
    }

    /// Verbatim JSON rendering, used for passthrough metadata columns
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(v) => Value::Bool(*v),
            Self::Int64(v) => Value::from(*v),
            Self::Float(v) => Value::from(f64::from(*v)),
            Self::Double(v) => Value::from(*v),
            Self::VarChar(s) => Value::String(s.clone()),
            Self::Json(bytes) => serde_json::from_slice(bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
            Self::FloatVector(v) => Value::from(v.iter().map(|x| f64::from(*x)).collect::<Vec<_>>()),
            Self::SparseVector(sv) => serde_json::json!({
                "indices": sv.indices,
                "values": sv.values,
            }),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<FieldValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn varchar(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(name, values.into_iter().map(FieldValue::VarChar).collect())
    }

    pub fn json(name: impl Into<String>, values: Vec<Vec<u8>>) -> Self {
        Self::new(name, values.into_iter().map(FieldValue::Json).collect())
    }

    pub fn float_vector(name: impl Into<String>, values: Vec<Vec<f32>>) -> Self {
        Self::new(name, values.into_iter().map(FieldValue::FloatVector).collect())
    }

    pub fn sparse_vector(name: impl Into<String>, values: Vec<SparseVector>) -> Self {
        Self::new(name, values.into_iter().map(FieldValue::SparseVector).collect())
    }

    pub fn get(&self, idx: usize) -> Option<&FieldValue> {
        self.values.get(idx)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rows returned by one search, query or iterator batch
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultSet {
    pub result_count: usize,
    /// Per-row similarity; empty for scalar queries
    pub scores: Vec<f32>,
    pub columns: Vec<Column>,
}

impl ResultSet {
    pub fn new(columns: Vec<Column>, scores: Vec<f32>) -> Self {
        let result_count = columns.iter().map(Column::len).max().unwrap_or(0);
        Self {
            result_count,
            scores,
            columns,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn score(&self, idx: usize) -> Option<f32> {
        self.scores.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.result_count
    }

    pub fn is_empty(&self) -> bool {
        self.result_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_count_from_columns() {
        let rs = ResultSet::new(
            vec![Column::varchar("id", vec!["a".into(), "b".into()])],
            vec![0.9, 0.8],
        );
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.score(1), Some(0.8));
        assert!(rs.column("content").is_none());
    }

    #[test]
    fn test_json_cell_renders_parsed() {
        let cell = FieldValue::Json(br#"{"a":1}"#.to_vec());
        assert_eq!(cell.to_json(), serde_json::json!({"a": 1}));

        let broken = FieldValue::Json(b"not json".to_vec());
        assert_eq!(broken.to_json(), Value::String("not json".into()));
    }

    #[test]
    fn test_as_text() {
        assert_eq!(FieldValue::Int64(42).as_text(), Some("42".into()));
        assert_eq!(FieldValue::VarChar("x".into()).as_text(), Some("x".into()));
        assert_eq!(FieldValue::Json(vec![]).as_text(), None);
    }
}
