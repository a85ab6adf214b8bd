use super::resolve_top_k;
use crate::config::SearchTarget;
use crate::engine::QueryRequest;
use crate::retriever::CallOptions;
use serde::{Deserialize, Serialize};

/// Metadata-only query; the query text is the filter expression
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScalarSearch {}

impl ScalarSearch {
    pub fn new() -> Self {
        Self {}
    }

    pub fn build_query_request(
        &self,
        target: &SearchTarget,
        query: &str,
        options: &CallOptions,
    ) -> QueryRequest {
        let extra = options.filter.as_deref().unwrap_or("");

        QueryRequest {
            collection: target.collection.clone(),
            partitions: target.partitions.clone(),
            filter: build_filter_query(query, extra),
            limit: resolve_top_k(target, options),
            output_fields: target.output_fields.clone(),
            consistency_level: target.consistency_level,
        }
    }
}

/// AND two filter expressions, parenthesising both when both are set
pub fn build_filter_query(query: &str, filter: &str) -> String {
    match (query.is_empty(), filter.is_empty()) {
        (false, false) => format!("({}) and ({})", query, filter),
        (false, true) => query.to_string(),
        (true, _) => filter.to_string(),
    }
}
