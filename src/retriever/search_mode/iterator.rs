use super::{check_vector, resolve_anns_field, BuildError};
use crate::config::SearchTarget;
use crate::engine::{QueryVector, SearchIteratorRequest};
use crate::retriever::CallOptions;
use crate::types::MetricType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_BATCH_SIZE: usize = 100;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Batched cursor over a large result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IteratorSearch {
    pub metric_type: MetricType,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub search_params: BTreeMap<String, String>,
}

impl IteratorSearch {
    /// A zero batch size selects [`DEFAULT_BATCH_SIZE`]
    pub fn new(metric_type: MetricType, batch_size: usize) -> Self {
        Self {
            metric_type,
            batch_size: if batch_size == 0 {
                DEFAULT_BATCH_SIZE
            } else {
                batch_size
            },
            search_params: BTreeMap::new(),
        }
    }

    pub fn with_search_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.search_params.insert(key.into(), value.to_string());
        self
    }

    /// Build the cursor request. A top-K call option caps the total rows
    /// yielded; without one the cursor runs to exhaustion.
    pub fn build_iterator_request(
        &self,
        target: &SearchTarget,
        vector: Vec<f32>,
        options: &CallOptions,
    ) -> Result<SearchIteratorRequest, BuildError> {
        check_vector(&vector)?;

        Ok(SearchIteratorRequest {
            collection: target.collection.clone(),
            partitions: target.partitions.clone(),
            anns_field: resolve_anns_field(target, options),
            vector: QueryVector::Dense(vector),
            metric_type: self.metric_type,
            batch_size: self.batch_size,
            limit: options.top_k_override(),
            search_params: self.search_params.clone(),
            filter: options.filter_expr(),
            grouping: options.grouping.clone(),
            output_fields: target.output_fields.clone(),
            consistency_level: target.consistency_level,
        })
    }
}
