use super::{check_vector, resolve_anns_field, resolve_top_k, BuildError};
use crate::config::SearchTarget;
use crate::engine::{QueryVector, SearchRequest};
use crate::retriever::CallOptions;
use crate::types::MetricType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-K nearest-neighbour search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproximateSearch {
    pub metric_type: MetricType,
    /// Index-specific parameters such as `ef` or `nprobe`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub search_params: BTreeMap<String, String>,
}

impl ApproximateSearch {
    pub fn new(metric_type: MetricType) -> Self {
        Self {
            metric_type,
            search_params: BTreeMap::new(),
        }
    }

    pub fn with_search_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.search_params.insert(key.into(), value.to_string());
        self
    }

    pub fn build_request(
        &self,
        target: &SearchTarget,
        vector: Vec<f32>,
        options: &CallOptions,
    ) -> Result<SearchRequest, BuildError> {
        check_vector(&vector)?;

        Ok(SearchRequest {
            collection: target.collection.clone(),
            partitions: target.partitions.clone(),
            anns_field: resolve_anns_field(target, options),
            vectors: vec![QueryVector::Dense(vector)],
            limit: resolve_top_k(target, options),
            metric_type: self.metric_type,
            search_params: self.search_params.clone(),
            filter: options.filter_expr(),
            grouping: options.grouping.clone(),
            output_fields: target.output_fields.clone(),
            consistency_level: target.consistency_level,
        })
    }
}
