use super::{ApproximateSearch, BuildError};
use crate::config::SearchTarget;
use crate::engine::SearchRequest;
use crate::retriever::CallOptions;
use crate::types::MetricType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RADIUS_PARAM: &str = "radius";
pub const RANGE_FILTER_PARAM: &str = "range_filter";

/// Search bounded by a radius instead of a fixed count.
///
/// Distance metrics (L2, ...) keep hits with `distance <= radius`; similarity
/// metrics (IP, COSINE) keep hits with `score >= radius`. A `range_filter`
/// bounds the other side, turning the search into a ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSearch {
    pub metric_type: MetricType,
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_filter: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub search_params: BTreeMap<String, String>,
}

impl RangeSearch {
    pub fn new(metric_type: MetricType, radius: f64) -> Self {
        Self {
            metric_type,
            radius,
            range_filter: None,
            search_params: BTreeMap::new(),
        }
    }

    pub fn with_range_filter(mut self, range_filter: f64) -> Self {
        self.range_filter = Some(range_filter);
        self
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
        let mut params = self.search_params.clone();
        params.insert(RADIUS_PARAM.to_string(), self.radius.to_string());
        if let Some(range_filter) = self.range_filter {
            params.insert(RANGE_FILTER_PARAM.to_string(), range_filter.to_string());
        }

        let base = ApproximateSearch {
            metric_type: self.metric_type,
            search_params: params,
        };
        base.build_request(target, vector, options)
    }
}
