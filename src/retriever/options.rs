//! Per-call overrides

use crate::embedding::DenseEmbedder;
use crate::engine::Grouping;
use crate::error::{Result, VecdockError};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Overrides for a single retrieve call.
///
/// Every field takes precedence over the mode's own setting, which in turn
/// takes precedence over the retriever configuration.
#[derive(Clone, Default)]
pub struct CallOptions {
    /// Result count; zero is treated as unset
    pub top_k: Option<usize>,
    pub score_threshold: Option<f64>,
    /// Vector field for Approximate, Range and Iterator searches
    pub vector_field: Option<String>,
    /// Boolean filter expression
    pub filter: Option<String>,
    pub grouping: Option<Grouping>,
    /// Dense embedder replacing the configured one
    pub embedder: Option<Arc<dyn DenseEmbedder>>,
    pub cancel: Option<CancelToken>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    pub fn with_vector_field(mut self, field: impl Into<String>) -> Self {
        self.vector_field = Some(field.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_grouping(mut self, field: impl Into<String>, group_size: usize, strict: bool) -> Self {
        self.grouping = Some(Grouping {
            field: field.into(),
            group_size,
            strict_group_size: strict,
        });
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn DenseEmbedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Top-K override, ignoring zero
    pub fn top_k_override(&self) -> Option<usize> {
        self.top_k.filter(|k| *k > 0)
    }

    pub(crate) fn filter_expr(&self) -> Option<String> {
        self.filter.clone().filter(|f| !f.is_empty())
    }

    pub(crate) fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(VecdockError::Cancelled),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("top_k", &self.top_k)
            .field("score_threshold", &self.score_threshold)
            .field("vector_field", &self.vector_field)
            .field("filter", &self.filter)
            .field("grouping", &self.grouping)
            .field("embedder", &self.embedder.as_ref().map(|e| e.model_name()))
            .field("cancel", &self.cancel)
            .finish()
    }
}
