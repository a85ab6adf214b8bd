/// Embedding providers and query-side orchestration
///
/// - DenseEmbedder / SparseEmbedder traits abstract the model backends
/// - QueryEmbedder enforces one vector per query and f64 -> f32 narrowing
/// - FastEmbedProvider (feature `local-embedding`) runs a local model
#[cfg(feature = "local-embedding")]
mod fastembed_provider;
mod provider;
mod query;

#[cfg(feature = "local-embedding")]
pub use fastembed_provider::FastEmbedProvider;
pub use provider::{DenseEmbedder, EmbeddingError, SparseEmbedder};
pub use query::{narrow, QueryEmbedder};
