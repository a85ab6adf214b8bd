/// Local dense embeddings via FastEmbed
use super::{DenseEmbedder, EmbeddingError};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;

/// FastEmbed provider for local embedding generation
///
/// Uses all-MiniLM-L6-v2 model (384 dimensions) by default.
/// Models are downloaded to `~/.cache/huggingface/` on first use.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedProvider {
    pub fn new(model_name: &str) -> Result<Self, EmbeddingError> {
        let (embedding_model, dimension) = match model_name {
            "all-MiniLM-L6-v2" | "all-minilm-l6-v2" => (EmbeddingModel::AllMiniLML6V2, 384),
            "bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384),
            "bge-base-en-v1.5" => (EmbeddingModel::BGEBaseENV15, 768),
            _ => {
                return Err(EmbeddingError::InitializationError(format!(
                    "Unsupported model: {}. Supported: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5",
                    model_name
                )));
            }
        };

        tracing::info!(
            "Initializing embedding model: {} ({}D)",
            model_name,
            dimension
        );

        let init_options = InitOptions::new(embedding_model).with_show_download_progress(true);

        let model = TextEmbedding::try_new(init_options)
            .map_err(|e| EmbeddingError::InitializationError(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            model_name: model_name.to_string(),
            dimension,
        })
    }

    /// Create provider with default model (all-MiniLM-L6-v2)
    pub fn with_default_model() -> Result<Self, EmbeddingError> {
        Self::new("all-MiniLM-L6-v2")
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl DenseEmbedder for FastEmbedProvider {
    async fn embed_strings(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.is_empty()) {
            return Err(EmbeddingError::InvalidInput("Empty text".to_string()));
        }

        // Inference is CPU-bound
        let model = Arc::clone(&self.model);
        let batch = texts.to_vec();
        let embeddings = tokio::task::spawn_blocking(move || model.embed(batch, None))
            .await
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?;

        embeddings
            .into_iter()
            .map(|embedding| {
                if embedding.len() != self.dimension {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimension,
                        actual: embedding.len(),
                    });
                }
                Ok(embedding.into_iter().map(f64::from).collect())
            })
            .collect()
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires model download (~90MB) - run with: cargo test --features local-embedding -- --ignored
    async fn test_single_embedding() {
        let provider = FastEmbedProvider::with_default_model().unwrap();
        let vectors = provider
            .embed_strings(&["This is a test sentence for embedding.".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].len(), 384);
    }

    #[tokio::test]
    #[ignore] // Requires model download (~90MB)
    async fn test_empty_text() {
        let provider = FastEmbedProvider::with_default_model().unwrap();
        let result = provider.embed_strings(&[String::new()]).await;
        assert!(result.is_err());
    }
}
