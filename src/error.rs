use crate::embedding::EmbeddingError;
use crate::engine::EngineError;
use crate::retriever::BuildError;
use crate::types::VectorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vecdock
#[derive(Error, Debug)]
pub enum VecdockError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// No embedder configured for the vector kind a request needs
    #[error("{kind} embedding not provided")]
    EmbeddingUnavailable { kind: VectorKind },

    /// The embedding provider itself failed
    #[error("Failed to embed {kind} query: {source}")]
    Embedding {
        kind: VectorKind,
        source: EmbeddingError,
    },

    /// The provider returned the wrong number of vectors
    #[error("Invalid {kind} embedding result: expected {expected}, got {actual}")]
    EmbeddingShapeMismatch {
        kind: VectorKind,
        expected: usize,
        actual: usize,
    },

    /// Engine request could not be assembled
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] BuildError),

    /// The external engine reported a failure
    #[error("Engine {operation} failed: {source}")]
    Engine {
        operation: &'static str,
        source: EngineError,
    },

    /// Target collection does not exist on the engine
    #[error("Collection {name:?} not found")]
    CollectionNotFound { name: String },

    /// Caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VecdockError {
    pub(crate) fn engine(operation: &'static str, source: EngineError) -> Self {
        Self::Engine { operation, source }
    }
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for vecdock operations
pub type Result<T> = std::result::Result<T, VecdockError>;
