//! Configuration management for vecdock
//!
//! Retriever and indexer configuration is assembled with builders that
//! default and validate exactly once. The serialisable part can also be
//! loaded from a TOML settings file, with `VECDOCK_SECTION__KEY`
//! environment overrides applied before validation.

use crate::error::{Result, VecdockError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod indexer;
mod retriever;
mod validator;

pub use indexer::{IndexerConfig, IndexerConfigBuilder, IndexerSettings};
pub use retriever::{RetrieverConfig, RetrieverConfigBuilder, RetrieverSettings, SearchTarget};
pub use validator::ConfigValidator;

pub const DEFAULT_COLLECTION: &str = "vecdock_collection";
pub const DEFAULT_DESCRIPTION: &str = "the collection for vecdock";
pub const DEFAULT_VECTOR_FIELD: &str = "vector";
pub const DEFAULT_TOP_K: usize = 5;

/// Reserved column names of the default schema
pub const ID_FIELD: &str = "id";
pub const CONTENT_FIELD: &str = "content";
pub const METADATA_FIELD: &str = "metadata";

pub const DEFAULT_MAX_ID_LEN: usize = 255;
pub const DEFAULT_MAX_CONTENT_LEN: usize = 65535;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Settings file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "_meta")]
    pub meta: MetaSettings,
    #[serde(default)]
    pub retriever: RetrieverSettings,
    #[serde(default)]
    pub indexer: IndexerSettings,
}

/// Metadata about the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaSettings {
    pub schema_version: String,
}

impl Settings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VecdockError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| VecdockError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;

        let mut settings = Self::from_toml(&content)?;
        settings.apply_env_overrides()?;

        ConfigValidator::validate_settings(&settings)?;

        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| VecdockError::Io {
                source: e,
                context: format!("Failed to create config directory: {:?}", parent),
            })?;
        }
        std::fs::write(path, content).map_err(|e| VecdockError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: VECDOCK_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(std::env::vars())
    }

    /// Apply `VECDOCK_`-prefixed overrides from any key/value source
    pub fn apply_overrides<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix("VECDOCK_") {
                self.set_value_from_env(config_key, &value)?;
            }
        }
        Ok(())
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "RETRIEVER__COLLECTION" => self.retriever.collection = value.to_string(),
            "RETRIEVER__VECTOR_FIELD" => self.retriever.vector_field = value.to_string(),
            "RETRIEVER__TOP_K" => self.retriever.top_k = parse_value(path, value)?,
            "RETRIEVER__SCORE_THRESHOLD" => {
                self.retriever.score_threshold = Some(parse_value(path, value)?)
            }
            "RETRIEVER__CONSISTENCY_LEVEL" => {
                self.retriever.consistency_level = parse_enum(path, value)?
            }
            "INDEXER__COLLECTION" => self.indexer.collection = value.to_string(),
            "INDEXER__DIMENSION" => self.indexer.dimension = parse_value(path, value)?,
            "INDEXER__PARTITION_NAME" => self.indexer.partition_name = Some(value.to_string()),
            _ => {
                tracing::warn!("Unknown env config key: VECDOCK_{}", path);
            }
        }
        Ok(())
    }

    /// Retriever builder seeded from the `[retriever]` table
    pub fn retriever_builder(&self) -> RetrieverConfigBuilder {
        RetrieverConfigBuilder::from_settings(self.retriever.clone())
    }

    /// Indexer builder seeded from the `[indexer]` table
    pub fn indexer_builder(&self) -> IndexerConfigBuilder {
        IndexerConfigBuilder::from_settings(self.indexer.clone())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            VecdockError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("vecdock").join("config.toml"))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            meta: MetaSettings {
                schema_version: SCHEMA_VERSION.to_string(),
            },
            retriever: RetrieverSettings::default(),
            indexer: IndexerSettings::default(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| VecdockError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}'", value),
    })
}

fn parse_enum<T: serde::de::DeserializeOwned>(path: &str, value: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase())).map_err(|e| {
        VecdockError::InvalidConfigValue {
            path: path.to_string(),
            message: e.to_string(),
        }
    })
}
