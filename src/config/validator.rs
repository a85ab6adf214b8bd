use super::{IndexerSettings, RetrieverSettings, Settings, SCHEMA_VERSION};
use crate::engine::Reranker;
use crate::error::{Result, ValidationError, VecdockError};
use crate::retriever::SearchMode;
use regex::Regex;

/// Collection, field and partition names accepted by the engine
const NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a settings file.
    ///
    /// Embedder presence and search-mode presence are checked later by the
    /// builders, since a file cannot carry embedders.
    pub fn validate_settings(settings: &Settings) -> Result<()> {
        let names = name_regex()?;
        let mut errors = Vec::new();

        Self::validate_schema_version(settings, &mut errors);

        let mut retriever = settings.retriever.clone();
        retriever.apply_defaults();
        Self::validate_retriever_fields(&retriever, &names, &mut errors);

        let mut indexer = settings.indexer.clone();
        indexer.apply_defaults();
        Self::validate_indexer_fields(&indexer, &names, &mut errors);

        finish(errors)
    }

    /// Validate defaulted retriever settings plus the embedders on hand
    pub fn validate_retriever(
        settings: &RetrieverSettings,
        has_dense: bool,
        has_sparse: bool,
    ) -> Result<()> {
        let names = name_regex()?;
        let mut errors = Vec::new();

        Self::validate_retriever_fields(settings, &names, &mut errors);

        match &settings.search_mode {
            None => errors.push(ValidationError::new(
                "retriever.search_mode",
                "Search mode not provided",
            )),
            Some(mode) if !mode.satisfied_by(has_dense, has_sparse) => {
                errors.push(ValidationError::new(
                    "retriever.embedding",
                    format!(
                        "Embedding not provided; the {} search mode needs a query embedder. \
                         Provide one or use the scalar mode for metadata-only filtering",
                        mode.name()
                    ),
                ))
            }
            Some(_) => {}
        }

        finish(errors)
    }

    /// Validate defaulted indexer settings
    pub fn validate_indexer(settings: &IndexerSettings) -> Result<()> {
        let names = name_regex()?;
        let mut errors = Vec::new();
        Self::validate_indexer_fields(settings, &names, &mut errors);
        finish(errors)
    }

    fn validate_schema_version(settings: &Settings, errors: &mut Vec<ValidationError>) {
        let version = &settings.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_retriever_fields(
        settings: &RetrieverSettings,
        names: &Regex,
        errors: &mut Vec<ValidationError>,
    ) {
        check_name(names, "retriever.collection", &settings.collection, errors);
        check_name(names, "retriever.vector_field", &settings.vector_field, errors);

        for partition in &settings.partitions {
            check_name(names, "retriever.partitions", partition, errors);
        }

        for field in &settings.output_fields {
            // "*" selects every field
            if field != "*" {
                check_name(names, "retriever.output_fields", field, errors);
            }
        }

        if let Some(threshold) = settings.score_threshold {
            if !threshold.is_finite() {
                errors.push(ValidationError::new(
                    "retriever.score_threshold",
                    format!("Score threshold must be finite, got {}", threshold),
                ));
            }
        }

        if let Some(mode) = &settings.search_mode {
            Self::validate_search_mode(mode, names, errors);
        }
    }

    fn validate_search_mode(mode: &SearchMode, names: &Regex, errors: &mut Vec<ValidationError>) {
        match mode {
            SearchMode::Approximate(_) | SearchMode::Scalar(_) => {}
            SearchMode::Range(range) => {
                if !range.radius.is_finite() {
                    errors.push(ValidationError::new(
                        "retriever.search_mode.radius",
                        "Radius must be finite",
                    ));
                }
                if range.range_filter.is_some_and(|f| !f.is_finite()) {
                    errors.push(ValidationError::new(
                        "retriever.search_mode.range_filter",
                        "Range filter must be finite",
                    ));
                }
            }
            SearchMode::Iterator(iterator) => {
                if iterator.batch_size == 0 {
                    errors.push(ValidationError::new(
                        "retriever.search_mode.batch_size",
                        "Batch size must be greater than 0",
                    ));
                }
            }
            SearchMode::Hybrid(hybrid) => {
                if hybrid.sub_requests.is_empty() {
                    errors.push(ValidationError::new(
                        "retriever.search_mode.sub_requests",
                        "Hybrid search needs at least one sub-request",
                    ));
                }

                for sub in &hybrid.sub_requests {
                    if let Some(field) = &sub.vector_field {
                        check_name(names, "retriever.search_mode.sub_requests.vector_field", field, errors);
                    }
                }

                match &hybrid.reranker {
                    Reranker::Rrf { k } => {
                        if !k.is_finite() || *k <= 0.0 {
                            errors.push(ValidationError::new(
                                "retriever.search_mode.reranker.k",
                                format!("RRF k must be positive, got {}", k),
                            ));
                        }
                    }
                    Reranker::Weighted { weights, .. } => {
                        if weights.len() != hybrid.sub_requests.len() {
                            errors.push(ValidationError::new(
                                "retriever.search_mode.reranker.weights",
                                format!(
                                    "Weighted reranker needs one weight per sub-request: {} weights, {} sub-requests",
                                    weights.len(),
                                    hybrid.sub_requests.len()
                                ),
                            ));
                        }
                    }
                }
            }
        }
    }

    fn validate_indexer_fields(
        settings: &IndexerSettings,
        names: &Regex,
        errors: &mut Vec<ValidationError>,
    ) {
        check_name(names, "indexer.collection", &settings.collection, errors);

        if let Some(partition) = &settings.partition_name {
            check_name(names, "indexer.partition_name", partition, errors);
        }

        if !settings.vector_field.is_empty() {
            check_name(names, "indexer.vector_field", &settings.vector_field, errors);
        }

        if let Some(sparse) = &settings.sparse_vector_field {
            check_name(names, "indexer.sparse_vector_field", sparse, errors);
        }

        if settings.vector_field.is_empty() && settings.sparse_vector_field.is_none() {
            errors.push(ValidationError::new(
                "indexer.vector_field",
                "At least one vector field (dense or sparse) is required",
            ));
        }

        if let Some(index) = &settings.index {
            if let Err(message) = index.check() {
                errors.push(ValidationError::new("indexer.index", message));
            }
        }

        if let Some(index) = &settings.sparse_index {
            if let Err(message) = index.check() {
                errors.push(ValidationError::new("indexer.sparse_index", message));
            }
        }
    }
}

fn name_regex() -> Result<Regex> {
    Regex::new(NAME_PATTERN).map_err(|e| VecdockError::Config(format!("Invalid name pattern: {}", e)))
}

fn check_name(names: &Regex, path: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if !names.is_match(value) {
        errors.push(ValidationError::new(
            path,
            format!("Invalid name {:?}: must match {}", value, NAME_PATTERN),
        ));
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(VecdockError::ConfigValidation { errors })
    }
}
