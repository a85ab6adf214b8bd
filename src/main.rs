use std::collections::HashMap;
use std::path::PathBuf;
use vecdock::cli::{Cli, Commands, ConfigAction};
use vecdock::config::{SearchTarget, Settings};
use vecdock::error::{Result, VecdockError};
use vecdock::retriever::{ApproximateSearch, CallOptions, QueryVectors};
use vecdock::types::MetricType;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
        Commands::Plan {
            query,
            vector,
            sparse,
            top_k,
            filter,
            vector_field,
        } => {
            let options = CallOptions {
                top_k,
                filter,
                vector_field,
                ..Default::default()
            };
            cmd_plan(cli.config, &query, vector, sparse, &options)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "vecdock=debug" } else { "vecdock=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn resolve_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => Settings::default_path(),
    }
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load(&resolve_path(config_path)?)?;
            let text = toml::to_string_pretty(&settings)?;
            println!("{}", text);
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(file) => file,
                None => resolve_path(config_path)?,
            };
            let settings = Settings::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", settings.meta.schema_version);
            match &settings.retriever.search_mode {
                Some(mode) => println!("  Search mode: {}", mode.name()),
                None => println!("  Search mode: not set"),
            }
        }
        ConfigAction::Init { force } => {
            let path = resolve_path(config_path)?;

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            let mut settings = Settings::default();
            settings.retriever.search_mode = Some(ApproximateSearch::new(MetricType::L2).into());
            settings.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn cmd_plan(
    config_path: Option<PathBuf>,
    query: &str,
    vector: Vec<f32>,
    sparse: Vec<(i64, f64)>,
    options: &CallOptions,
) -> Result<()> {
    let settings = Settings::load(&resolve_path(config_path)?)?;

    let mode = settings.retriever.search_mode.as_ref().ok_or_else(|| {
        VecdockError::Config("retriever.search_mode is not set".to_string())
    })?;
    let target = SearchTarget::from_settings(&settings.retriever);

    let vectors = QueryVectors {
        dense: Some(vector).filter(|v| !v.is_empty()),
        sparse: Some(sparse.into_iter().collect::<HashMap<_, _>>()).filter(|s| !s.is_empty()),
    };

    tracing::debug!("Planning {} search on {}", mode.name(), target.collection);
    let request = mode.plan(&target, query, vectors, options)?;

    let json = serde_json::to_string_pretty(&request).map_err(|e| VecdockError::Json {
        source: e,
        context: "Failed to serialize request".to_string(),
    })?;
    println!("{}", json);

    Ok(())
}
