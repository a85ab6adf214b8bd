//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vecdock",
    version,
    about = "Retrieval and indexing adapter for external vector engines",
    long_about = "vecdock builds search, hybrid-search, query and iterator requests for an external \
                  vector engine from a retriever configuration. The CLI manages that configuration \
                  and shows the request a query would produce."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/vecdock/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print the engine request the configured search mode builds for a query
    Plan {
        /// Query text (a filter expression for the scalar mode)
        query: String,

        /// Dense query vector, comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        vector: Vec<f32>,

        /// Sparse query vector as index:weight pairs, comma separated
        #[arg(long, value_delimiter = ',', value_parser = parse_sparse_entry)]
        sparse: Vec<(i64, f64)>,

        /// Override the configured top-K
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Additional filter expression
        #[arg(short, long)]
        filter: Option<String>,

        /// Override the vector field
        #[arg(long)]
        vector_field: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_sparse_entry(entry: &str) -> Result<(i64, f64), String> {
    let (index, weight) = entry
        .split_once(':')
        .ok_or_else(|| format!("expected index:weight, got {:?}", entry))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("bad sparse index {:?}: {}", index, e))?;
    let weight = weight
        .trim()
        .parse()
        .map_err(|e| format!("bad sparse weight {:?}: {}", weight, e))?;
    Ok((index, weight))
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
