use anyhow::{Context, Result};
use clap::Args;

use super::rag_service;
use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat};

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(required = true, help = "Search query text")]
    pub query: String,

    #[arg(long, short = 'n', help = "Maximum number of results to return")]
    pub limit: Option<u32>,
}

pub async fn handle_search(
    args: SearchArgs,
    config: &Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let query = args.query.trim();
    if query.is_empty() {
        anyhow::bail!("search query cannot be empty");
    }

    let limit = args.limit.unwrap_or(config.vector_store.top_n);
    if limit == 0 {
        anyhow::bail!("limit must be at least 1");
    }

    if verbose {
        eprintln!("Query: \"{query}\"");
        eprintln!("  Limit: {limit}");
        eprintln!("  Collection: {}", config.vector_store.collection);
    }

    let formatter = get_formatter(format);
    let rag = rag_service(config, limit)?;
    let results = rag
        .search(query, limit)
        .await
        .context("failed to generate query embedding")?;

    print!("{}", formatter.format_search_results(&results));
    Ok(())
}
