use anyhow::{Context, Result};
use clap::Args;

use super::rag_service;
use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat};

#[derive(Debug, Args)]
pub struct AskArgs {
    #[arg(required = true, help = "Question to answer from the stored documents")]
    pub query: String,

    #[arg(long, short = 'n', help = "Number of context records to retrieve")]
    pub limit: Option<u32>,
}

pub async fn handle_ask(
    args: AskArgs,
    config: &Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let query = args.query.trim();
    if query.is_empty() {
        anyhow::bail!("query cannot be empty");
    }

    let limit = args.limit.unwrap_or(config.vector_store.top_n);
    if limit == 0 {
        anyhow::bail!("limit must be at least 1");
    }

    let formatter = get_formatter(format);
    let rag = rag_service(config, limit)?;

    let answer = rag.answer(query).await.context("failed to answer query")?;

    if verbose {
        for (i, record) in answer.context.iter().enumerate() {
            eprintln!("[{}] {:.3} {}", i + 1, record.distance, record.text);
        }
        eprintln!();
    }

    print!("{}", formatter.format_answer(&answer));
    Ok(())
}
