use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::openai_client;
use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat, PathsConfig};
use crate::services::{Captioner, IngestOptions, IngestPipeline, create_backend};
use crate::utils::file::list_files;

#[derive(Debug, Args)]
pub struct IngestArgs {
    #[arg(long, help = "Folder of PDFs to extract (overrides paths.input)")]
    pub input: Option<PathBuf>,

    #[arg(long, help = "Folder for extracted text and captions (overrides paths.output)")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Folder for extracted images (overrides paths.images)")]
    pub images: Option<PathBuf>,

    #[arg(long, help = "Skip PDF text and image extraction")]
    pub skip_extract: bool,

    #[arg(long, help = "Skip image captioning")]
    pub skip_captions: bool,

    #[arg(long, help = "Skip chunking, embedding and inserting text files")]
    pub skip_embed: bool,

    #[arg(long, help = "List the documents that would be extracted")]
    pub dry_run: bool,
}

impl IngestArgs {
    fn paths(&self, config: &Config) -> PathsConfig {
        let mut paths = config.paths.clone();
        if let Some(input) = &self.input {
            paths.input = input.clone();
        }
        if let Some(output) = &self.output {
            paths.output = output.clone();
        }
        if let Some(images) = &self.images {
            paths.images = images.clone();
        }
        paths
    }
}

pub async fn handle_ingest(
    args: IngestArgs,
    config: &Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let formatter = get_formatter(format);
    let paths = args.paths(config);

    if args.dry_run {
        let documents = list_files(&paths.input, Some("pdf"))
            .with_context(|| format!("failed to read {}", paths.input.display()))?;
        print!("{}", formatter.format_dry_run(&documents));
        return Ok(());
    }

    if verbose {
        eprintln!("Input:  {}", paths.input.display());
        eprintln!("Output: {}", paths.output.display());
        eprintln!("Images: {}", paths.images.display());
    }

    let openai = openai_client(config)?;
    let store = create_backend(&config.vector_store).context("failed to create vector store")?;
    let captioner = Captioner::new(openai.clone(), &config.openai);
    let pipeline = IngestPipeline::new(paths, captioner, openai, store);

    let options = IngestOptions {
        skip_extract: args.skip_extract,
        skip_captions: args.skip_captions,
        skip_embed: args.skip_embed,
        show_progress: format == OutputFormat::Text,
    };
    let stats = pipeline.run(&options).await.context("ingestion failed")?;

    print!("{}", formatter.format_ingest_stats(&stats));
    Ok(())
}
