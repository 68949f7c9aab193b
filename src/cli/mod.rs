//! CLI module for the PDF RAG pipeline.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Extract PDFs into a Milvus collection and answer questions from it.
#[derive(Debug, Parser)]
#[command(name = "pdfrag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(
        long,
        short = 'f',
        global = true,
        default_value_t = OutputFormat::Text,
        help = "Output format: text or json"
    )]
    pub format: OutputFormat,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        short = 'c',
        global = true,
        env = "PDF_RAG_CONFIG",
        help = "Path to config file"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract PDFs, caption images and store sentence embeddings
    Ingest(commands::IngestArgs),

    /// Answer a question from the stored documents
    Ask(commands::AskArgs),

    /// Show the stored sentences closest to a query
    Search(commands::SearchArgs),

    /// Serve the query endpoint over HTTP
    Serve(commands::ServeArgs),

    /// Check vector store reachability and collection size
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
