use anyhow::Result;
use clap::Parser;

use pdf_rag::cli::commands::{
    handle_ask, handle_config, handle_ingest, handle_search, handle_serve, handle_status,
};
use pdf_rag::cli::output::get_formatter;
use pdf_rag::cli::{Cli, Commands};
use pdf_rag::logging;
use pdf_rag::models::{Config, OutputFormat};
use pdf_rag::server::shutdown_signal;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let (config, load_error) = Config::load_or_default(cli.config.as_deref());
    logging::init_with_config(&config.logging, cli.verbose);
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "failed to load configuration, using defaults");
    }

    let format = cli.format;
    let verbose = cli.verbose;

    // The server drains in-flight requests on its own shutdown signal.
    let result = if matches!(cli.command, Commands::Serve(_)) {
        run_command(cli.command, &config, cli.config.as_deref(), format, verbose).await
    } else {
        tokio::select! {
            result = run_command(cli.command, &config, cli.config.as_deref(), format, verbose) => result,
            _ = shutdown_signal() => {
                eprintln!("\nReceived shutdown signal, cleaning up...");
                tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}", get_formatter(format).format_error(&format!("{e:#}")).trim_end());
        std::process::exit(1);
    }
}

async fn run_command(
    command: Commands,
    config: &Config,
    config_path: Option<&std::path::Path>,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    match command {
        Commands::Ingest(args) => {
            handle_ingest(args, config, format, verbose).await?;
        }
        Commands::Ask(args) => {
            handle_ask(args, config, format, verbose).await?;
        }
        Commands::Search(args) => {
            handle_search(args, config, format, verbose).await?;
        }
        Commands::Status => {
            handle_status(config, format, verbose).await?;
        }
        Commands::Config(cmd) => {
            handle_config(cmd, config, config_path, format).await?;
        }
        Commands::Serve(args) => {
            handle_serve(args, config).await?;
        }
    }

    Ok(())
}
