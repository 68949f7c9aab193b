use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::cli::output::{Formatter, get_formatter};
use crate::models::{Config, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Write a default configuration file")]
    Init {
        #[arg(long, help = "Force overwrite existing config")]
        force: bool,
    },
    #[command(about = "Show current configuration with secrets masked")]
    Show,
    #[command(about = "Show configuration file path")]
    Path,
}

pub async fn handle_config(
    cmd: ConfigCommand,
    config: &Config,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let formatter = get_formatter(format);

    match cmd {
        ConfigCommand::Init { force } => handle_init(config_path, force, formatter.as_ref()),
        ConfigCommand::Show => handle_show(config, format),
        ConfigCommand::Path => handle_path(config_path, formatter.as_ref()),
    }
}

fn handle_init(config_path: Option<&Path>, force: bool, formatter: &dyn Formatter) -> Result<()> {
    let path = Config::resolve_path(config_path)?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    Config::default()
        .save(&path)
        .context("failed to write config")?;
    println!(
        "{}",
        formatter.format_message(&format!("Created config at: {}", path.display()))
    );
    Ok(())
}

fn handle_show(config: &Config, format: OutputFormat) -> Result<()> {
    let masked = masked(config);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&masked)?);
    } else {
        print!("{}", toml::to_string_pretty(&masked)?);
    }
    Ok(())
}

fn handle_path(config_path: Option<&Path>, formatter: &dyn Formatter) -> Result<()> {
    let path = Config::resolve_path(config_path)?;
    let state = if path.exists() { "active" } else { "would be" };
    println!(
        "{}",
        formatter.format_message(&format!("Config ({state}): {}", path.display()))
    );
    Ok(())
}

/// Copy of `config` with API keys masked.
fn masked(config: &Config) -> Config {
    let mut masked = config.clone();
    masked.openai.api_key = masked.openai.api_key.as_deref().map(mask_secret);
    masked.vector_store.api_key = masked.vector_store.api_key.as_deref().map(mask_secret);
    masked
}

/// Keep the last four characters of long secrets, hide short ones entirely.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "********".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("********{tail}")
}
