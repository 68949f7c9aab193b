use anyhow::{Context, Result};
use clap::Args;

use super::rag_service;
use crate::models::Config;
use crate::server::{run_server, shutdown_signal};

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, short = 'b', help = "Address to bind (host:port)")]
    pub bind: Option<String>,
}

pub async fn handle_serve(args: ServeArgs, config: &Config) -> Result<()> {
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let rag = rag_service(config, config.vector_store.top_n)?;

    eprintln!("Serving POST /generate on http://{bind}");
    run_server(rag, &bind, shutdown_signal())
        .await
        .with_context(|| format!("server on {bind} failed"))
}
