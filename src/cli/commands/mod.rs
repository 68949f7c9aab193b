mod ask;
mod config;
mod ingest;
mod search;
mod serve;
mod status;

pub use ask::AskArgs;
pub use config::ConfigCommand;
pub use ingest::IngestArgs;
pub use search::SearchArgs;
pub use serve::ServeArgs;

pub use ask::handle_ask;
pub use config::handle_config;
pub use ingest::handle_ingest;
pub use search::handle_search;
pub use serve::handle_serve;
pub use status::handle_status;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::Config;
use crate::services::{AnswerGenerator, OpenAiClient, RagService, create_backend};

fn openai_client(config: &Config) -> Result<Arc<OpenAiClient>> {
    let client = OpenAiClient::new(&config.openai, Some(config.vector_store.dimension))
        .context("failed to create OpenAI client")?;
    Ok(Arc::new(client))
}

/// Wire the query pipeline from configuration.
fn rag_service(config: &Config, top_n: u32) -> Result<RagService> {
    let openai = openai_client(config)?;
    let store = create_backend(&config.vector_store).context("failed to create vector store")?;
    let generator = AnswerGenerator::new(openai.clone(), &config.openai);
    Ok(RagService::new(openai, store, generator, top_n))
}
