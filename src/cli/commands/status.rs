use anyhow::Result;

use crate::cli::output::{StatusInfo, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::create_backend;

pub async fn handle_status(config: &Config, format: OutputFormat, _verbose: bool) -> Result<()> {
    let formatter = get_formatter(format);

    let (vector_store_connected, row_count) = match create_backend(&config.vector_store) {
        Ok(store) => {
            let connected = store.health_check().await.unwrap_or(false);
            let rows = if connected {
                store
                    .get_collection_info()
                    .await
                    .ok()
                    .flatten()
                    .map(|info| info.row_count)
            } else {
                None
            };
            (connected, rows)
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to create vector store client");
            (false, None)
        }
    };

    let status = StatusInfo {
        vector_store_url: config.vector_store.uri.clone(),
        vector_store_connected,
        collection: config.vector_store.collection.clone(),
        row_count,
        embedding_model: config.openai.embedding_model.clone(),
        chat_model: config.openai.chat_model.clone(),
        vision_model: config.openai.vision_model.clone(),
    };

    print!("{}", formatter.format_status(&status));

    if !vector_store_connected {
        eprintln!();
        eprintln!("Warning: Milvus not reachable. Check MILVUS_URI and MILVUS_API_KEY.");
    }
    if config.openai.api_key.is_none() {
        eprintln!("Warning: OPENAI_API_KEY is not set. Ingestion and queries will fail.");
    }

    Ok(())
}
