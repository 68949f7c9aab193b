//! Text embeddings via a remote model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::openai::OpenAiClient;
use crate::error::EmbeddingError;

/// Produces a fixed-length vector for one piece of text. One remote call per
/// text; no caching, batching or retries.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Identifier of the model producing the vectors.
    fn model(&self) -> &str;
}

/// Request body for the /embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response from the /embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let request = EmbedRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response = self
            .client
            .post(self.endpoint("embeddings"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout
                } else if e.is_connect() {
                    EmbeddingError::ConnectionError(e.to_string())
                } else {
                    EmbeddingError::RequestError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ServerError(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty embedding response".to_string()))?;

        if let Some(expected) = self.dimension
            && embedding.len() != expected
        {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {expected} dimensions, got {}",
                embedding.len()
            )));
        }

        Ok(embedding)
    }

    fn model(&self) -> &str {
        &self.embedding_model
    }
}
