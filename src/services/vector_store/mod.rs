//! Vector store abstraction layer.
//!
//! The pipeline talks to the store through the [`VectorStore`] trait so that the
//! remote collection can be replaced in tests. [`MilvusBackend`] is the only
//! production backend.

mod milvus;

pub use milvus::MilvusBackend;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::VectorStoreError;
use crate::models::{ContextRecord, EmbeddingRecord, EntityId, SearchHit, VectorStoreConfig};

/// Collection information
#[derive(Debug, Clone)]
pub struct CollectionInfo {
    pub row_count: u64,
}

/// Operations against a remote collection identified by a fixed name.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Check if the vector store is reachable.
    async fn health_check(&self) -> Result<bool, VectorStoreError>;

    /// Get information about the collection.
    /// Returns None if the collection doesn't exist.
    async fn get_collection_info(&self) -> Result<Option<CollectionInfo>, VectorStoreError>;

    /// Create the collection if it doesn't exist.
    async fn create_collection(&self) -> Result<(), VectorStoreError>;

    /// Append one record. The store assigns its id.
    async fn insert(&self, record: EmbeddingRecord) -> Result<(), VectorStoreError>;

    /// Nearest neighbours of `query_vector` by cosine similarity, in the
    /// order the store returns them.
    async fn search(
        &self,
        query_vector: Vec<f32>,
        top_n: u32,
    ) -> Result<Vec<SearchHit>, VectorStoreError>;

    /// Point lookup of the `text` field. `Ok(None)` when no entity matches.
    async fn fetch_text_by_id(&self, id: &EntityId) -> Result<Option<String>, VectorStoreError>;

    /// Get the collection name.
    fn collection(&self) -> &str;
}

/// Create the configured vector store backend.
pub fn create_backend(
    config: &VectorStoreConfig,
) -> Result<Arc<dyn VectorStore>, VectorStoreError> {
    Ok(Arc::new(MilvusBackend::new(config)?))
}

/// Fetch a record's text, degrading to an empty string when the record is
/// missing or the lookup fails.
pub async fn fetch_text_or_empty(store: &dyn VectorStore, id: &EntityId) -> String {
    match store.fetch_text_by_id(id).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            tracing::debug!(%id, "no entity found for id");
            String::new()
        }
        Err(e) => {
            tracing::warn!(%id, error = %e, "failed to fetch text by id");
            String::new()
        }
    }
}

/// Turn search hits into context records, fetching each hit's full text by id
/// one after another and flattening newlines. Search order is preserved.
pub async fn resolve_hits(store: &dyn VectorStore, hits: &[SearchHit]) -> Vec<ContextRecord> {
    let mut records = Vec::with_capacity(hits.len());
    for hit in hits {
        let text = fetch_text_or_empty(store, &hit.id).await;
        records.push(ContextRecord::new(hit, &text));
    }
    records
}
