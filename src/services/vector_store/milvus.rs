//! Milvus / Zilliz Cloud backend over the REST v2 API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{CollectionInfo, VectorStore};
use crate::error::VectorStoreError;
use crate::models::{EmbeddingRecord, EntityId, SearchHit, VectorStoreConfig};

const INSERT_PATH: &str = "v2/vectordb/entities/insert";
const SEARCH_PATH: &str = "v2/vectordb/entities/search";
const QUERY_PATH: &str = "v2/vectordb/entities/query";
const HAS_COLLECTION_PATH: &str = "v2/vectordb/collections/has";
const CREATE_COLLECTION_PATH: &str = "v2/vectordb/collections/create";
const COLLECTION_STATS_PATH: &str = "v2/vectordb/collections/get_stats";
const ALLOW_INT64_HEADER: &str = "accept-type-allow-int64";
const LIST_COLLECTIONS_PATH: &str = "v2/vectordb/collections/list";

/// Envelope shared by every Milvus REST response.
#[derive(Debug, Deserialize)]
struct MilvusResponse<T> {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

/// Search results arrive either as a bare hit list or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchData {
    Hits(Vec<SearchHit>),
    Wrapped { search_results: Vec<SearchHit> },
}

/// Query rows arrive either as a bare list or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QueryData {
    Rows(Vec<TextRow>),
    Wrapped { entities: Vec<TextRow> },
}

#[derive(Debug, Deserialize)]
struct TextRow {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HasData {
    has: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsData {
    #[serde(default)]
    row_count: u64,
}

/// Milvus vector store backend.
pub struct MilvusBackend {
    client: Client,
    base_url: String,
    collection: String,
    dimension: u32,
}

impl MilvusBackend {
    /// Create a new Milvus backend from configuration.
    pub fn new(config: &VectorStoreConfig) -> Result<Self, VectorStoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ALLOW_INT64_HEADER, HeaderValue::from_static("true"));

        if let Some(api_key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
                .map_err(|_| VectorStoreError::ClientError("invalid Milvus API key".to_string()))?;
            headers.insert(AUTHORIZATION, auth);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .default_headers(headers)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: normalize_uri(&config.uri),
            collection: config.collection.clone(),
            dimension: config.dimension,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
        err: fn(String) -> VectorStoreError,
    ) -> Result<Option<T>, VectorStoreError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                VectorStoreError::ConnectionError(e.to_string())
            } else {
                err(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(err(format!("status {}: {}", status, body)));
        }

        let envelope: MilvusResponse<T> = response
            .json()
            .await
            .map_err(|e| VectorStoreError::ClientError(e.to_string()))?;

        // Older deployments report success as 200 instead of 0.
        if envelope.code != 0 && envelope.code != 200 {
            return Err(VectorStoreError::ServerError {
                code: envelope.code,
                message: envelope.message.unwrap_or_default(),
            });
        }

        Ok(envelope.data)
    }
}

/// Accept bare hosts (`host.zillizcloud.com`) as well as full URLs.
fn normalize_uri(uri: &str) -> String {
    let uri = uri.trim().trim_end_matches('/');
    if uri.contains("://") {
        uri.to_string()
    } else {
        format!("https://{uri}")
    }
}

#[async_trait]
impl VectorStore for MilvusBackend {
    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        self.call::<Value>(LIST_COLLECTIONS_PATH, json!({}), VectorStoreError::ConnectionError)
            .await
            .map(|_| true)
    }

    async fn get_collection_info(&self) -> Result<Option<CollectionInfo>, VectorStoreError> {
        let has: Option<HasData> = self
            .call(
                HAS_COLLECTION_PATH,
                json!({ "collectionName": self.collection }),
                VectorStoreError::CollectionError,
            )
            .await?;

        if !has.is_some_and(|h| h.has) {
            return Ok(None);
        }

        let stats: Option<StatsData> = self
            .call(
                COLLECTION_STATS_PATH,
                json!({ "collectionName": self.collection }),
                VectorStoreError::CollectionError,
            )
            .await?;

        Ok(Some(CollectionInfo {
            row_count: stats.map_or(0, |s| s.row_count),
        }))
    }

    async fn create_collection(&self) -> Result<(), VectorStoreError> {
        if self.get_collection_info().await?.is_some() {
            return Ok(());
        }

        self.call::<Value>(
            CREATE_COLLECTION_PATH,
            json!({
                "collectionName": self.collection,
                "dimension": self.dimension,
                "metricType": "COSINE",
                "idType": "Int64",
                "autoID": true,
                "primaryFieldName": "id",
                "vectorFieldName": "vector",
            }),
            VectorStoreError::CollectionError,
        )
        .await?;

        tracing::info!(collection = %self.collection, dimension = self.dimension, "created collection");
        Ok(())
    }

    async fn insert(&self, record: EmbeddingRecord) -> Result<(), VectorStoreError> {
        let path = record.path.clone();
        let data: Option<Value> = self
            .call(
                INSERT_PATH,
                json!({
                    "collectionName": self.collection,
                    "data": [{
                        "vector": record.vector,
                        "text": record.text,
                        "path": record.path,
                    }],
                }),
                VectorStoreError::InsertError,
            )
            .await?;

        tracing::debug!(%path, response = ?data, "inserted record");
        Ok(())
    }

    async fn search(
        &self,
        query_vector: Vec<f32>,
        top_n: u32,
    ) -> Result<Vec<SearchHit>, VectorStoreError> {
        let data: Option<SearchData> = self
            .call(
                SEARCH_PATH,
                json!({
                    "collectionName": self.collection,
                    "data": [query_vector],
                    "annsField": "vector",
                    "limit": top_n,
                    "outputFields": ["id", "text", "path"],
                    "searchParams": { "metricType": "COSINE" },
                }),
                VectorStoreError::SearchError,
            )
            .await?;

        Ok(match data {
            Some(SearchData::Hits(hits)) => hits,
            Some(SearchData::Wrapped { search_results }) => search_results,
            None => Vec::new(),
        })
    }

    async fn fetch_text_by_id(&self, id: &EntityId) -> Result<Option<String>, VectorStoreError> {
        let data: Option<QueryData> = self
            .call(
                QUERY_PATH,
                json!({
                    "collectionName": self.collection,
                    "filter": format!("id in [{}]", id.filter_literal()),
                    "outputFields": ["text"],
                }),
                VectorStoreError::QueryError,
            )
            .await?;

        let rows = match data {
            Some(QueryData::Rows(rows)) => rows,
            Some(QueryData::Wrapped { entities }) => entities,
            None => Vec::new(),
        };

        Ok(rows.into_iter().next().map(|row| row.text.unwrap_or_default()))
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}
