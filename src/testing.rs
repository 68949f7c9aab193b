//! In-memory doubles for the embedder, chat model and vector store, plus a
//! helper that serves an axum router on an ephemeral port.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{ChatError, EmbeddingError, VectorStoreError};
use crate::models::{EmbeddingRecord, EntityId, SearchHit};
use crate::services::{ChatModel, ChatRequest, CollectionInfo, Embedder, VectorStore};

/// Serve `app` on 127.0.0.1 and return its base URL.
pub async fn spawn_mock(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Bag-of-words embedder: each lowercase word is hashed into a bucket.
pub struct FakeEmbedder {
    dimension: usize,
    fail_on: Option<String>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: 32,
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail for any text containing `needle`.
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(needle) = &self.fail_on
            && text.contains(needle.as_str())
        {
            return Err(EmbeddingError::ServerError("status 500: boom".to_string()));
        }

        let mut vector = vec![0.0; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() as usize) % self.dimension] += 1.0;
        }
        Ok(vector)
    }

    fn model(&self) -> &str {
        "fake-embedding"
    }
}

/// Chat model returning a canned reply, or failing when none is set.
pub struct FakeChat {
    reply: Option<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeChat {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for FakeChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply
            .clone()
            .ok_or_else(|| ChatError::ServerError("status 503: unavailable".to_string()))
    }
}

/// Vector store keeping records in memory. Ids start at 1.
pub struct InMemoryStore {
    records: Mutex<Vec<(i64, EmbeddingRecord)>>,
    fetch_calls: AtomicUsize,
    failing: bool,
    reject_insert: Option<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fetch_calls: AtomicUsize::new(0),
            failing: false,
            reject_insert: None,
        }
    }

    /// Every operation fails.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Inserts of records whose text contains `needle` fail.
    pub fn rejecting_inserts(mut self, needle: &str) -> Self {
        self.reject_insert = Some(needle.to_string());
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<EmbeddingRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    fn check(&self) -> Result<(), VectorStoreError> {
        if self.failing {
            Err(VectorStoreError::ConnectionError("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        self.check().map(|_| true)
    }

    async fn get_collection_info(&self) -> Result<Option<CollectionInfo>, VectorStoreError> {
        self.check()?;
        Ok(Some(CollectionInfo {
            row_count: self.records.lock().unwrap().len() as u64,
        }))
    }

    async fn create_collection(&self) -> Result<(), VectorStoreError> {
        self.check()
    }

    async fn insert(&self, record: EmbeddingRecord) -> Result<(), VectorStoreError> {
        self.check()?;
        if let Some(needle) = &self.reject_insert
            && record.text.contains(needle.as_str())
        {
            return Err(VectorStoreError::InsertError("insert rejected".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let id = records.len() as i64 + 1;
        records.push((id, record));
        Ok(())
    }

    async fn search(
        &self,
        query_vector: Vec<f32>,
        top_n: u32,
    ) -> Result<Vec<SearchHit>, VectorStoreError> {
        self.check()?;
        let records = self.records.lock().unwrap();
        let mut hits: Vec<SearchHit> = records
            .iter()
            .map(|(id, record)| SearchHit {
                id: EntityId::Int(*id),
                distance: cosine_similarity(&query_vector, &record.vector),
                text: None,
                path: None,
            })
            .collect();
        hits.sort_by(|a, b| b.distance.total_cmp(&a.distance));
        hits.truncate(top_n as usize);
        Ok(hits)
    }

    async fn fetch_text_by_id(&self, id: &EntityId) -> Result<Option<String>, VectorStoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .find(|(row_id, _)| EntityId::Int(*row_id) == *id)
            .map(|(_, record)| record.text.clone()))
    }

    fn collection(&self) -> &str {
        "in_memory"
    }
}
