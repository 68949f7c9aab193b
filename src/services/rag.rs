//! Query pipeline: embed, search, fetch text per hit, answer.

use std::sync::Arc;
use std::time::Instant;

use super::answer::AnswerGenerator;
use super::embedding::Embedder;
use super::vector_store::{VectorStore, resolve_hits};
use crate::error::QueryError;
use crate::models::{ContextRecord, RagAnswer, SearchResults};

/// Composes the embedder, the vector store and the answer generator. Holds no
/// mutable state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct RagService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    generator: AnswerGenerator,
    top_n: u32,
}

impl RagService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: AnswerGenerator,
        top_n: u32,
    ) -> Self {
        Self {
            embedder,
            store,
            generator,
            top_n,
        }
    }

    /// Context records for `query` in search order.
    ///
    /// An embedding failure is returned to the caller. A failed search yields
    /// no records and a failed lookup yields an empty text.
    pub async fn retrieve(
        &self,
        query: &str,
        top_n: u32,
    ) -> Result<Vec<ContextRecord>, QueryError> {
        if query.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let vector = self.embedder.embed(query).await?;

        let hits = match self.store.search(vector, top_n).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "search failed, continuing without context");
                Vec::new()
            }
        };
        tracing::debug!(hits = hits.len(), "search returned");

        Ok(resolve_hits(self.store.as_ref(), &hits).await)
    }

    /// Retrieve context and answer from it.
    pub async fn answer(&self, query: &str) -> Result<RagAnswer, QueryError> {
        let start_time = Instant::now();

        let context = self.retrieve(query, self.top_n).await?;
        let response = self.generator.generate_or_fallback(&context, query).await;

        Ok(RagAnswer {
            query: query.to_string(),
            response,
            context,
            duration_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Retrieval only, no generation.
    pub async fn search(&self, query: &str, top_n: u32) -> Result<SearchResults, QueryError> {
        let start_time = Instant::now();
        let results = self.retrieve(query, top_n).await?;
        Ok(SearchResults::new(
            query.to_string(),
            results,
            start_time.elapsed().as_millis() as u64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmbeddingRecord, OpenAiConfig};
    use crate::services::FALLBACK_ANSWER;
    use crate::services::llm::MessageContent;
    use crate::testing::{FakeChat, FakeEmbedder, InMemoryStore};

    async fn seed(store: &InMemoryStore, embedder: &FakeEmbedder, texts: &[&str]) {
        for text in texts {
            store
                .insert(EmbeddingRecord {
                    vector: embedder.embed(text).await.unwrap(),
                    text: text.to_string(),
                    path: "guide_raw.txt".to_string(),
                })
                .await
                .unwrap();
        }
    }

    fn service(
        embedder: Arc<FakeEmbedder>,
        store: Arc<InMemoryStore>,
        chat: Arc<FakeChat>,
        top_n: u32,
    ) -> RagService {
        let generator = AnswerGenerator::new(chat, &OpenAiConfig::default());
        RagService::new(embedder, store, generator, top_n)
    }

    #[tokio::test]
    async fn test_answer_uses_fetched_context_in_search_order() {
        let embedder = Arc::new(FakeEmbedder::new());
        let store = Arc::new(InMemoryStore::new());
        seed(
            &store,
            &embedder,
            &["The tower is in Paris.", "Bananas are yellow.", "Paris\nhas the tower."],
        )
        .await;

        let chat = Arc::new(FakeChat::replying(" In Paris. "));
        let rag = service(embedder, store.clone(), chat.clone(), 2);

        let answer = rag.answer("Where is the tower in Paris?").await.unwrap();
        assert_eq!(answer.response, "In Paris.");
        assert_eq!(answer.context.len(), 2);
        assert!(answer.context[0].distance >= answer.context[1].distance);
        assert!(answer.context.iter().all(|c| !c.text.contains('\n')));
        assert!(answer.context.iter().all(|c| c.text.contains("tower")));

        // One point lookup per hit.
        assert_eq!(store.fetch_calls(), 2);

        let requests = chat.requests();
        let MessageContent::Text(prompt) = &requests[0].messages[0].content else {
            panic!("expected a text prompt");
        };
        let first = prompt.find(&answer.context[0].text).unwrap();
        let second = prompt.find(&answer.context[1].text).unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_answer_without_stored_content() {
        let rag = service(
            Arc::new(FakeEmbedder::new()),
            Arc::new(InMemoryStore::new()),
            Arc::new(FakeChat::replying("I don't know.")),
            6,
        );
        let answer = rag.answer("x").await.unwrap();
        assert_eq!(answer.response, "I don't know.");
        assert!(answer.context.is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_degrades_to_no_context() {
        let rag = service(
            Arc::new(FakeEmbedder::new()),
            Arc::new(InMemoryStore::new().failing()),
            Arc::new(FakeChat::replying("Generic answer.")),
            6,
        );
        let answer = rag.answer("anything").await.unwrap();
        assert!(answer.context.is_empty());
        assert_eq!(answer.response, "Generic answer.");
    }

    #[tokio::test]
    async fn test_chat_failure_returns_fallback() {
        let rag = service(
            Arc::new(FakeEmbedder::new()),
            Arc::new(InMemoryStore::new()),
            Arc::new(FakeChat::failing()),
            6,
        );
        let answer = rag.answer("anything").await.unwrap();
        assert_eq!(answer.response, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let rag = service(
            Arc::new(FakeEmbedder::failing_on("boom")),
            Arc::new(InMemoryStore::new()),
            Arc::new(FakeChat::replying("unused")),
            6,
        );
        let result = rag.answer("boom").await;
        assert!(matches!(result, Err(QueryError::EmbeddingError(_))));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let embedder = Arc::new(FakeEmbedder::new());
        let rag = service(
            embedder.clone(),
            Arc::new(InMemoryStore::new()),
            Arc::new(FakeChat::replying("unused")),
            6,
        );
        assert!(matches!(rag.answer("   ").await, Err(QueryError::EmptyQuery)));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let embedder = Arc::new(FakeEmbedder::new());
        let store = Arc::new(InMemoryStore::new());
        seed(&store, &embedder, &["One apple.", "Two apples.", "Three apples."]).await;

        let chat = Arc::new(FakeChat::replying("unused"));
        let rag = service(embedder, store, chat.clone(), 6);

        let results = rag.search("apples", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.query, "apples");
        assert!(chat.requests().is_empty());
    }
}
