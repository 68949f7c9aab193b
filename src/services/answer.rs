//! Grounded answer generation.

use std::sync::Arc;

use super::llm::{ChatMessage, ChatModel, ChatRequest};
use crate::error::ChatError;
use crate::models::{ContextRecord, OpenAiConfig};

/// Returned in place of an answer when the chat model cannot be reached.
pub const FALLBACK_ANSWER: &str = "I am sorry, I couldn't generate a response.";

/// Build the grounding prompt. Each context text is followed by a newline, in
/// the order given.
pub fn build_prompt(context: &[ContextRecord], query: &str) -> String {
    let mut block = String::new();
    for record in context {
        block.push_str(&record.text);
        block.push('\n');
    }
    format!("Answer based on the following text only:\n{block}\nnow: {query}")
}

/// Asks a chat model to answer only from retrieved context.
#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
    model_id: String,
    max_tokens: u32,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>, config: &OpenAiConfig) -> Self {
        Self {
            model,
            model_id: config.chat_model.clone(),
            max_tokens: config.answer_max_tokens,
        }
    }

    /// Single-turn completion of the grounding prompt, stripped.
    pub async fn generate(
        &self,
        context: &[ContextRecord],
        query: &str,
    ) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: self.model_id.clone(),
            messages: vec![ChatMessage::user(build_prompt(context, query))],
            max_tokens: self.max_tokens,
        };

        let answer = self.model.complete(&request).await?;
        Ok(answer.trim().to_string())
    }

    /// Like [`generate`](Self::generate), but any failure yields
    /// [`FALLBACK_ANSWER`].
    pub async fn generate_or_fallback(&self, context: &[ContextRecord], query: &str) -> String {
        match self.generate(context, query).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "answer generation failed, using fallback");
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}
