mod answer;
mod captioner;
mod chunker;
mod embedding;
mod extractor;
mod ingest;
pub mod llm;
mod openai;
mod rag;
mod vector_store;

pub use answer::{AnswerGenerator, FALLBACK_ANSWER, build_prompt};
pub use captioner::{CAPTION_PROMPT, Captioner, image_mime_type};
pub use chunker::TextChunker;
pub use embedding::Embedder;
pub use extractor::PdfExtractor;
pub use ingest::{DESCRIPTION_SUFFIX, IngestOptions, IngestPipeline, IngestStats, RAW_TEXT_SUFFIX};
pub use llm::{ChatMessage, ChatModel, ChatRequest};
pub use openai::OpenAiClient;
pub use rag::RagService;
pub use vector_store::{
    CollectionInfo, MilvusBackend, VectorStore, create_backend, fetch_text_or_empty, resolve_hits,
};
