mod config;
mod document;
mod search;

pub use config::{
    Config, DEFAULT_BIND, DEFAULT_CHAT_MODEL, DEFAULT_COLLECTION, DEFAULT_EMBEDDING_DIMENSION,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_MILVUS_URI, DEFAULT_OPENAI_BASE_URL, DEFAULT_VISION_MODEL,
    LoggingConfig, OpenAiConfig, PathsConfig, ServerConfig, VectorStoreConfig,
};
pub use document::{EmbeddingRecord, ExtractedDocument, ExtractedImage, TextChunk};
pub use search::{ContextRecord, EntityId, OutputFormat, RagAnswer, SearchHit, SearchResults};
