//! Error types for the PDF RAG pipeline.

use thiserror::Error;

/// Errors related to PDF extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to open document: {0}")]
    OpenError(String),

    #[error("failed to read page {page}: {message}")]
    PageError { page: u32, message: String },

    #[error("failed to decode image: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors related to chat completion calls.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("chat server error: {0}")]
    ServerError(String),

    #[error("invalid chat response: {0}")]
    InvalidResponse(String),

    #[error("chat timeout")]
    Timeout,
}

/// Errors related to image captioning.
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("caption request failed: {0}")]
    Chat(#[from] ChatError),

    #[error("model returned an empty description")]
    EmptyDescription,
}

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to connect to embedding API: {0}")]
    ConnectionError(String),

    #[error("embedding API error: {0}")]
    ServerError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding input is empty")]
    EmptyInput,

    #[error("embedding timeout")]
    Timeout,
}

/// Errors related to vector store operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to Milvus: {0}")]
    ConnectionError(String),

    #[error("collection error: {0}")]
    CollectionError(String),

    #[error("insert error: {0}")]
    InsertError(String),

    #[error("search error: {0}")]
    SearchError(String),

    #[error("query error: {0}")]
    QueryError(String),

    #[error("Milvus returned code {code}: {message}")]
    ServerError { code: i64, message: String },

    #[error("Milvus client error: {0}")]
    ClientError(String),
}

/// Errors that abort an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("directory walk error: {0}")]
    WalkError(String),

    #[error("vector store error: {0}")]
    VectorStoreError(#[from] VectorStoreError),
}

/// Errors raised while answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no query provided")]
    EmptyQuery,

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Application-level errors that wrap domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("{0}")]
    Other(String),
}
