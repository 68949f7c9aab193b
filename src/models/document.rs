//! Document-side models: extraction output, chunks and stored records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Raster image found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    /// 1-indexed page number
    pub page: u32,
    /// 0-indexed position among the page's images
    pub index: usize,
    /// File extension matching the encoded bytes (`jpeg`, `jpx`, `png`)
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

impl ExtractedImage {
    /// File name for this image: `<document>_page<N>_img<M>.<ext>`.
    pub fn file_name(&self, document_name: &str) -> String {
        format!(
            "{}_page{}_img{}.{}",
            document_name, self.page, self.index, self.extension
        )
    }
}

/// Result of extracting one document.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    /// Page texts joined, each followed by a newline
    pub text: String,
    pub page_count: u32,
    /// Paths of images written to the image folder
    pub images: Vec<PathBuf>,
}

/// A sentence-bounded piece of a text file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Stripped sentence text, terminal punctuation included
    pub content: String,

    /// Position within the source text
    pub chunk_index: u32,

    /// Name of the text file the chunk came from
    pub source: String,
}

/// Unit of storage in the vector collection. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub vector: Vec<f32>,
    pub text: String,
    pub path: String,
}

impl EmbeddingRecord {
    pub fn new(vector: Vec<f32>, chunk: TextChunk) -> Self {
        Self {
            vector,
            text: chunk.content,
            path: chunk.source,
        }
    }
}
