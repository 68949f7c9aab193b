//! Ingestion pipeline: documents to text files, images to captions, text files
//! to stored embeddings.
//!
//! Each phase walks one folder in name order and handles one item at a time.
//! A failing item is logged and counted, never fatal. Only folder setup and
//! collection bootstrap abort a run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::captioner::{Captioner, image_mime_type};
use super::chunker::TextChunker;
use super::embedding::Embedder;
use super::extractor::PdfExtractor;
use super::vector_store::VectorStore;
use crate::error::IngestError;
use crate::models::{EmbeddingRecord, PathsConfig};
use crate::utils::file::{ensure_dir, file_name, list_files, sibling_with_suffix};

pub const RAW_TEXT_SUFFIX: &str = "_raw.txt";
pub const DESCRIPTION_SUFFIX: &str = "_desc.txt";

/// Which phases to run.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub skip_extract: bool,
    pub skip_captions: bool,
    pub skip_embed: bool,
    /// Draw progress bars on stderr
    pub show_progress: bool,
}

/// Counters for one ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    pub documents_found: u64,
    pub documents_extracted: u64,
    pub documents_failed: u64,
    pub images_extracted: u64,
    pub images_skipped: u64,
    pub captions_written: u64,
    pub captions_failed: u64,
    pub text_files: u64,
    pub text_files_failed: u64,
    pub chunks_created: u64,
    pub chunks_inserted: u64,
    pub chunks_failed: u64,
    pub duration_ms: u64,
}

pub struct IngestPipeline {
    paths: PathsConfig,
    extractor: PdfExtractor,
    chunker: TextChunker,
    captioner: Captioner,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl IngestPipeline {
    pub fn new(
        paths: PathsConfig,
        captioner: Captioner,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            extractor: PdfExtractor::new(&paths.images),
            chunker: TextChunker::new(),
            paths,
            captioner,
            embedder,
            store,
        }
    }

    /// PDFs the extraction phase would process.
    pub fn pending_documents(&self) -> Result<Vec<PathBuf>, IngestError> {
        list_files(&self.paths.input, Some("pdf")).map_err(|e| IngestError::WalkError(e.to_string()))
    }

    /// Run the enabled phases in order.
    pub async fn run(&self, options: &IngestOptions) -> Result<IngestStats, IngestError> {
        let start_time = Instant::now();
        let mut stats = IngestStats::default();

        ensure_dir(&self.paths.output)?;
        ensure_dir(&self.paths.images)?;

        if !options.skip_extract {
            self.extract_documents(&mut stats, options.show_progress)
                .await?;
        }
        if !options.skip_captions {
            self.caption_images(&mut stats, options.show_progress)
                .await?;
        }
        if !options.skip_embed {
            self.embed_texts(&mut stats, options.show_progress).await?;
        }

        stats.duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!(
            documents = stats.documents_extracted,
            captions = stats.captions_written,
            inserted = stats.chunks_inserted,
            failed = stats.chunks_failed,
            duration_ms = stats.duration_ms,
            "ingestion finished"
        );
        Ok(stats)
    }

    async fn extract_documents(
        &self,
        stats: &mut IngestStats,
        show_progress: bool,
    ) -> Result<(), IngestError> {
        let documents = self.pending_documents()?;
        stats.documents_found = documents.len() as u64;

        let pb = progress_bar(documents.len(), show_progress);
        for path in &documents {
            pb.inc(1);
            let text = self.extract_one(path, stats).await;

            let raw_path = sibling_with_suffix(&self.paths.output, path, RAW_TEXT_SUFFIX);
            if let Err(e) = tokio::fs::write(&raw_path, text).await {
                tracing::warn!(path = %raw_path.display(), error = %e, "failed to write extracted text");
            }
        }
        pb.finish_and_clear();

        Ok(())
    }

    /// Extracted text, or an empty string when the document can't be read.
    async fn extract_one(&self, path: &Path, stats: &mut IngestStats) -> String {
        let extractor = self.extractor.clone();
        let owned = path.to_path_buf();

        match tokio::task::spawn_blocking(move || extractor.extract(&owned)).await {
            Ok(Ok(document)) => {
                tracing::info!(
                    document = %path.display(),
                    pages = document.page_count,
                    images = document.images.len(),
                    "extracted document"
                );
                stats.documents_extracted += 1;
                stats.images_extracted += document.images.len() as u64;
                document.text
            }
            Ok(Err(e)) => {
                tracing::warn!(document = %path.display(), error = %e, "extraction failed");
                stats.documents_failed += 1;
                String::new()
            }
            Err(e) => {
                tracing::warn!(document = %path.display(), error = %e, "extraction task failed");
                stats.documents_failed += 1;
                String::new()
            }
        }
    }

    async fn caption_images(
        &self,
        stats: &mut IngestStats,
        show_progress: bool,
    ) -> Result<(), IngestError> {
        let images =
            list_files(&self.paths.images, None).map_err(|e| IngestError::WalkError(e.to_string()))?;

        let pb = progress_bar(images.len(), show_progress);
        for image in &images {
            pb.inc(1);

            if image_mime_type(image).is_none() {
                tracing::debug!(image = %image.display(), "not a captionable format");
                stats.images_skipped += 1;
                continue;
            }

            let description = match self.captioner.caption(image).await {
                Ok(description) => description,
                Err(e) => {
                    tracing::warn!(image = %image.display(), error = %e, "captioning failed");
                    stats.captions_failed += 1;
                    continue;
                }
            };

            let desc_path = sibling_with_suffix(&self.paths.output, image, DESCRIPTION_SUFFIX);
            match tokio::fs::write(&desc_path, description).await {
                Ok(()) => {
                    tracing::info!(image = %image.display(), "wrote image description");
                    stats.captions_written += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %desc_path.display(), error = %e, "failed to write description");
                    stats.captions_failed += 1;
                }
            }
        }
        pb.finish_and_clear();

        Ok(())
    }

    async fn embed_texts(
        &self,
        stats: &mut IngestStats,
        show_progress: bool,
    ) -> Result<(), IngestError> {
        self.store.create_collection().await?;

        let text_files = list_files(&self.paths.output, Some("txt"))
            .map_err(|e| IngestError::WalkError(e.to_string()))?;
        tracing::info!(
            files = text_files.len(),
            model = self.embedder.model(),
            collection = self.store.collection(),
            "embedding text files"
        );

        let pb = progress_bar(text_files.len(), show_progress);
        for text_path in &text_files {
            pb.inc(1);

            let content = match tokio::fs::read_to_string(text_path).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %text_path.display(), error = %e, "failed to read text file");
                    stats.text_files_failed += 1;
                    continue;
                }
            };
            stats.text_files += 1;

            let source = file_name(text_path);
            let chunks = self.chunker.chunk(&content, &source);
            tracing::debug!(%source, chunks = chunks.len(), "chunked text file");

            for chunk in chunks {
                stats.chunks_created += 1;

                let vector = match self.embedder.embed(&chunk.content).await {
                    Ok(vector) => vector,
                    Err(e) => {
                        tracing::warn!(%source, chunk = chunk.chunk_index, error = %e, "embedding failed");
                        stats.chunks_failed += 1;
                        continue;
                    }
                };

                match self.store.insert(EmbeddingRecord::new(vector, chunk)).await {
                    Ok(()) => stats.chunks_inserted += 1,
                    Err(e) => {
                        tracing::warn!(%source, error = %e, "insert failed");
                        stats.chunks_failed += 1;
                    }
                }
            }
        }
        pb.finish_and_clear();

        Ok(())
    }
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
