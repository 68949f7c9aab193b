use std::fmt::Write as FmtWrite;
use std::path::PathBuf;

use serde::Serialize;

use crate::models::{OutputFormat, RagAnswer, SearchResults};
use crate::services::IngestStats;

pub trait Formatter {
    fn format_answer(&self, answer: &RagAnswer) -> String;
    fn format_search_results(&self, results: &SearchResults) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_ingest_stats(&self, stats: &IngestStats) -> String;
    fn format_dry_run(&self, documents: &[PathBuf]) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub vector_store_url: String,
    pub vector_store_connected: bool,
    pub collection: String,
    /// `None` when the collection does not exist yet
    pub row_count: Option<u64>,
    pub embedding_model: String,
    pub chat_model: String,
    pub vision_model: String,
}

const PREVIEW_CHARS: usize = 200;

fn preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        format!("{}...", head)
    } else {
        head
    }
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_answer(&self, answer: &RagAnswer) -> String {
        let mut output = String::new();
        writeln!(output, "{}", answer.response).unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "({} context records, {}ms)",
            answer.context.len(),
            answer.duration_ms
        )
        .unwrap();
        output
    }

    fn format_search_results(&self, results: &SearchResults) -> String {
        if results.is_empty() {
            return format!("No results found for: {}\n", results.query);
        }

        let mut output = String::new();
        writeln!(output, "Search results for: \"{}\"", results.query).unwrap();
        writeln!(
            output,
            "Found {} results in {}ms\n",
            results.len(),
            results.duration_ms
        )
        .unwrap();

        for (i, record) in results.results.iter().enumerate() {
            writeln!(output, "{}. [Distance: {:.3}]", i + 1, record.distance).unwrap();
            writeln!(output, "   Id: {}", record.id).unwrap();
            writeln!(output, "   ---").unwrap();
            writeln!(output, "   {}", preview(&record.text)).unwrap();
            writeln!(output).unwrap();
        }

        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Status").unwrap();
        writeln!(output, "------").unwrap();

        let vector_status = if status.vector_store_connected {
            "[CONNECTED]"
        } else {
            "[DISCONNECTED]"
        };
        writeln!(output, "Vector Store:  Milvus ({})", vector_status).unwrap();
        writeln!(output, "  URL:         {}", status.vector_store_url).unwrap();
        writeln!(output, "  Collection:  {}", status.collection).unwrap();
        if status.vector_store_connected {
            match status.row_count {
                Some(rows) => writeln!(output, "  Rows:        {}", rows).unwrap(),
                None => writeln!(output, "  Rows:        (collection not created)").unwrap(),
            }
        }
        writeln!(output).unwrap();

        writeln!(output, "Models").unwrap();
        writeln!(output, "  Embedding:   {}", status.embedding_model).unwrap();
        writeln!(output, "  Chat:        {}", status.chat_model).unwrap();
        writeln!(output, "  Vision:      {}", status.vision_model).unwrap();

        output
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        let mut output = String::new();
        writeln!(output, "Ingestion Complete").unwrap();
        writeln!(output, "------------------").unwrap();
        writeln!(
            output,
            "Documents: {} found, {} extracted, {} failed",
            stats.documents_found, stats.documents_extracted, stats.documents_failed
        )
        .unwrap();
        writeln!(output, "Images extracted: {}", stats.images_extracted).unwrap();
        writeln!(
            output,
            "Captions: {} written, {} failed, {} skipped",
            stats.captions_written, stats.captions_failed, stats.images_skipped
        )
        .unwrap();
        writeln!(output, "Text files embedded: {}", stats.text_files).unwrap();
        writeln!(
            output,
            "Chunks: {} created, {} inserted, {} failed",
            stats.chunks_created, stats.chunks_inserted, stats.chunks_failed
        )
        .unwrap();
        writeln!(output, "Duration: {}ms", stats.duration_ms).unwrap();
        output
    }

    fn format_dry_run(&self, documents: &[PathBuf]) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "Dry run: Would extract {} documents",
            documents.len()
        )
        .unwrap();
        for document in documents {
            writeln!(output, "  {}", document.display()).unwrap();
        }
        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}\n", error)
    }
}

pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, value: &impl Serialize) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}

impl Formatter for JsonFormatter {
    fn format_answer(&self, answer: &RagAnswer) -> String {
        self.render(answer)
    }

    fn format_search_results(&self, results: &SearchResults) -> String {
        self.render(results)
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let json = serde_json::json!({
            "vector_store": {
                "driver": "milvus",
                "url": status.vector_store_url,
                "connected": status.vector_store_connected,
                "collection": status.collection,
                "rows": status.row_count,
            },
            "models": {
                "embedding": status.embedding_model,
                "chat": status.chat_model,
                "vision": status.vision_model,
            }
        });
        self.render(&json)
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        self.render(stats)
    }

    fn format_dry_run(&self, documents: &[PathBuf]) -> String {
        let json = serde_json::json!({
            "dry_run": true,
            "documents": documents,
        });
        self.render(&json)
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({"message": message}).to_string()
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({"error": error}).to_string()
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContextRecord, EntityId};

    fn results() -> SearchResults {
        SearchResults::new(
            "tower".to_string(),
            vec![ContextRecord {
                id: EntityId::Int(7),
                distance: 0.875,
                text: "The tower is in Paris.".to_string(),
            }],
            12,
        )
    }

    #[test]
    fn test_text_search_results() {
        let output = TextFormatter.format_search_results(&results());
        assert!(output.contains("Found 1 results in 12ms"));
        assert!(output.contains("1. [Distance: 0.875]"));
        assert!(output.contains("Id: 7"));
        assert!(output.contains("The tower is in Paris."));
    }

    #[test]
    fn test_text_search_results_empty() {
        let empty = SearchResults::new("nothing".to_string(), vec![], 1);
        assert_eq!(
            TextFormatter.format_search_results(&empty),
            "No results found for: nothing\n"
        );
    }

    #[test]
    fn test_preview_truncates() {
        let long = "a".repeat(PREVIEW_CHARS + 10);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_json_answer() {
        let answer = RagAnswer {
            query: "q".to_string(),
            response: "r".to_string(),
            context: results().results,
            duration_ms: 3,
        };
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new(false).format_answer(&answer)).unwrap();
        assert_eq!(value["response"], "r");
        assert_eq!(value["context"][0]["id"], 7);
    }

    #[test]
    fn test_json_status_missing_collection() {
        let status = StatusInfo {
            vector_store_url: "http://localhost:19530".to_string(),
            vector_store_connected: true,
            collection: "docs".to_string(),
            row_count: None,
            embedding_model: "e".to_string(),
            chat_model: "c".to_string(),
            vision_model: "v".to_string(),
        };
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new(true).format_status(&status)).unwrap();
        assert!(value["vector_store"]["rows"].is_null());
        assert!(
            TextFormatter
                .format_status(&status)
                .contains("(collection not created)")
        );
    }

    #[test]
    fn test_json_message_and_error() {
        let formatter = get_formatter(OutputFormat::Json);
        assert_eq!(formatter.format_message("done"), r#"{"message":"done"}"#);
        assert_eq!(formatter.format_error("bad"), r#"{"error":"bad"}"#);
    }
}
