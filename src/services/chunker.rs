//! Sentence-level text chunking.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::TextChunk;

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]").unwrap());

/// Splits text into sentences ending in `.`, `!` or `?`.
///
/// Each terminal character stays attached to the sentence it ends. A trailing
/// segment without a terminator becomes its own chunk. Chunks are stripped and
/// empty ones are dropped.
#[derive(Debug, Clone, Default)]
pub struct TextChunker;

impl TextChunker {
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into stripped, non-empty sentences.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;

        let mut push = |segment: &str| {
            let trimmed = segment.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
        };

        for delimiter in SENTENCE_END.find_iter(text) {
            push(&text[start..delimiter.end()]);
            start = delimiter.end();
        }
        push(&text[start..]);

        sentences
    }

    /// Chunk the contents of a text file, tagging each chunk with `source`.
    pub fn chunk(&self, text: &str, source: &str) -> Vec<TextChunk> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(idx, content)| TextChunk {
                content,
                chunk_index: idx as u32,
                source: source.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_terminators_stay_attached() {
        let chunker = TextChunker::new();
        assert_eq!(chunker.split("A. B! C?"), vec!["A.", "B!", "C?"]);
    }

    #[test]
    fn test_no_punctuation_single_chunk() {
        let chunker = TextChunker::new();
        assert_eq!(chunker.split("no punctuation"), vec!["no punctuation"]);
        assert_eq!(chunker.split("  padded  \n"), vec!["padded"]);
    }

    #[test]
    fn test_empty_input() {
        let chunker = TextChunker::new();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split(" \n\t ").is_empty());
    }

    #[test]
    fn test_trailing_segment_kept() {
        let chunker = TextChunker::new();
        assert_eq!(
            chunker.split("First sentence. Second part without end"),
            vec!["First sentence.", "Second part without end"]
        );
    }

    #[test]
    fn test_whitespace_between_sentences_dropped() {
        let chunker = TextChunker::new();
        assert_eq!(chunker.split("One.\n\n   \nTwo."), vec!["One.", "Two."]);
    }

    #[test]
    fn test_repeated_terminators() {
        let chunker = TextChunker::new();
        assert_eq!(chunker.split("Wait... what?!"), vec!["Wait.", ".", ".", "what?", "!"]);
    }

    #[test]
    fn test_rejoin_preserves_content() {
        let chunker = TextChunker::new();
        let inputs = [
            "Plain text",
            "Figure 3. Revenue by quarter!\nQ1: 4.5M? Q2 ... unknown",
            "{\"objects\": [\"chart\", \"legend\"], \"text\": \"Total: 12.\"}",
            "  ?!.  ",
            "Ünïcödé sentence. Другое предложение! 結び?",
        ];

        for input in inputs {
            let chunks = chunker.split(input);
            assert!(chunks.iter().all(|c| !c.trim().is_empty()));
            assert!(chunks.iter().all(|c| c.trim() == c));
            assert_eq!(non_whitespace(&chunks.concat()), non_whitespace(input));
        }
    }

    #[test]
    fn test_chunk_metadata() {
        let chunker = TextChunker::new();
        let chunks = chunker.chunk("Alpha. Beta.", "report_raw.txt");

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].chunk_index, 1);
        assert_eq!(chunks[1].content, "Beta.");
        assert!(chunks.iter().all(|c| c.source == "report_raw.txt"));
    }
}
