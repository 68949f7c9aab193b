//! Retrieval-side models for hits, context and answers.

use serde::{Deserialize, Serialize};

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Identifier assigned by the vector store. Milvus uses int64 primary keys by
/// default but collections may be created with string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Str(String),
}

impl EntityId {
    /// Literal usable inside a filter expression such as `id in [<literal>]`.
    /// Int64 keys serialized as JSON strings are rendered bare.
    pub fn filter_literal(&self) -> String {
        match self {
            EntityId::Int(id) => id.to_string(),
            EntityId::Str(id) if id.parse::<i64>().is_ok() => id.clone(),
            EntityId::Str(id) => format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")),
        }
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{id}"),
            EntityId::Str(id) => write!(f, "{id}"),
        }
    }
}

/// A nearest-neighbour hit as returned by search. `text` and `path` are only
/// present when the store chose to return those output fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: EntityId,
    pub distance: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A hit whose full text has been fetched and flattened to one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextRecord {
    pub id: EntityId,
    pub distance: f32,
    pub text: String,
}

impl ContextRecord {
    pub fn new(hit: &SearchHit, raw_text: &str) -> Self {
        Self {
            id: hit.id.clone(),
            distance: hit.distance,
            text: raw_text.replace('\n', " "),
        }
    }
}

/// Answer produced by the query pipeline together with its grounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    pub query: String,
    pub response: String,
    pub context: Vec<ContextRecord>,
    pub duration_ms: u64,
}

/// Retrieval-only results, without generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<ContextRecord>,
    pub duration_ms: u64,
}

impl SearchResults {
    pub fn new(query: String, results: Vec<ContextRecord>, duration_ms: u64) -> Self {
        Self {
            query,
            results,
            duration_ms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("markdown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_entity_id_deserialize() {
        let int: EntityId = serde_json::from_str("451").unwrap();
        assert_eq!(int, EntityId::Int(451));

        let string: EntityId = serde_json::from_str("\"doc-7\"").unwrap();
        assert_eq!(string, EntityId::Str("doc-7".to_string()));
    }

    #[test]
    fn test_entity_id_filter_literal() {
        assert_eq!(EntityId::Int(42).filter_literal(), "42");
        assert_eq!(
            EntityId::Str("a\"b".to_string()).filter_literal(),
            "\"a\\\"b\""
        );
        assert_eq!(EntityId::Str("doc-7".to_string()).filter_literal(), "\"doc-7\"");
    }

    #[test]
    fn test_string_encoded_int64_id_is_unquoted() {
        let hit: SearchHit =
            serde_json::from_str(r#"{"id":"449987654321012345","distance":0.91}"#).unwrap();
        assert_eq!(hit.id, EntityId::Str("449987654321012345".to_string()));
        assert_eq!(
            format!("id in [{}]", hit.id.filter_literal()),
            "id in [449987654321012345]"
        );
        assert_eq!(EntityId::Str("-12".to_string()).filter_literal(), "-12");
    }

    #[test]
    fn test_context_record_flattens_newlines() {
        let hit = SearchHit {
            id: EntityId::Int(1),
            distance: 0.9,
            text: None,
            path: None,
        };
        let record = ContextRecord::new(&hit, "line one\nline two\n");
        assert_eq!(record.text, "line one line two ");
        assert_eq!(record.distance, 0.9);
    }
}
