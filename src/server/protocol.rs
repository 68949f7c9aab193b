use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NO_QUERY_MESSAGE: &str = "No query provided";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Pull the query out of a `/generate` body. `None` unless the body is a JSON
/// object whose `query` is a string with non-whitespace content.
pub fn parse_query(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let query = value.get("query")?.as_str()?;
    if query.trim().is_empty() {
        None
    } else {
        Some(query.to_string())
    }
}
