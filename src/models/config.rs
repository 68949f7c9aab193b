use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
pub const DEFAULT_MILVUS_URI: &str = "https://gcp-us-west1.cloud.zilliz.com";
pub const DEFAULT_COLLECTION: &str = "openai_pdfs_images_check_copy";
pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 1536;
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pdf-rag").join("config.toml"))
    }

    /// Load configuration from `path` (or the default location), then apply
    /// `.env` and environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        config.load_env();
        Ok(config)
    }

    /// Like `load`, but an unreadable or malformed file falls back to the
    /// defaults (environment overrides still applied) and the error is returned
    /// alongside for the caller to report.
    pub fn load_or_default(path: Option<&Path>) -> (Self, Option<ConfigError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => {
                let mut config = Self::default();
                config.load_env();
                (config, Some(e))
            }
        }
    }

    fn load_env(&mut self) {
        let _ = dotenvy::dotenv();
        self.apply_env(|key| std::env::var(key).ok());
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the path `save` and `load` use when no explicit path is given.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        path.map(Path::to_path_buf)
            .or_else(Self::config_path)
            .ok_or_else(|| {
                ConfigError::PathError("could not determine config directory".to_string())
            })
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(uri) = non_empty("MILVUS_URI") {
            self.vector_store.uri = uri;
        }
        if let Some(key) = non_empty("MILVUS_API_KEY") {
            self.vector_store.api_key = Some(key);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    #[serde(default = "default_answer_max_tokens")]
    pub answer_max_tokens: u32,

    #[serde(default = "default_caption_max_tokens")]
    pub caption_max_tokens: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

fn default_vision_model() -> String {
    DEFAULT_VISION_MODEL.to_string()
}

fn default_answer_max_tokens() -> u32 {
    200
}

fn default_caption_max_tokens() -> u32 {
    2000
}

fn default_timeout() -> u64 {
    120
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            vision_model: default_vision_model(),
            answer_max_tokens: default_answer_max_tokens(),
            caption_max_tokens: default_caption_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default = "default_milvus_uri")]
    pub uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_dimension")]
    pub dimension: u32,

    #[serde(default = "default_top_n")]
    pub top_n: u32,

    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_milvus_uri() -> String {
    DEFAULT_MILVUS_URI.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_dimension() -> u32 {
    DEFAULT_EMBEDDING_DIMENSION
}

fn default_top_n() -> u32 {
    6
}

fn default_verify_tls() -> bool {
    true
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            uri: default_milvus_uri(),
            api_key: None,
            collection: default_collection(),
            dimension: default_dimension(),
            top_n: default_top_n(),
            verify_tls: default_verify_tls(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Folder scanned for `*.pdf` documents
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Folder receiving `_raw.txt` and `_desc.txt` files
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Folder receiving extracted raster images
    #[serde(default = "default_images")]
    pub images: PathBuf,
}

fn default_input() -> PathBuf {
    PathBuf::from("input")
}

fn default_output() -> PathBuf {
    PathBuf::from("pdf-image-to-text")
}

fn default_images() -> PathBuf {
    PathBuf::from("pdf-images")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            images: default_images(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level: error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `pdf_rag::server = "debug"`
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.openai.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.openai.answer_max_tokens, 200);
        assert_eq!(config.openai.caption_max_tokens, 2000);
        assert_eq!(config.vector_store.collection, DEFAULT_COLLECTION);
        assert_eq!(config.vector_store.top_n, 6);
        assert_eq!(config.server.bind, DEFAULT_BIND);
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path();
        assert!(path.is_some());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [vector_store]
            collection = "manuals"

            [paths]
            input = "docs"
            "#,
        )
        .unwrap();

        assert_eq!(config.vector_store.collection, "manuals");
        assert_eq!(config.vector_store.dimension, DEFAULT_EMBEDDING_DIMENSION);
        assert_eq!(config.paths.input, PathBuf::from("docs"));
        assert_eq!(config.paths.images, PathBuf::from("pdf-images"));
        assert_eq!(config.openai.chat_model, DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("MILVUS_URI", "http://localhost:19530"),
            ("MILVUS_API_KEY", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.vector_store.uri, "http://localhost:19530");
        assert!(config.vector_store.api_key.is_none());
        assert_eq!(config.openai.base_url, DEFAULT_OPENAI_BASE_URL);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.vector_store.top_n = 3;
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.vector_store.top_n, 3);
        assert_eq!(loaded.paths.output, PathBuf::from("pdf-image-to-text"));
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vector_store\ncollection = ").unwrap();

        assert!(Config::load(Some(&path)).is_err());

        let (config, error) = Config::load_or_default(Some(&path));
        assert!(matches!(error, Some(ConfigError::TomlParseError(_))));
        assert_eq!(config.vector_store.collection, DEFAULT_COLLECTION);
        assert_eq!(config.vector_store.top_n, 6);
    }

    #[test]
    fn test_valid_file_reports_no_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vector_store]\ntop_n = 4\n").unwrap();

        let (config, error) = Config::load_or_default(Some(&path));
        assert!(error.is_none());
        assert_eq!(config.vector_store.top_n, 4);
    }
}
