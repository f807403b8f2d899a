//! Layered configuration.
//!
//! Built-in defaults, then `charak.toml` (or an explicit file), then
//! `CHARAK_`-prefixed environment variables with `__` separating sections,
//! e.g. `CHARAK_RETRIEVAL__TOP_K=8`.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::chunking::ChunkingOptions;
use crate::error::AppError;

pub const DEFAULT_CONFIG_FILE: &str = "charak.toml";
pub const ENV_PREFIX: &str = "CHARAK_";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    pub chunking: ChunkingOptions,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ollama model tag; `all-minilm` serves all-MiniLM-L6-v2 (384 dims).
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_string(),
            base_url: "http://127.0.0.1:11434".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    pub collection: String,
    /// Searched in order for a pre-built index.
    pub candidate_paths: Vec<PathBuf>,
    /// Searched in order for a packaged index archive.
    pub archive_paths: Vec<PathBuf>,
    /// Where archives are unpacked before candidates are checked again.
    pub extract_dir: PathBuf,
    /// Where an empty index is synthesized when nothing else is found.
    pub default_path: PathBuf,
    pub batch_size: usize,
    /// Refuse to serve a differently named collection.
    pub strict_collection_name: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            collection: "charak_samhita".to_string(),
            candidate_paths: vec![PathBuf::from("./charak_db"), PathBuf::from("../charak_db")],
            archive_paths: vec![
                PathBuf::from("./charak_db.zip"),
                PathBuf::from("../charak_db.zip"),
            ],
            extract_dir: PathBuf::from("."),
            default_path: PathBuf::from("./charak_db"),
            batch_size: 100,
            strict_collection_name: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationBackend {
    /// Local Ollama daemon.
    Ollama,
    /// Hosted Anthropic Messages API.
    Anthropic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub backend: GenerationBackend,
    pub model: String,
    /// Ollama daemon address (local backend only).
    pub base_url: String,
    /// Hosted API endpoint (hosted backend only).
    pub api_url: String,
    /// Name of the environment variable holding the hosted API key.
    pub api_key_env: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: GenerationBackend::Ollama,
            model: "llama3.2".to_string(),
            base_url: "http://127.0.0.1:11434".to_string(),
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            max_tokens: 1024,
            timeout_secs: 120,
        }
    }
}

impl RagConfig {
    /// Load defaults, then the config file, then `CHARAK_*` env vars.
    ///
    /// An explicit `path` must exist; the default `charak.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let file = match path {
            Some(p) => {
                if !p.is_file() {
                    return Err(AppError::new("CONFIG_NOT_FOUND", "Config file not found")
                        .with_details(format!("path={}", p.display())));
                }
                p.to_path_buf()
            }
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let figment = Figment::from(Serialized::defaults(RagConfig::default()))
            .merge(Toml::file(&file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self, AppError> {
        let config: RagConfig = figment.extract().map_err(|e| {
            AppError::new("CONFIG_INVALID", "Failed to load configuration").with_details(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.chunking.validate()?;
        if self.retrieval.top_k == 0 {
            return Err(AppError::new("CONFIG_INVALID", "retrieval.top_k must be at least 1"));
        }
        if self.index.batch_size == 0 {
            return Err(AppError::new("CONFIG_INVALID", "index.batch_size must be at least 1"));
        }
        if self.index.collection.trim().is_empty() {
            return Err(AppError::new("CONFIG_INVALID", "index.collection must not be empty"));
        }
        if self.embedding.model.trim().is_empty() {
            return Err(AppError::new("CONFIG_INVALID", "embedding.model must not be empty"));
        }
        Ok(())
    }
}
