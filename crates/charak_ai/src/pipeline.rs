//! Question answering over a served collection.
//!
//! [`RagContext`] owns the expensive per-process state (embedder, index,
//! generation backend) and exposes [`RagContext::ask`], which always returns
//! an [`AnswerResult`]: failures become explanatory answer text.

use std::path::PathBuf;
use std::time::Duration;

use charak_core::config::{IndexConfig, RagConfig};
use charak_core::error::{AppError, ErrorCategory};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::assemble;
use crate::discovery::{default_strategies, discover_from, DiscoveredIndex, IndexSource};
use crate::embeddings::{Embedder, OllamaEmbedder};
use crate::guardrails::check_citations;
use crate::index::{resolve_collection, Collection, CollectionInfo, CollectionResolution, IndexStore};
use crate::llm::{backend_from_config, Llm};
use crate::ollama::OllamaClient;
use crate::prompts::answer_prompt;
use crate::retrieve::retrieve;

pub const EMPTY_CORPUS_MESSAGE: &str = "The knowledge base is empty: no Charak Samhita passages have been indexed yet. \
Run `charak chunk` and `charak build-index`, then restart.";

pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question about Charak Samhita.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerResult {
    pub answer: String,
    /// Distinct source titles, sorted.
    pub sources: Vec<String>,
    pub chunks_used: usize,
}

impl AnswerResult {
    fn fixed(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            sources: Vec::new(),
            chunks_used: 0,
        }
    }

    fn from_error(e: &AppError) -> Self {
        let answer = match e.category() {
            ErrorCategory::Configuration => format!("⚠️ Configuration error: {}", e.describe()),
            _ => format!("⚠️ Error: {}", e.describe()),
        };
        Self {
            answer,
            sources: Vec::new(),
            chunks_used: 0,
        }
    }
}

/// The index a process serves from, as decided at startup.
#[derive(Debug, Clone)]
pub struct ServingIndex {
    pub discovered: DiscoveredIndex,
    pub resolution: CollectionResolution,
    /// `None` when the index holds no collections.
    pub collection: Option<Collection>,
}

impl ServingIndex {
    pub fn count(&self) -> usize {
        self.collection.as_ref().map(Collection::count).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStatus {
    pub path: PathBuf,
    pub source: IndexSource,
    pub resolution: CollectionResolution,
    pub collection: Option<CollectionInfo>,
    pub embedding_model: String,
    pub generation_backend: String,
}

/// Discover the index, resolve the configured collection and load it.
///
/// An index that is found but cannot be read moves discovery on to the next
/// strategy. When the last strategy's index is unreadable too, an empty index
/// is served so the process stays up. Configuration errors still fail.
pub fn load_index(cfg: &IndexConfig) -> Result<ServingIndex, AppError> {
    let strategies = default_strategies(cfg);
    let mut start = 0usize;
    loop {
        let (pos, discovered) = discover_from(&strategies[start..])?;
        let pos = start + pos;
        match open_discovered(cfg, &discovered) {
            Ok(serving) => return Ok(serving),
            Err(e) if e.category() == ErrorCategory::Index => {
                warn!(
                    path = %discovered.path.display(),
                    code = %e.code,
                    details = ?e.details,
                    "located index could not be opened"
                );
                if pos + 1 < strategies.len() {
                    start = pos + 1;
                    continue;
                }
                warn!(path = %discovered.path.display(), "serving an EMPTY index");
                return Ok(ServingIndex {
                    discovered,
                    resolution: CollectionResolution::Empty,
                    collection: None,
                });
            }
            Err(e) => return Err(e),
        }
    }
}

fn open_discovered(cfg: &IndexConfig, discovered: &DiscoveredIndex) -> Result<ServingIndex, AppError> {
    let store = IndexStore::open(discovered.path.clone());
    let resolution = resolve_collection(&store, &cfg.collection, cfg.strict_collection_name)?;
    let collection = match resolution.collection_name() {
        Some(name) => Some(store.load_collection(name)?),
        None => None,
    };
    Ok(ServingIndex {
        discovered: discovered.clone(),
        resolution,
        collection,
    })
}

pub struct RagContext {
    config: RagConfig,
    embedder: Box<dyn Embedder>,
    llm: Box<dyn Llm>,
    index: ServingIndex,
}

impl RagContext {
    /// Eager startup: warm the embedding model, locate and load the index,
    /// then build the generation backend.
    pub fn open(config: RagConfig) -> Result<Self, AppError> {
        config.validate()?;

        let client = OllamaClient::new(&config.embedding.base_url)?;
        let embedder = OllamaEmbedder::new(
            client,
            config.embedding.model.clone(),
            Duration::from_secs(config.embedding.timeout_secs),
        );
        let dims = embedder.warm_up()?;

        let index = load_index(&config.index)?;
        if let Some(collection) = index.collection.as_ref() {
            let info = collection.info();
            if let Some(model) = info.model.as_deref() {
                if model != embedder.model() {
                    warn!(
                        collection = %info.name,
                        built_with = model,
                        serving_with = embedder.model(),
                        "collection was built with a different embedding model"
                    );
                }
            }
            if let Some(d) = collection.dims() {
                if d != dims {
                    warn!(
                        collection = %info.name,
                        collection_dims = d,
                        model_dims = dims,
                        "embedding dimension does not match the collection; queries will fail"
                    );
                }
            }
        }

        let llm = backend_from_config(&config.generation)?;
        info!(
            backend = llm.name(),
            model = %config.generation.model,
            chunks = index.count(),
            "pipeline ready"
        );
        Ok(Self::from_parts(config, Box::new(embedder), llm, index))
    }

    pub fn from_parts(
        config: RagConfig,
        embedder: Box<dyn Embedder>,
        llm: Box<dyn Llm>,
        index: ServingIndex,
    ) -> Self {
        Self {
            config,
            embedder,
            llm,
            index,
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn resolution(&self) -> &CollectionResolution {
        &self.index.resolution
    }

    pub fn status(&self) -> IndexStatus {
        IndexStatus {
            path: self.index.discovered.path.clone(),
            source: self.index.discovered.source.clone(),
            resolution: self.index.resolution.clone(),
            collection: self.index.collection.as_ref().map(|c| c.info().clone()),
            embedding_model: self.embedder.model().to_string(),
            generation_backend: self.llm.name().to_string(),
        }
    }

    /// Answer one question. Never fails: every error is turned into answer text.
    pub fn ask(&self, question: &str) -> AnswerResult {
        let question = question.trim();
        if question.is_empty() {
            return AnswerResult::fixed(EMPTY_QUESTION_MESSAGE);
        }

        let collection = match self.index.collection.as_ref() {
            Some(c) if c.count() > 0 => c,
            _ => {
                info!("question received but the index is empty");
                return AnswerResult::fixed(EMPTY_CORPUS_MESSAGE);
            }
        };

        if let Err(e) = self.llm.check_ready() {
            warn!(code = %e.code, backend = self.llm.name(), "generation backend not ready");
            return AnswerResult::from_error(&e);
        }

        let retrieved = match retrieve(
            collection,
            self.embedder.as_ref(),
            question,
            self.config.retrieval.top_k,
        ) {
            Ok(r) => r,
            Err(e) => {
                warn!(code = %e.code, details = ?e.details, "retrieval failed");
                return AnswerResult::from_error(&e);
            }
        };

        let assembled = assemble(&retrieved);
        let sources: Vec<String> = assembled.sources.iter().cloned().collect();
        let chunks_used = retrieved.len();
        let prompt = answer_prompt(question, &assembled.context);

        match self.llm.generate(&prompt) {
            Ok(answer) => {
                if let Err(e) = check_citations(&answer, &assembled.sources) {
                    warn!(code = %e.code, details = ?e.details, "answer does not cite its sources");
                }
                AnswerResult {
                    answer,
                    sources,
                    chunks_used,
                }
            }
            // A credential can disappear between the readiness check and the call.
            Err(e) if e.category() == ErrorCategory::Configuration => {
                warn!(code = %e.code, "generation failed on configuration");
                AnswerResult::from_error(&e)
            }
            Err(e) => {
                warn!(code = %e.code, details = ?e.details, retryable = e.retryable, "generation failed");
                AnswerResult {
                    answer: format!("⚠️ Error: {}", e.describe()),
                    sources,
                    chunks_used,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_render_with_empty_sources() {
        let e = AppError::new("CONFIG_MISSING_CREDENTIAL", "Please set KEY");
        let r = AnswerResult::from_error(&e);
        assert_eq!(r.answer, "⚠️ Configuration error: Please set KEY");
        assert!(r.sources.is_empty());
        assert_eq!(r.chunks_used, 0);
    }

    #[test]
    fn other_errors_render_with_details() {
        let e = AppError::new("EMBED_FAILED", "Embeddings request failed").with_details("status=500");
        assert_eq!(
            AnswerResult::from_error(&e).answer,
            "⚠️ Error: Embeddings request failed (status=500)"
        );
    }
}
