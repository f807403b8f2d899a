#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use charak_ai::embeddings::Embedder;
use charak_ai::llm::{Llm, Prompt};
use charak_core::config::IndexConfig;
use charak_core::corpus::Chunk;
use charak_core::error::AppError;

const KEYWORDS: [&str; 3] = ["vata", "pitta", "kapha"];

/// Deterministic embedding: one axis per dosha keyword plus a small bias so
/// no text embeds to the zero vector.
pub struct KeywordEmbedder {
    batch_calls: AtomicUsize,
    embed_calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            batch_calls: AtomicUsize::new(0),
            embed_calls: AtomicUsize::new(0),
        }
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    fn vector(input: &str) -> Vec<f32> {
        let lowered = input.to_lowercase();
        let mut v: Vec<f32> = KEYWORDS
            .iter()
            .map(|k| lowered.matches(k).count() as f32)
            .collect();
        v.push(0.1);
        v
    }
}

impl Embedder for KeywordEmbedder {
    fn model(&self) -> &str {
        "mock-keywords"
    }

    fn embed(&self, input: &str) -> Result<Vec<f32>, AppError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(input))
    }

    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs.iter().map(|s| Self::vector(s)).collect())
    }
}

/// Every input maps to the same vector of the given width.
pub struct FixedDimEmbedder(pub usize);

impl Embedder for FixedDimEmbedder {
    fn model(&self) -> &str {
        "mock-fixed"
    }

    fn embed(&self, _input: &str) -> Result<Vec<f32>, AppError> {
        Ok(vec![1.0; self.0])
    }
}

/// Shared view of the prompts a [`MockLlm`] received, usable after the
/// mock has been moved into a pipeline.
#[derive(Clone, Default)]
pub struct PromptLog(Arc<Mutex<Vec<Prompt>>>);

impl PromptLog {
    pub fn calls(&self) -> usize {
        self.0.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn last(&self) -> Option<Prompt> {
        self.0.lock().ok().and_then(|p| p.last().cloned())
    }
}

/// Returns `answer` verbatim and records each prompt it saw.
pub struct MockLlm {
    answer: String,
    log: PromptLog,
}

impl MockLlm {
    pub fn new(answer: &str, log: PromptLog) -> Self {
        Self {
            answer: answer.to_string(),
            log,
        }
    }
}

impl Llm for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    fn generate(&self, prompt: &Prompt) -> Result<String, AppError> {
        self.log.0.lock().expect("prompt log").push(prompt.clone());
        Ok(self.answer.clone())
    }
}

pub struct FailingLlm;

impl Llm for FailingLlm {
    fn name(&self) -> &str {
        "failing"
    }

    fn generate(&self, _prompt: &Prompt) -> Result<String, AppError> {
        Err(AppError::new("LLM_OLLAMA_UNREACHABLE", "Failed to reach Ollama on 127.0.0.1")
            .with_details("connection refused")
            .with_retryable(true))
    }
}

pub fn chunk(title: &str, idx: u32, text: &str) -> Chunk {
    Chunk {
        id: Chunk::id_for(title, idx),
        title: title.to_string(),
        chunk_index: idx,
        text: text.to_string(),
    }
}

pub fn dosha_chunks() -> Vec<Chunk> {
    vec![
        chunk("Vata Kalakaliya", 0, "vata is dry light cold and mobile; vata governs movement"),
        chunk("Vata Kalakaliya", 1, "aggravated vata causes pain; vata is pacified by oil"),
        chunk("Pitta Prakriti", 0, "pitta is hot sharp and governs digestion"),
        chunk("Kapha Prakriti", 0, "kapha is heavy stable and unctuous"),
        chunk("Tridosha", 0, "vata pitta and kapha together sustain the body"),
    ]
}

/// Index config whose every location lives under `root`.
pub fn index_config(root: &Path, collection: &str) -> IndexConfig {
    IndexConfig {
        collection: collection.to_string(),
        candidate_paths: vec![root.join("charak_db"), root.join("alt").join("charak_db")],
        archive_paths: vec![root.join("charak_db.zip")],
        extract_dir: root.to_path_buf(),
        default_path: root.join("charak_db"),
        batch_size: 2,
        strict_collection_name: false,
    }
}
