pub mod context;
pub mod discovery;
pub mod embeddings;
pub mod guardrails;
pub mod index;
pub mod llm;
pub mod ollama;
pub mod pipeline;
pub mod prompts;
pub mod retrieve;

pub use pipeline::{AnswerResult, RagContext};
