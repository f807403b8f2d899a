use charak_core::error::AppError;

/// Maps text to a fixed-dimension dense vector.
///
/// The same implementation and model must be used to build a collection and
/// to embed every query against it.
pub trait Embedder: Send + Sync {
    fn model(&self) -> &str;

    fn embed(&self, input: &str) -> Result<Vec<f32>, AppError>;

    /// Order-preserving batch form of [`Embedder::embed`].
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        inputs.iter().map(|s| self.embed(s)).collect()
    }
}

pub mod ollama_embed;

pub use ollama_embed::OllamaEmbedder;
