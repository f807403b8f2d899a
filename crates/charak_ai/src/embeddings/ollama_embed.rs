use std::time::Duration;

use charak_core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Embedder;
use crate::ollama::{self, OllamaClient};

// Sentence-transformer inputs are truncated by the model anyway; keep requests bounded.
const MAX_INPUT_BYTES: usize = 12_000;

#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
    timeout: Duration,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            model: model.into(),
            timeout,
        }
    }

    /// Embed a short sentence so the daemon loads the model weights before any
    /// query is served. Returns the embedding dimension.
    pub fn warm_up(&self) -> Result<usize, AppError> {
        let v = self.embed("warm up")?;
        info!(model = %self.model, dims = v.len(), "embedding model ready");
        Ok(v.len())
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

fn bounded(input: &str) -> &str {
    if input.len() <= MAX_INPUT_BYTES {
        return input;
    }
    let mut end = MAX_INPUT_BYTES;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    &input[..end]
}

impl Embedder for OllamaEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    fn embed(&self, input: &str) -> Result<Vec<f32>, AppError> {
        let mut out = self.embed_batch(&[input.to_string()])?;
        out.pop()
            .ok_or_else(|| AppError::new("EMBED_FAILED", "Embeddings response was empty"))
    }

    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.client.base_url());
        let req = EmbedRequest {
            model: &self.model,
            input: inputs.iter().map(|s| bounded(s)).collect(),
        };
        debug!(model = %self.model, inputs = inputs.len(), "embedding request");

        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new("EMBED_FAILED", "Failed to encode embeddings request")
                .with_details(e.to_string())
        })?;
        let resp = ureq::post(&url).timeout(self.timeout).send_json(body);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: EmbedResponse = r.into_json().map_err(|e| {
                    AppError::new("EMBED_FAILED", "Failed to decode embeddings response")
                        .with_details(e.to_string())
                })?;
                if v.embeddings.len() != inputs.len() {
                    return Err(AppError::new(
                        "EMBED_FAILED",
                        "Embeddings response count does not match request",
                    )
                    .with_details(format!("expected={}; got={}", inputs.len(), v.embeddings.len())));
                }
                if v.embeddings.iter().any(|e| e.is_empty()) {
                    return Err(AppError::new("EMBED_FAILED", "Embeddings response was empty"));
                }
                Ok(v.embeddings)
            }
            Ok(r) => Err(AppError::new("EMBED_FAILED", "Embeddings request failed")
                .with_details(format!("status={}", r.status()))),
            Err(ureq::Error::Status(code, _)) => Err(AppError::new(
                "EMBED_FAILED",
                "Embeddings request failed",
            )
            .with_details(format!("status={code}; model={}", self.model))),
            Err(e) => Err(ollama::unreachable("EMBED_OLLAMA_UNREACHABLE", e)),
        }
    }
}
