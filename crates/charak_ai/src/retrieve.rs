use charak_core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embeddings::Embedder;
use crate::index::{Collection, RetrievedChunk};

/// Retrieved chunks, nearest first; at most `k` long.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    pub chunks: Vec<RetrievedChunk>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Embed the question once and look up its `k` nearest chunks.
pub fn retrieve(
    collection: &Collection,
    embedder: &dyn Embedder,
    question: &str,
    k: usize,
) -> Result<RetrievalResult, AppError> {
    let q = question.trim();
    if q.is_empty() {
        return Err(AppError::new("INDEX_QUERY_INVALID", "Query must not be empty"));
    }

    let qv = embedder.embed(q)?;
    let chunks = collection.query(&qv, k)?;
    debug!(
        collection = collection.name(),
        k,
        hits = chunks.len(),
        nearest = ?chunks.first().map(|c| c.distance),
        "retrieved"
    );
    Ok(RetrievalResult { chunks })
}
