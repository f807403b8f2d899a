use std::collections::HashSet;

use charak_core::corpus::{fingerprint_chunks, Chunk};
use charak_core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::model::{EntryMetadata, IndexEntry};
use super::store::IndexStore;
use crate::embeddings::Embedder;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildReport {
    pub collection: String,
    pub entries: u64,
    pub batches: u32,
    pub dims: Option<u32>,
    pub fingerprint: String,
}

/// Offline full rebuild: drop `name`, recreate it, and insert every chunk in
/// batches of `batch_size`.
///
/// Must not run while a serving process reads the same index path.
pub fn build_collection(
    store: &IndexStore,
    name: &str,
    chunks: &[Chunk],
    embedder: &dyn Embedder,
    batch_size: usize,
) -> Result<BuildReport, AppError> {
    if batch_size == 0 {
        return Err(AppError::new("CONFIG_INVALID", "Batch size must be at least 1"));
    }

    // Validate before touching the existing collection.
    let mut seen: HashSet<&str> = HashSet::new();
    for c in chunks {
        if !seen.insert(c.id.as_str()) {
            return Err(AppError::new("CORPUS_DUPLICATE_CHUNK_ID", "Chunk ids must be unique")
                .with_details(format!("id={}", c.id)));
        }
    }

    if store.drop_collection(name)? {
        info!(collection = name, "deleted existing collection (rebuilding fresh)");
    }
    store.create_collection(name, Some(embedder.model()))?;

    let total = chunks.len();
    let total_batches = total.div_ceil(batch_size);
    info!(
        collection = name,
        chunks = total,
        batch_size,
        "embedding and storing chunks"
    );

    let mut done = 0usize;
    for (i, batch) in chunks.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        if vectors.len() != batch.len() {
            return Err(AppError::new(
                "EMBED_FAILED",
                "Embedder returned a different number of vectors than inputs",
            )
            .with_details(format!("expected={}; got={}", batch.len(), vectors.len())));
        }

        let entries: Vec<IndexEntry> = batch
            .iter()
            .zip(vectors)
            .map(|(c, vector)| IndexEntry {
                id: c.id.clone(),
                vector,
                text: c.text.clone(),
                metadata: EntryMetadata {
                    title: c.title.clone(),
                    chunk_index: c.chunk_index,
                },
            })
            .collect();
        store.add_entries(name, &entries)?;

        done += batch.len();
        info!("batch {}/{} done ({}/{} chunks)", i + 1, total_batches, done, total);
    }

    let fingerprint = fingerprint_chunks(chunks);
    store.set_fingerprint(name, &fingerprint)?;

    let info = store
        .collection_info(name)?
        .ok_or_else(|| super::store::collection_not_found(name))?;
    info!(collection = name, entries = info.count, path = %store.root().display(), "vector index built");

    Ok(BuildReport {
        collection: info.name,
        entries: info.count,
        batches: total_batches as u32,
        dims: info.dims,
        fingerprint,
    })
}
