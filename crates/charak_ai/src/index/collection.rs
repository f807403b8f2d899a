use std::cmp::Ordering;

use charak_core::error::AppError;

use super::model::{CollectionInfo, IndexEntry, RetrievedChunk};
use super::similarity;

/// A collection loaded into memory. Read-only once loaded, so a single
/// instance can serve concurrent queries.
#[derive(Debug, Clone)]
pub struct Collection {
    info: CollectionInfo,
    entries: Vec<IndexEntry>,
    norms: Vec<f32>,
}

impl Collection {
    pub fn new(info: CollectionInfo, entries: Vec<IndexEntry>) -> Self {
        let norms = entries.iter().map(|e| similarity::l2_norm(&e.vector)).collect();
        Self {
            info,
            entries,
            norms,
        }
    }

    pub fn info(&self) -> &CollectionInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn dims(&self) -> Option<usize> {
        self.info.dims.map(|d| d as usize)
    }

    /// Up to `k` entries nearest to `vector` by cosine distance, ascending.
    /// Ties are broken by id. Asking for more than the collection holds
    /// returns everything.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, AppError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if let Some(dims) = self.dims() {
            if vector.len() != dims {
                return Err(AppError::new(
                    "CONFIG_DIMENSION_MISMATCH",
                    "Query embedding dims do not match index dims",
                )
                .with_details(format!(
                    "collection={}; index_dims={dims}; query_dims={}",
                    self.info.name,
                    vector.len()
                )));
            }
        }
        let qnorm = similarity::l2_norm(vector);
        if qnorm == 0.0 {
            return Err(AppError::new(
                "EMBED_ZERO_VECTOR",
                "Query embedding norm is zero",
            ));
        }

        let mut hits: Vec<(usize, f32)> = Vec::with_capacity(self.entries.len());
        for (i, entry) in self.entries.iter().enumerate() {
            let vnorm = self.norms[i];
            if vnorm == 0.0 {
                continue;
            }
            hits.push((i, similarity::cosine_distance(vector, &entry.vector, qnorm, vnorm)));
        }

        hits.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.entries[a.0].id.cmp(&self.entries[b.0].id))
        });
        hits.truncate(k);

        Ok(hits
            .into_iter()
            .map(|(i, distance)| {
                let e = &self.entries[i];
                RetrievedChunk {
                    id: e.id.clone(),
                    text: e.text.clone(),
                    metadata: e.metadata.clone(),
                    distance,
                }
            })
            .collect())
    }
}
