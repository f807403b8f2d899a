use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chunking::{chunk_text, ChunkingOptions};
use crate::corpus::{Chunk, Document};
use crate::error::AppError;
use crate::normalize::clean_text;

/// Batch summary for one preprocessing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreprocessReport {
    pub documents_total: u32,
    pub documents_processed: u32,
    /// Empty or shorter than `min_content_chars`.
    pub documents_skipped: u32,
    /// Repeated titles after the first document accepted under that title.
    pub duplicates_skipped: u32,
    pub chunk_count: u32,
}

#[derive(Debug, Clone)]
pub struct PreprocessOutput {
    pub chunks: Vec<Chunk>,
    pub report: PreprocessReport,
}

/// Clean and chunk every document, in input order.
///
/// Short and empty documents are not errors: they are counted in the report
/// and left out of the output.
pub fn preprocess_documents(
    documents: &[Document],
    opts: &ChunkingOptions,
) -> Result<PreprocessOutput, AppError> {
    opts.validate()?;

    let mut report = PreprocessReport {
        documents_total: documents.len() as u32,
        ..PreprocessReport::default()
    };
    let mut seen_titles: HashSet<&str> = HashSet::new();
    let mut chunks: Vec<Chunk> = Vec::new();

    for doc in documents {
        // A short stub must not claim a title that a later full document carries.
        if doc.content.is_empty() || doc.content.chars().count() < opts.min_content_chars {
            debug!(title = %doc.title, chars = doc.content.chars().count(), "skipped (too short)");
            report.documents_skipped += 1;
            continue;
        }
        if !seen_titles.insert(doc.title.as_str()) {
            warn!(title = %doc.title, "duplicate title; keeping first accepted occurrence");
            report.duplicates_skipped += 1;
            continue;
        }

        let cleaned = clean_text(&doc.content);
        let doc_chunks = chunk_text(&cleaned, &doc.title, opts)?;
        debug!(title = %doc.title, chunks = doc_chunks.len(), "chunked");
        chunks.extend(doc_chunks);
        report.documents_processed += 1;
    }

    report.chunk_count = chunks.len() as u32;
    info!(
        processed = report.documents_processed,
        skipped = report.documents_skipped,
        duplicates = report.duplicates_skipped,
        chunks = report.chunk_count,
        "preprocessing summary"
    );

    Ok(PreprocessOutput { chunks, report })
}
