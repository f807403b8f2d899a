use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// One scraped page of the source text. `title` is the unique key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// A word window of a document; the atomic unit that gets indexed and retrieved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub id: String,
    pub title: String,
    pub chunk_index: u32,
    pub text: String,
}

impl Chunk {
    pub fn id_for(title: &str, chunk_index: u32) -> String {
        format!("{title}_chunk_{chunk_index}")
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

pub fn read_documents(path: &Path) -> Result<Vec<Document>, AppError> {
    read_json(path, "raw corpus")
}

pub fn read_chunks(path: &Path) -> Result<Vec<Chunk>, AppError> {
    read_json(path, "chunk file")
}

pub fn write_chunks(path: &Path, chunks: &[Chunk]) -> Result<(), AppError> {
    write_json_atomic(path, chunks, "chunk file")
}

pub fn write_documents(path: &Path, documents: &[Document]) -> Result<(), AppError> {
    write_json_atomic(path, documents, "raw corpus")
}

/// SHA-256 over chunk ids and texts in sequence order; identifies the chunk set a
/// collection was built from.
pub fn fingerprint_chunks(chunks: &[Chunk]) -> String {
    let mut hasher = Sha256::new();
    for c in chunks {
        hasher.update(c.id.as_bytes());
        hasher.update([0u8]);
        hasher.update(c.text.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::new("CORPUS_READ_FAILED", format!("Failed to read {what}"))
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::new("CORPUS_DECODE_FAILED", format!("Failed to decode {what}"))
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T, what: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::new("CORPUS_WRITE_FAILED", format!("Failed to create directory for {what}"))
                .with_details(format!("path={}; err={}", parent.display(), e))
        })?;
    }
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        AppError::new("CORPUS_WRITE_FAILED", format!("Failed to encode {what}"))
            .with_details(e.to_string())
    })?;
    fs::write(&tmp, json.as_bytes()).map_err(|e| {
        AppError::new("CORPUS_WRITE_FAILED", format!("Failed to write {what}"))
            .with_details(format!("path={}; err={}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        AppError::new("CORPUS_WRITE_FAILED", format!("Failed to finalize {what} write"))
            .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), path.display(), e))
    })?;
    Ok(())
}
