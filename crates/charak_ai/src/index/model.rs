use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryMetadata {
    pub title: String,
    pub chunk_index: u32,
}

/// One stored chunk: its id (the primary key), vector, text and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: EntryMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    pub space: String,
    /// Unset until the first entry is stored.
    pub dims: Option<u32>,
    pub model: Option<String>,
    /// SHA-256 over the chunk set the collection was built from.
    pub fingerprint: Option<String>,
    pub created_at: String,
    pub count: u64,
    /// Empty stand-in created because no index was found.
    #[serde(default)]
    pub synthesized: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    pub id: String,
    pub text: String,
    pub metadata: EntryMetadata,
    /// Cosine distance, `1 - cosine_similarity`.
    pub distance: f32,
}
