use charak_core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::store::IndexStore;

/// Which collection a serving process ended up using.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectionResolution {
    Exact { name: String },
    /// The requested name was absent; the first collection by name is served instead.
    Fallback { requested: String, used: String },
    /// The index holds no collections at all.
    Empty,
}

impl CollectionResolution {
    pub fn collection_name(&self) -> Option<&str> {
        match self {
            CollectionResolution::Exact { name } => Some(name),
            CollectionResolution::Fallback { used, .. } => Some(used),
            CollectionResolution::Empty => None,
        }
    }
}

/// Pick the collection to serve.
///
/// With `strict`, a missing exact name is an error instead of a fallback.
pub fn resolve_collection(
    store: &IndexStore,
    requested: &str,
    strict: bool,
) -> Result<CollectionResolution, AppError> {
    let collections = store.list_collections()?;
    if collections.iter().any(|c| c.name == requested) {
        info!(collection = requested, "using collection");
        return Ok(CollectionResolution::Exact {
            name: requested.to_string(),
        });
    }

    let Some(first) = collections.first() else {
        warn!(requested, path = %store.root().display(), "index holds no collections");
        return Ok(CollectionResolution::Empty);
    };

    let available: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
    if strict {
        return Err(AppError::new(
            "CONFIG_COLLECTION_NOT_FOUND",
            "Configured collection does not exist in the index",
        )
        .with_details(format!("requested={requested}; available={}", available.join(","))));
    }

    warn!(
        requested,
        used = %first.name,
        available = %available.join(","),
        "collection not found; falling back to first available collection"
    );
    Ok(CollectionResolution::Fallback {
        requested: requested.to_string(),
        used: first.name.clone(),
    })
}
