pub mod build;
pub mod collection;
mod db;
pub mod model;
pub mod resolve;
pub mod similarity;
pub mod store;

pub use build::{build_collection, BuildReport};
pub use collection::Collection;
pub use model::{CollectionInfo, EntryMetadata, IndexEntry, RetrievedChunk};
pub use resolve::{resolve_collection, CollectionResolution};
pub use store::{IndexStore, INDEX_DB_FILE};
