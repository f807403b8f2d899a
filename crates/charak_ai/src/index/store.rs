use std::fs;
use std::path::{Path, PathBuf};

use charak_core::error::AppError;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::collection::Collection;
use super::db;
use super::model::{CollectionInfo, EntryMetadata, IndexEntry};

pub const INDEX_DB_FILE: &str = "index.sqlite3";

/// Path-addressed vector index: one SQLite file holding any number of named
/// collections.
#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(INDEX_DB_FILE)
    }

    /// True when the backing database file exists and is non-empty. A bare
    /// directory does not count.
    pub fn has_backing_files(&self) -> bool {
        fs::metadata(self.db_path())
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    /// Read-side connection. `None` when there is no database file yet; reads
    /// never create directories or run migrations.
    fn read_conn(&self) -> Result<Option<Connection>, AppError> {
        let path = self.db_path();
        if !path.is_file() {
            return Ok(None);
        }
        db::open_read_only(&path).map(Some)
    }

    /// Write-side connection: creates the directory and applies migrations.
    fn connect(&self) -> Result<Connection, AppError> {
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::new("INDEX_OPEN_FAILED", "Failed to create index directory")
                .with_details(format!("path={}; err={}", self.root.display(), e))
        })?;
        let mut conn = db::open(&self.db_path())?;
        db::migrate(&mut conn)?;
        Ok(conn)
    }

    /// All collections, ordered by name.
    pub fn list_collections(&self) -> Result<Vec<CollectionInfo>, AppError> {
        let Some(conn) = self.read_conn()? else {
            return Ok(Vec::new());
        };
        let mut stmt = conn
            .prepare(
                r#"
                SELECT c.name, c.space, c.dims, c.model, c.fingerprint, c.created_at,
                       (SELECT COUNT(*) FROM entries e WHERE e.collection_id = c.id),
                       c.synthesized
                FROM collections c
                ORDER BY c.name ASC
                "#,
            )
            .map_err(|e| query_failed("Failed to prepare collections query", e))?;
        let rows = stmt
            .query_map([], row_to_info)
            .map_err(|e| query_failed("Failed to list collections", e))?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| query_failed("Failed to read collection row", e))?);
        }
        Ok(out)
    }

    pub fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>, AppError> {
        let Some(conn) = self.read_conn()? else {
            return Ok(None);
        };
        conn.query_row(
            r#"
            SELECT c.name, c.space, c.dims, c.model, c.fingerprint, c.created_at,
                   (SELECT COUNT(*) FROM entries e WHERE e.collection_id = c.id),
                   c.synthesized
            FROM collections c
            WHERE c.name = ?1
            "#,
            [name],
            row_to_info,
        )
        .optional()
        .map_err(|e| query_failed("Failed to read collection", e))
    }

    pub fn count(&self, name: &str) -> Result<u64, AppError> {
        self.collection_info(name)?
            .map(|info| info.count)
            .ok_or_else(|| collection_not_found(name))
    }

    pub fn create_collection(&self, name: &str, model: Option<&str>) -> Result<CollectionInfo, AppError> {
        self.insert_collection(name, model, false)
    }

    /// Empty stand-in collection for a process that found no index. Discovery
    /// skips an index holding only these, so a later archive still wins.
    pub fn create_placeholder(&self, name: &str) -> Result<CollectionInfo, AppError> {
        self.insert_collection(name, None, true)
    }

    /// True when every collection is an empty placeholder. An index with no
    /// collections at all is not a placeholder.
    pub fn is_placeholder(&self) -> Result<bool, AppError> {
        let collections = self.list_collections()?;
        Ok(!collections.is_empty() && collections.iter().all(|c| c.synthesized && c.count == 0))
    }

    /// Move an unreadable database file aside so a fresh one can take its place.
    pub fn quarantine(&self) -> Result<PathBuf, AppError> {
        let from = self.db_path();
        let to = self.root.join(format!("{INDEX_DB_FILE}.corrupt"));
        fs::rename(&from, &to).map_err(|e| {
            AppError::new("INDEX_WRITE_FAILED", "Failed to move unreadable index aside")
                .with_details(format!("from={}; to={}; err={}", from.display(), to.display(), e))
        })?;
        Ok(to)
    }

    fn insert_collection(&self, name: &str, model: Option<&str>, synthesized: bool) -> Result<CollectionInfo, AppError> {
        let created_at = charak_core::now_rfc3339_utc()?;
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO collections(name, space, model, created_at, synthesized) VALUES (?1, 'cosine', ?2, ?3, ?4)",
            params![name, model, created_at, synthesized],
        )
        .map_err(|e| {
            AppError::new("INDEX_WRITE_FAILED", "Failed to create collection")
                .with_details(format!("name={name}; err={e}"))
        })?;
        debug!(collection = name, synthesized, path = %self.root.display(), "collection created");

        Ok(CollectionInfo {
            name: name.to_string(),
            space: "cosine".to_string(),
            dims: None,
            model: model.map(str::to_string),
            fingerprint: None,
            created_at,
            count: 0,
            synthesized,
        })
    }

    /// Returns whether a collection was dropped.
    pub fn drop_collection(&self, name: &str) -> Result<bool, AppError> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|e| write_failed("Failed to start drop transaction", e))?;
        tx.execute(
            "DELETE FROM entries WHERE collection_id IN (SELECT id FROM collections WHERE name = ?1)",
            [name],
        )
        .map_err(|e| write_failed("Failed to delete collection entries", e))?;
        let n = tx
            .execute("DELETE FROM collections WHERE name = ?1", [name])
            .map_err(|e| write_failed("Failed to delete collection", e))?;
        tx.commit()
            .map_err(|e| write_failed("Failed to commit drop transaction", e))?;
        Ok(n > 0)
    }

    pub fn set_fingerprint(&self, name: &str, fingerprint: &str) -> Result<(), AppError> {
        let conn = self.connect()?;
        let n = conn
            .execute(
                "UPDATE collections SET fingerprint = ?2 WHERE name = ?1",
                params![name, fingerprint],
            )
            .map_err(|e| write_failed("Failed to record collection fingerprint", e))?;
        if n == 0 {
            return Err(collection_not_found(name));
        }
        Ok(())
    }

    /// Insert entries in one transaction. The first stored vector fixes the
    /// collection's dimension; every later vector must match it.
    pub fn add_entries(&self, name: &str, entries: &[IndexEntry]) -> Result<(), AppError> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|e| write_failed("Failed to start insert transaction", e))?;

        let (collection_id, mut dims): (i64, Option<u32>) = tx
            .query_row(
                "SELECT id, dims FROM collections WHERE name = ?1",
                [name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| query_failed("Failed to read collection", e))?
            .ok_or_else(|| collection_not_found(name))?;

        for entry in entries {
            let len = entry.vector.len() as u32;
            match dims {
                Some(d) if d != len => {
                    return Err(AppError::new(
                        "CONFIG_DIMENSION_MISMATCH",
                        "Embedding dimension does not match the collection",
                    )
                    .with_details(format!(
                        "collection={name}; expected={d}; got={len}; id={}",
                        entry.id
                    )));
                }
                Some(_) => {}
                None => {
                    tx.execute(
                        "UPDATE collections SET dims = ?2 WHERE id = ?1",
                        params![collection_id, len],
                    )
                    .map_err(|e| write_failed("Failed to record collection dims", e))?;
                    dims = Some(len);
                }
            }

            tx.execute(
                "INSERT INTO entries(collection_id, id, title, chunk_index, text, vector) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    collection_id,
                    entry.id,
                    entry.metadata.title,
                    entry.metadata.chunk_index,
                    entry.text,
                    db::encode_vector(&entry.vector),
                ],
            )
            .map_err(|e| {
                AppError::new("INDEX_WRITE_FAILED", "Failed to insert index entry")
                    .with_details(format!("collection={name}; id={}; err={e}", entry.id))
            })?;
        }

        tx.commit()
            .map_err(|e| write_failed("Failed to commit insert transaction", e))?;
        Ok(())
    }

    /// Read a whole collection into memory for serving.
    pub fn load_collection(&self, name: &str) -> Result<Collection, AppError> {
        let info = self
            .collection_info(name)?
            .ok_or_else(|| collection_not_found(name))?;

        let conn = self
            .read_conn()?
            .ok_or_else(|| collection_not_found(name))?;
        let mut stmt = conn
            .prepare(
                r#"
                SELECT e.id, e.title, e.chunk_index, e.text, e.vector
                FROM entries e
                JOIN collections c ON c.id = e.collection_id
                WHERE c.name = ?1
                ORDER BY e.rowid ASC
                "#,
            )
            .map_err(|e| query_failed("Failed to prepare entries query", e))?;
        let rows = stmt
            .query_map([name], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Vec<u8>>(4)?,
                ))
            })
            .map_err(|e| query_failed("Failed to read entries", e))?;

        let mut entries = Vec::new();
        for r in rows {
            let (id, title, chunk_index, text, blob) =
                r.map_err(|e| query_failed("Failed to read entry row", e))?;
            entries.push(IndexEntry {
                id,
                vector: db::decode_vector(&blob)?,
                text,
                metadata: EntryMetadata { title, chunk_index },
            });
        }

        Ok(Collection::new(info, entries))
    }
}

fn row_to_info(row: &rusqlite::Row<'_>) -> rusqlite::Result<CollectionInfo> {
    Ok(CollectionInfo {
        name: row.get(0)?,
        space: row.get(1)?,
        dims: row.get(2)?,
        model: row.get(3)?,
        fingerprint: row.get(4)?,
        created_at: row.get(5)?,
        count: row.get::<_, i64>(6)? as u64,
        synthesized: row.get(7)?,
    })
}

pub(crate) fn collection_not_found(name: &str) -> AppError {
    AppError::new("INDEX_COLLECTION_NOT_FOUND", "Collection not found")
        .with_details(format!("name={name}"))
}

fn query_failed(message: &str, e: rusqlite::Error) -> AppError {
    AppError::new("INDEX_QUERY_FAILED", message).with_details(e.to_string())
}

fn write_failed(message: &str, e: rusqlite::Error) -> AppError {
    AppError::new("INDEX_WRITE_FAILED", message).with_details(e.to_string())
}
