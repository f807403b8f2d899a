use std::collections::HashSet;
use std::path::Path;

use charak_core::error::AppError;
use rusqlite::{Connection, OpenFlags};

const MIGRATION_0001: (&str, &str) = (
    "0001_index.sql",
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../migrations/0001_index.sql"
    )),
);

const MIGRATION_0002: (&str, &str) = (
    "0002_collection_placeholder.sql",
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../migrations/0002_collection_placeholder.sql"
    )),
);

fn migrations() -> Vec<(&'static str, &'static str)> {
    vec![MIGRATION_0001, MIGRATION_0002]
}

pub fn open(path: &Path) -> Result<Connection, AppError> {
    let conn = Connection::open(path).map_err(|e| {
        AppError::new("INDEX_OPEN_FAILED", "Failed to open index database")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    conn.execute_batch("PRAGMA foreign_keys = ON;").map_err(|e| {
        AppError::new("INDEX_OPEN_FAILED", "Failed to configure index database")
            .with_details(e.to_string())
    })?;
    Ok(conn)
}

/// Open an existing index without creating or migrating anything, so a
/// packaged index on a read-only filesystem can be served.
pub fn open_read_only(path: &Path) -> Result<Connection, AppError> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| {
        AppError::new("INDEX_OPEN_FAILED", "Failed to open index database read-only")
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}

pub fn migrate(conn: &mut Connection) -> Result<(), AppError> {
    // Each migration is applied exactly once, in order.
    conn.execute_batch(
        r#"
      CREATE TABLE IF NOT EXISTS _migrations (
        name TEXT PRIMARY KEY NOT NULL,
        applied_at TEXT NOT NULL
      );
    "#,
    )
    .map_err(|e| {
        AppError::new(
            "INDEX_MIGRATION_FAILED",
            "Failed to ensure migrations table exists",
        )
        .with_details(e.to_string())
    })?;

    let applied: HashSet<String> = {
        let mut stmt = conn.prepare("SELECT name FROM _migrations").map_err(|e| {
            AppError::new("INDEX_MIGRATION_FAILED", "Failed to query applied migrations")
                .with_details(e.to_string())
        })?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| {
                AppError::new("INDEX_MIGRATION_FAILED", "Failed to read applied migrations")
                    .with_details(e.to_string())
            })?;
        let mut set = HashSet::new();
        for r in rows {
            set.insert(r.map_err(|e| {
                AppError::new("INDEX_MIGRATION_FAILED", "Failed to read applied migration row")
                    .with_details(e.to_string())
            })?);
        }
        set
    };

    for (name, sql) in migrations() {
        if applied.contains(name) {
            continue;
        }

        let tx = conn.transaction().map_err(|e| {
            AppError::new("INDEX_MIGRATION_FAILED", "Failed to start migration transaction")
                .with_details(e.to_string())
        })?;
        tx.execute_batch(sql).map_err(|e| {
            AppError::new("INDEX_MIGRATION_FAILED", format!("Migration {name} failed"))
                .with_details(e.to_string())
        })?;
        tx.execute(
            "INSERT INTO _migrations(name, applied_at) VALUES (?1, strftime('%Y-%m-%dT%H:%M:%fZ','now'))",
            [name],
        )
        .map_err(|e| {
            AppError::new("INDEX_MIGRATION_FAILED", format!("Failed to record migration {name}"))
                .with_details(e.to_string())
        })?;
        tx.commit().map_err(|e| {
            AppError::new("INDEX_MIGRATION_FAILED", "Failed to commit migration transaction")
                .with_details(e.to_string())
        })?;
    }

    Ok(())
}

pub fn encode_vector(v: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 4);
    for x in v {
        out.extend_from_slice(&x.to_le_bytes());
    }
    out
}

pub fn decode_vector(bytes: &[u8]) -> Result<Vec<f32>, AppError> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::new("INDEX_CORRUPT", "Stored vector has a truncated component")
            .with_details(format!("bytes={}", bytes.len())));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().expect("open");
        migrate(&mut conn).expect("migrate");
        migrate(&mut conn).expect("migrate again");
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0))
            .expect("count");
        assert_eq!(n, 2);
    }

    #[test]
    fn vector_blob_round_trip_is_exact() {
        let v = vec![0.25f32, -1.5, 3.0e-7];
        assert_eq!(decode_vector(&encode_vector(&v)).expect("decode"), v);
        assert!(decode_vector(&[0u8, 1, 2]).is_err());
    }
}
