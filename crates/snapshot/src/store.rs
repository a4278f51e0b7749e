use crate::{Result, Savegame, SnapshotError};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Key in the `campaign` table naming the savegame the store was built from.
pub const SOURCE_FILE_KEY: &str = "source_file";

const SCHEMA: &str = "
    CREATE TABLE campaign (key TEXT PRIMARY KEY, value TEXT);
    CREATE TABLE gamestates (key TEXT PRIMARY KEY, data TEXT);
";

#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub path: PathBuf,
    pub collections: usize,
    pub size_bytes: u64,
}

/// One snapshot materialised as `collection key → JSON document` rows.
///
/// The store is never patched: [`SnapshotStore::rebuild`] drops the previous
/// file and writes every collection in a single transaction.
#[derive(Debug)]
pub struct SnapshotStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SnapshotStore {
    /// Replaces the store at `path` with the contents of `savegame`.
    ///
    /// The old file is deleted before the new one is complete. On failure the
    /// partial file is removed, so the store is absent rather than half-built.
    pub fn rebuild(path: &Path, savegame: &Savegame, source: Option<&Path>) -> Result<StoreSummary> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        remove_if_exists(path)?;
        write_or_remove(path, |conn| populate(conn, savegame, source))?;

        let size_bytes = std::fs::metadata(path)?.len();
        log::info!(
            "Snapshot store written: {} ({} collections, {} bytes)",
            path.display(),
            savegame.collection_count(),
            size_bytes
        );
        Ok(StoreSummary {
            path: path.to_path_buf(),
            collections: savegame.collection_count(),
            size_bytes,
        })
    }

    /// Opens an existing store read-only.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SnapshotError::StoreMissing {
                path: path.to_path_buf(),
            });
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Builds a throwaway store in memory; used to evaluate fixtures without touching disk.
    pub fn in_memory(savegame: &Savegame) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        populate(&mut conn, savegame, None)?;
        Ok(Self { conn, path: None })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Document stored for `key`, or `None` when the collection is absent.
    pub fn collection(&self, key: &str) -> Result<Option<Value>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM gamestates WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match data {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    pub fn collection_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM gamestates ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys)
    }

    pub fn scalar(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM campaign WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Stable 64-bit digest of every collection row, in key order.
    pub fn content_fingerprint(&self) -> Result<u64> {
        let mut hasher = Sha256::new();
        let mut stmt = self
            .conn
            .prepare("SELECT key, data FROM gamestates ORDER BY key")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let data: String = row.get(1)?;
            hasher.update(key.as_bytes());
            hasher.update([0u8]);
            hasher.update(data.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();
        Ok(u64::from_be_bytes([
            digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
        ]))
    }
}

fn populate(conn: &mut Connection, savegame: &Savegame, source: Option<&Path>) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    {
        let mut insert = tx.prepare("INSERT INTO campaign (key, value) VALUES (?1, ?2)")?;
        for (key, value) in &savegame.scalars {
            insert.execute(params![key, value])?;
        }
    }
    // The savegame's own `source_file` scalar, if any, yields to the real origin.
    if let Some(name) = source.and_then(Path::file_name) {
        tx.execute(
            "INSERT OR REPLACE INTO campaign (key, value) VALUES (?1, ?2)",
            params![SOURCE_FILE_KEY, name.to_string_lossy().into_owned()],
        )?;
    }
    {
        let mut insert = tx.prepare("INSERT INTO gamestates (key, data) VALUES (?1, ?2)")?;
        for (key, document) in &savegame.gamestates {
            insert.execute(params![key, serde_json::to_string(document)?])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Runs `write` against a fresh database at `path`; on failure the partial
/// file is removed and the error reported as [`SnapshotError::StoreWrite`].
fn write_or_remove<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut Connection) -> Result<()>,
{
    let written = Connection::open(path)
        .map_err(SnapshotError::from)
        .and_then(|mut conn| write(&mut conn));
    if let Err(err) = written {
        if let Err(cleanup) = remove_if_exists(path) {
            log::warn!(
                "Failed to remove partial store {}: {cleanup}",
                path.display()
            );
        }
        return Err(SnapshotError::StoreWrite {
            path: path.to_path_buf(),
            reason: err.to_string(),
        });
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn savegame(collections: &[(&str, Value)]) -> Savegame {
        Savegame::from_gamestates(
            collections
                .iter()
                .map(|(key, doc)| ((*key).to_string(), doc.clone())),
        )
    }

    #[test]
    fn rebuild_replaces_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("build").join("savegame_2027-08-01.db");

        SnapshotStore::rebuild(&path, &savegame(&[("A", json!([1])), ("B", json!([2]))]), None)
            .unwrap();
        let summary = SnapshotStore::rebuild(
            &path,
            &savegame(&[("C", json!([3]))]),
            Some(Path::new("/saves/Autosave_2027-8-1.gz")),
        )
        .unwrap();
        assert_eq!(summary.collections, 1);

        let store = SnapshotStore::open(&path).unwrap();
        assert_eq!(store.collection_keys().unwrap(), vec!["C".to_string()]);
        assert_eq!(store.collection("C").unwrap(), Some(json!([3])));
        assert_eq!(store.collection("A").unwrap(), None);
        assert_eq!(
            store.scalar(SOURCE_FILE_KEY).unwrap().as_deref(),
            Some("Autosave_2027-8-1.gz")
        );
    }

    #[test]
    fn open_reports_missing_store() {
        let tmp = TempDir::new().unwrap();
        let err = SnapshotStore::open(&tmp.path().join("absent.db")).unwrap_err();
        assert!(matches!(err, SnapshotError::StoreMissing { .. }));
    }

    #[test]
    fn failed_write_leaves_no_store_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("savegame_2027-08-01.db");

        let err = write_or_remove(&path, |conn| {
            conn.execute_batch(SCHEMA)?;
            conn.execute_batch("INSERT INTO missing_table VALUES (1)")?;
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, SnapshotError::StoreWrite { .. }));
        assert!(!path.exists());
        assert!(matches!(
            SnapshotStore::open(&path).unwrap_err(),
            SnapshotError::StoreMissing { .. }
        ));
    }

    #[test]
    fn source_file_scalar_yields_to_real_origin() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("savegame_2027-08-01.db");
        let mut game = savegame(&[("A", json!([]))]);
        game.scalars
            .insert(SOURCE_FILE_KEY.to_string(), "shadow".to_string());

        SnapshotStore::rebuild(&path, &game, Some(Path::new("Autosave_2027-8-1.gz"))).unwrap();
        let store = SnapshotStore::open(&path).unwrap();
        assert_eq!(
            store.scalar(SOURCE_FILE_KEY).unwrap().as_deref(),
            Some("Autosave_2027-8-1.gz")
        );

        SnapshotStore::rebuild(&path, &game, None).unwrap();
        let store = SnapshotStore::open(&path).unwrap();
        assert_eq!(store.scalar(SOURCE_FILE_KEY).unwrap().as_deref(), Some("shadow"));
    }

    #[test]
    fn fingerprint_depends_only_on_content() {
        let game = savegame(&[("A", json!([{"Key": {"value": 1}}])), ("B", json!([]))]);
        let a = SnapshotStore::in_memory(&game).unwrap();
        let b = SnapshotStore::in_memory(&game).unwrap();
        assert_eq!(
            a.content_fingerprint().unwrap(),
            b.content_fingerprint().unwrap()
        );

        let other = SnapshotStore::in_memory(&savegame(&[("A", json!([]))])).unwrap();
        assert_ne!(
            a.content_fingerprint().unwrap(),
            other.content_fingerprint().unwrap()
        );
    }
}
