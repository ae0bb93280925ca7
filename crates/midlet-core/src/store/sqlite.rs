//! SQLite-backed application record store.

use super::AppRepository;
use crate::config::DatabaseConfig;
use crate::models::AppItem;
use crate::{MidletError, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// SQLite store for [`AppItem`] records.
///
/// Only the directory name is persisted as identity; the full external path
/// is rebuilt from `apps_dir` on every read.
pub struct SqliteAppRepository {
    db_path: PathBuf,
    apps_dir: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAppRepository {
    /// Create or open the store at `db_path`.
    pub fn open(db_path: impl Into<PathBuf>, apps_dir: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| MidletError::Io {
                    message: format!("Failed to create directory {}", parent.display()),
                    path: Some(parent.to_path_buf()),
                    source: Some(e),
                })?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::configure_connection(&conn)?;
        Self::ensure_schema(&conn)?;

        Ok(Self {
            db_path,
            apps_dir: apps_dir.into(),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL;\n\
             PRAGMA busy_timeout={};\n\
             PRAGMA synchronous=NORMAL;\n\
             PRAGMA temp_store=MEMORY;",
            DatabaseConfig::BUSY_TIMEOUT_MS,
        ))?;
        Ok(())
    }

    fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS apps (
                path TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                version TEXT NOT NULL,
                image_path TEXT,
                added_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| MidletError::Database {
            message: "Failed to acquire app store connection lock".to_string(),
            source: None,
        })
    }

    /// Get the database path.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn row_to_item(&self, row: &Row) -> rusqlite::Result<AppItem> {
        let path: String = row.get(0)?;
        let image_path: Option<String> = row.get(4)?;
        let title: String = row.get(1)?;
        let author: String = row.get(2)?;
        let version: String = row.get(3)?;
        Ok(AppItem::new(&self.apps_dir, path, title, author, version).with_image_path(image_path))
    }
}

impl AppRepository for SqliteAppRepository {
    fn list(&self) -> Result<Vec<AppItem>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT path, title, author, version, image_path FROM apps ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| self.row_to_item(row))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    fn get(&self, path: &str) -> Result<Option<AppItem>> {
        let conn = self.lock_conn()?;
        let item = conn
            .query_row(
                "SELECT path, title, author, version, image_path FROM apps WHERE path = ?1",
                params![path],
                |row| self.row_to_item(row),
            )
            .optional()?;
        Ok(item)
    }

    fn insert(&self, items: &[AppItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO apps (path, title, author, version, image_path, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for item in items {
                stmt.execute(params![
                    item.path(),
                    item.title(),
                    item.author(),
                    item.version(),
                    item.image_path(),
                    now,
                ])?;
            }
        }
        tx.commit()?;

        debug!("Inserted {} app records", items.len());
        Ok(())
    }

    fn delete(&self, items: &[AppItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM apps WHERE path = ?1")?;
            for item in items {
                removed += stmt.execute(params![item.path()])?;
            }
        }
        tx.commit()?;

        debug!("Deleted {} app records", removed);
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        let removed = conn.execute("DELETE FROM apps", [])?;
        debug!("Deleted all {} app records", removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(path: &str, title: &str) -> AppItem {
        AppItem::new(Path::new("/apps"), path, title, "Vendor", "1.0")
    }

    fn open(temp_dir: &TempDir) -> SqliteAppRepository {
        SqliteAppRepository::open(temp_dir.path().join("db").join("apps.db"), "/apps").unwrap()
    }

    #[test]
    fn test_insert_and_list_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        repo.insert(&[item("b", "Bravo"), item("a", "Alpha")]).unwrap();
        repo.insert(&[item("c", "Charlie").with_image_path(Some("icon.png".into()))])
            .unwrap();

        let items = repo.list().unwrap();
        let paths: Vec<&str> = items.iter().map(|i| i.path()).collect();
        assert_eq!(paths, vec!["b", "a", "c"]);
        assert_eq!(items[2].image_path(), Some("icon.png"));
        assert_eq!(items[2].path_ext(), Path::new("/apps/c"));
    }

    #[test]
    fn test_insert_replaces_existing_path() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);

        repo.insert(&[item("a", "Old")]).unwrap();
        repo.insert(&[item("a", "New")]).unwrap();

        let items = repo.list().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title(), "New");
    }

    #[test]
    fn test_get() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);
        repo.insert(&[item("a", "Alpha")]).unwrap();

        assert_eq!(repo.get("a").unwrap().unwrap().title(), "Alpha");
        assert!(repo.get("zzz").unwrap().is_none());
    }

    #[test]
    fn test_delete_batch_and_all() {
        let temp_dir = TempDir::new().unwrap();
        let repo = open(&temp_dir);
        repo.insert(&[item("a", "A"), item("b", "B"), item("c", "C")]).unwrap();

        repo.delete(&[item("a", "A"), item("missing", "M")]).unwrap();
        assert_eq!(repo.list().unwrap().len(), 2);

        repo.delete_all().unwrap();
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let repo = open(&temp_dir);
            repo.insert(&[item("a", "A")]).unwrap();
        }
        let repo = open(&temp_dir);
        assert_eq!(repo.list().unwrap().len(), 1);
        assert!(repo.db_path().ends_with("apps.db"));
    }
}
